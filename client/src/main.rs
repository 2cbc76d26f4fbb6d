//! Command-line entry point: fetch token prices through the API client.
//!
//! ```bash
//! WALLET_API_URL=https://api.example.com wallet-client ETH USDC
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use wallet_client::storage::FileStore;
use wallet_client::{logging, ApiClient, ClientConfig};

const DEFAULT_STORE_PATH: &str = "wallet-session.json";
const DEFAULT_SYMBOLS: [&str; 2] = ["ETH", "USDC"];

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = logging::init(&config);

    match run(config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "wallet-client failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ClientConfig) -> wallet_client::Result<ExitCode> {
    let store_path = std::env::var("WALLET_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH));
    let store = Arc::new(FileStore::open(store_path).await?);
    let api = ApiClient::new(config, store)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let symbols: Vec<&str> = if args.is_empty() {
        DEFAULT_SYMBOLS.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let envelope = api.get_token_prices(&symbols).await;
    let output = serde_json::to_string_pretty(&envelope)
        .map_err(|e| wallet_client::AppError::Validation(e.to_string()))?;
    println!("{}", output);

    Ok(if envelope.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
