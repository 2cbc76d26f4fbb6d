//! # Token Endpoints
//!
//! Wallet balances and spot prices.

use shared::{Envelope, TokenBalances, TokenPrices};

use super::client::ApiClient;
use super::request::RequestDescriptor;

pub const BALANCES_PATH: &str = "/api/tokens/balances";
pub const PRICES_PATH: &str = "/api/tokens/prices";

impl ApiClient {
    pub async fn get_token_balances(&self, wallet_address: &str) -> Envelope<TokenBalances> {
        self.fetch(RequestDescriptor::get(format!("{}/{}", BALANCES_PATH, wallet_address)))
            .await
    }

    /// Prices for `symbols`. Symbols are upper-cased and sent comma-separated,
    /// so `["eth", "USDC"]` and `["ETH", "usdc"]` share a cache entry.
    pub async fn get_token_prices(&self, symbols: &[&str]) -> Envelope<TokenPrices> {
        if symbols.is_empty() {
            return Envelope::ok(TokenPrices::default());
        }
        let symbols = symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .collect::<Vec<_>>()
            .join(",");
        self.fetch(RequestDescriptor::get(PRICES_PATH).query("symbols", symbols))
            .await
    }
}
