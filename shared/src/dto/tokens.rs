//! # Token Data Transfer Objects
//!
//! Wallet token balances and market prices.

use serde::{Deserialize, Serialize};

/// Balance of a single token held by a wallet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Decimal string in token units
    pub balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// All balances of a wallet
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalances {
    pub wallet_address: String,
    #[serde(default)]
    pub balances: Vec<TokenBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_usd_value: Option<f64>,
}

/// Spot price of a token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub symbol: String,
    pub price_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Prices for a set of requested symbols
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenPrices {
    #[serde(default)]
    pub prices: Vec<TokenPrice>,
}

impl TokenPrices {
    /// Look up a price by symbol, case-insensitively.
    pub fn get(&self, symbol: &str) -> Option<&TokenPrice> {
        self.prices
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
    }
}
