use crate::core::error::StoreError;
use crate::core::service::KeyValueStore;

use super::{AUTH_TOKEN_KEY, WALLET_ADDRESS_KEY};

/// Token and wallet address of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub token: Option<String>,
    pub wallet_address: Option<String>,
}

impl AuthSession {
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        Ok(Self {
            token: non_empty(store.get(AUTH_TOKEN_KEY).await?),
            wallet_address: non_empty(store.get(WALLET_ADDRESS_KEY).await?),
        })
    }

    /// Write the present fields. Absent fields leave the stored value untouched.
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        if let Some(token) = &self.token {
            store.set(AUTH_TOKEN_KEY, token).await?;
        }
        if let Some(wallet) = &self.wallet_address {
            store.set(WALLET_ADDRESS_KEY, wallet).await?;
        }
        Ok(())
    }

    /// Make this the stored session: present fields are written, absent ones removed.
    pub async fn replace(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        match &self.token {
            Some(token) => store.set(AUTH_TOKEN_KEY, token).await?,
            None => store.remove(AUTH_TOKEN_KEY).await?,
        }
        match &self.wallet_address {
            Some(wallet) => store.set(WALLET_ADDRESS_KEY, wallet).await,
            None => store.remove(WALLET_ADDRESS_KEY).await,
        }
    }

    /// Remove both keys.
    pub async fn clear(store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.remove(AUTH_TOKEN_KEY).await?;
        store.remove(WALLET_ADDRESS_KEY).await
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
