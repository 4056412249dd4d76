use std::{fmt::Debug, sync::Arc};

use tokio::sync::Mutex;
use tracing::debug;

use super::Client;
use crate::core::{error::Result, tokens::Tokens};

/// Shared, refreshable tokens for one transaction.
///
/// [Client] never writes refreshed tokens back, so tasks sharing one set of
/// stale tokens would each perform their own refresh. `TokenStore` serializes
/// the staleness check and the refresh: at most one refresh is in flight, and
/// tasks waiting on it observe its result instead of refreshing again.
///
/// ```ignore
/// let store = TokenStore::new(Tokens::from_refresh(refresh_token));
/// let tokens = store.fresh(&client).await?;
/// let metadata = client.fetch_transaction(&tokens).await?;
/// ```
#[derive(Clone, Default)]
pub struct TokenStore {
    tokens: Arc<Mutex<Tokens>>,
}

impl TokenStore {
    pub fn new(tokens: Tokens) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(tokens)),
        }
    }

    /// Tokens that can be used right away, refreshing the stored tokens first
    /// if they are stale.
    ///
    /// On error the stored tokens are left as they were.
    pub async fn fresh(&self, client: &Client) -> Result<Tokens> {
        let mut tokens = self.tokens.lock().await;
        if tokens.needs_refresh() {
            debug!(
                transaction_id = tokens.transaction_id,
                "refreshing stored tokens"
            );
            *tokens = client.refresh_tokens(&tokens).await?;
        }
        Ok(tokens.clone())
    }

    /// The stored tokens, stale or not.
    pub async fn snapshot(&self) -> Tokens {
        self.tokens.lock().await.clone()
    }

    /// Swap in new tokens, returning the previous ones.
    pub async fn replace(&self, tokens: Tokens) -> Tokens {
        std::mem::replace(&mut *self.tokens.lock().await, tokens)
    }
}

impl Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tokens.try_lock() {
            Ok(tokens) => f.debug_struct("TokenStore").field("tokens", &*tokens).finish(),
            Err(_) => f.debug_struct("TokenStore").finish_non_exhaustive(),
        }
    }
}
