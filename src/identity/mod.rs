pub mod gotrue;

pub use gotrue::GoTrue;

#[cfg(test)]
use mockall::automock;

use crate::{
    config::{IdentityConfig, resolve_secret},
    models::User,
};
use async_trait::async_trait;
use eyre::{Result, bail};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("identity provider returned status {0}")]
    Provider(u16),

    #[error("contacting identity provider: {0}")]
    Request(#[from] reqwest::Error),
}

/// Resolves a bearer token to the user it was issued for.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Identity {
    async fn verify(&self, token: &str) -> Result<User, IdentityError>;
}

pub type ArcIdentity = Arc<dyn Identity + Send + Sync>;

pub fn new_identity(config: &IdentityConfig) -> Result<ArcIdentity> {
    if config.endpoint.trim().is_empty() {
        bail!("identity endpoint is not configured");
    }

    let mut gotrue = GoTrue::default().with_endpoint(&config.endpoint);
    if let Some(api_key) = resolve_secret(config.api_key.as_deref()) {
        gotrue = gotrue.with_api_key(&api_key);
    }
    if let Some(timeout) = config.timeout_secs {
        gotrue = gotrue.with_timeout(Duration::from_secs(timeout as u64));
    }
    Ok(Arc::new(gotrue))
}
