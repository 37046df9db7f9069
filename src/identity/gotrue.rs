#[cfg(test)]
#[path = "gotrue_test.rs"]
mod tests;

use async_trait::async_trait;
use serde::Deserialize;
use std::time;

use super::{Identity, IdentityError};
use crate::{config::user_agent, models::User};

/// Client for a GoTrue-compatible auth server (`GET /auth/v1/user`).
pub struct GoTrue {
    endpoint: String,
    api_key: Option<String>,
    timeout: Option<time::Duration>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl Identity for GoTrue {
    async fn verify(&self, token: &str) -> Result<User, IdentityError> {
        if token.trim().is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        let mut req = self
            .client
            .get(format!("{}/auth/v1/user", self.endpoint))
            .header("User-Agent", user_agent())
            .bearer_auth(token);

        if let Some(api_key) = &self.api_key {
            req = req.header("apikey", api_key);
        }

        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let res = req.send().await?;
        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            log::warn!("Identity provider returned {}", status.as_u16());
            return Err(IdentityError::Provider(status.as_u16()));
        }

        let user = res.json::<UserResponse>().await?;
        if user.id.is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        let mut ret = User::new(user.id);
        if let Some(email) = user.email {
            ret = ret.with_email(email);
        }
        Ok(ret)
    }
}

impl GoTrue {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for GoTrue {
    fn default() -> Self {
        Self {
            endpoint: crate::config::constants::DEFAULT_IDENTITY_ENDPOINT.to_string(),
            api_key: None,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }
}
