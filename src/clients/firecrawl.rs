use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FirecrawlConfig;

#[derive(Debug, thiserror::Error)]
pub enum FirecrawlError {
    #[error("Partner API key is not configured")]
    NotConfigured,
    #[error("Partner API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("Request to partner API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outcome of provisioning a key through the partner integration. The
/// endpoint is idempotent per email and tells us whether the account
/// already existed.
#[derive(Debug, Clone)]
pub struct ProvisionedKey {
    pub api_key: String,
    pub already_existed: bool,
}

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct CreateUserResponse {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
    #[serde(rename = "alreadyExisted", default)]
    already_existed: bool,
    error: Option<String>,
}

#[derive(Serialize)]
struct ValidateKeyRequest<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

#[derive(Deserialize)]
struct ValidateKeyResponse {
    valid: bool,
}

#[derive(Deserialize)]
struct CreditUsageResponse {
    data: Option<CreditUsageData>,
}

#[derive(Deserialize)]
struct CreditUsageData {
    remaining_credits: Option<i64>,
}

/// Client for the Firecrawl partner integration API.
pub struct FirecrawlClient {
    client: Client,
    api_url: String,
    partner_key: Option<String>,
}

impl FirecrawlClient {
    #[must_use]
    pub fn new(client: Client, config: &FirecrawlConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            partner_key: config.partner_key.clone(),
        }
    }

    fn partner_key(&self) -> Result<&str, FirecrawlError> {
        self.partner_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FirecrawlError::NotConfigured)
    }

    /// Provision (or look up) an API key for the given email.
    pub async fn create_user(&self, email: &str) -> Result<ProvisionedKey, FirecrawlError> {
        let partner_key = self.partner_key()?;
        let url = format!("{}/admin/integration/create-user", self.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(partner_key)
            .json(&CreateUserRequest { email })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api { status, message });
        }

        let body: CreateUserResponse = response.json().await?;
        let Some(api_key) = body.api_key else {
            return Err(FirecrawlError::Api {
                status,
                message: body
                    .error
                    .unwrap_or_else(|| "Response contained no API key".to_string()),
            });
        };

        debug!(
            "Provisioned crawl key for {email} (already_existed: {})",
            body.already_existed
        );

        Ok(ProvisionedKey {
            api_key,
            already_existed: body.already_existed,
        })
    }

    /// Check whether a previously issued key is still accepted upstream.
    pub async fn validate_key(&self, api_key: &str) -> Result<bool, FirecrawlError> {
        let partner_key = self.partner_key()?;
        let url = format!("{}/admin/integration/validate-api-key", self.api_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(partner_key)
            .json(&ValidateKeyRequest { api_key })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api { status, message });
        }

        let body: ValidateKeyResponse = response.json().await?;
        Ok(body.valid)
    }

    /// Remaining credits for a user-held key. Returns `None` when the
    /// upstream call fails in any way; the dashboard renders that as
    /// unknown rather than failing the whole overview.
    pub async fn credit_usage(&self, api_key: &str) -> Option<i64> {
        let url = format!("{}/v1/team/credit-usage", self.api_url);

        let response = match self.client.get(&url).bearer_auth(api_key).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Credit usage request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            return None;
        }

        match response.json::<CreditUsageResponse>().await {
            Ok(body) => body.data.and_then(|d| d.remaining_credits),
            Err(e) => {
                warn!("Credit usage response unreadable: {e}");
                None
            }
        }
    }
}
