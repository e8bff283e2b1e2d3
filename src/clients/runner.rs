use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::RunnerConfig;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Runner returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("Request to runner failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct TriggerRequest<'a> {
    #[serde(rename = "scoutId")]
    scout_id: &'a str,
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "firecrawlApiKey", skip_serializing_if = "Option::is_none")]
    firecrawl_api_key: Option<&'a str>,
}

/// Client for the external execution engine. The engine performs the actual
/// crawl and reports progress back through the runner ingest endpoints.
pub struct RunnerClient {
    client: Client,
    url: String,
    service_token: String,
}

impl RunnerClient {
    #[must_use]
    pub fn new(client: Client, config: &RunnerConfig) -> Self {
        Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            service_token: config.service_token.clone(),
        }
    }

    /// Ask the engine to run a scout. The caller does not wait for the run
    /// itself, only for the engine to accept the trigger.
    pub async fn trigger_run(
        &self,
        scout_id: &str,
        user_id: &str,
        firecrawl_api_key: Option<&str>,
    ) -> Result<(), RunnerError> {
        let url = format!("{}/run", self.url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_token)
            .json(&TriggerRequest {
                scout_id,
                user_id,
                firecrawl_api_key,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RunnerError::Api { status, message });
        }

        debug!("Triggered run for scout {scout_id}");
        Ok(())
    }
}
