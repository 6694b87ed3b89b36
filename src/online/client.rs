use crate::models::settings::OnlineConfig;
use crate::online::{RemoteError, RemoteStatsClient, RemoteUserSnapshot};
use reqwest::Client;

/// HTTP client for the `/v1/users/full/{id}` endpoint.
pub struct HttpStatsClient {
    http: Client,
    base_url: String,
}

impl HttpStatsClient {
    pub fn new(config: &OnlineConfig) -> Result<Self, RemoteError> {
        // Socket-level bound. The reconciler applies its own deadline too.
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(http, &config.api_base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn user_full_url(&self, user_id: i64) -> String {
        format!("{}/v1/users/full/{}", self.base_url, user_id)
    }
}

impl RemoteStatsClient for HttpStatsClient {
    async fn fetch_full(&self, user_id: i64) -> Result<RemoteUserSnapshot, RemoteError> {
        let url = self.user_full_url(user_id);
        log::debug!("ONLINE: GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let snapshot: RemoteUserSnapshot = response.json().await?;
        if snapshot.status != 200 {
            return Err(RemoteError::Status(snapshot.status));
        }
        Ok(snapshot)
    }
}
