use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client, header::ACCEPT, header::HeaderMap, header::HeaderValue};
use serde::Deserialize;
use url::Url;

use super::TaskStatus;
use crate::error::{Error, Result};

const DIRECTOR_TIMEOUT: Duration = Duration::from_secs(30);
const ACTIVE_STATES: [&str; 3] = ["queued", "processing", "cancelling"];

/// Connection settings for the director API.
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    /// Base URL of the director, e.g. `https://10.0.0.6:25555`.
    pub url: String,
    pub client: Option<String>,
    pub client_secret: Option<String>,
    /// PEM file with the director's CA. Certificates are not verified when absent.
    pub ca_cert: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    id: u64,
    state: String,
}

/// Queries task state from the director's `/tasks/{id}` endpoint using basic auth.
pub struct DirectorClient {
    base: Url,
    client: Client,
    credentials: Option<(String, Option<String>)>,
}

impl DirectorClient {
    pub fn new(config: &DirectorConfig) -> Result<Self> {
        let base = Url::parse(&config.url).map_err(|source| Error::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .timeout(DIRECTOR_TIMEOUT)
            .default_headers(headers);
        builder = match &config.ca_cert {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|e| Error::ConfigFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                let cert = Certificate::from_pem(&pem).map_err(|e| Error::ConfigFile {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                builder.add_root_certificate(cert)
            }
            None => builder.danger_accept_invalid_certs(true),
        };

        Ok(DirectorClient {
            base,
            client: builder.build().map_err(Error::HttpClient)?,
            credentials: config
                .client
                .clone()
                .map(|user| (user, config.client_secret.clone())),
        })
    }

    fn task_url(&self, task: &str) -> Result<Url> {
        self.base
            .join(&format!("tasks/{task}"))
            .map_err(|source| Error::InvalidUrl {
                url: format!("{}tasks/{task}", self.base),
                source,
            })
    }
}

#[async_trait]
impl TaskStatus for DirectorClient {
    async fn current_task_id(&self, task: &str) -> Result<u64> {
        let failed = |reason: String| Error::TaskStatus {
            task: task.to_string(),
            reason,
        };

        let mut request = self.client.get(self.task_url(task)?);
        if let Some((user, secret)) = &self.credentials {
            request = request.basic_auth(user, secret.as_ref());
        }

        let response = request.send().await.map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(task, %status, "director rejected task query: {}", body);
            return Err(failed(format!("director returned {status}: {body}")));
        }

        let task_state: TaskResponse = response
            .json()
            .await
            .map_err(|e| failed(format!("unexpected response: {e}")))?;
        tracing::debug!(task, state = %task_state.state, "task state");

        Ok(task_id_if_active(&task_state))
    }
}

fn task_id_if_active(task: &TaskResponse) -> u64 {
    if ACTIVE_STATES.contains(&task.state.as_str()) {
        task.id
    } else {
        0
    }
}
