use crate::core::config::ServicesConfig;
use crate::core::error::DashboardError;
use crate::models::response::UpstreamErrorBody;
use crate::pipeline::credential::Credential;
use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::assignments::AssignmentService;
use super::classroom::ClassroomService;
use super::users::UserService;

/// Which remote service a call went to; carried in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Classroom,
    Assignments,
    Users,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceKind::Classroom => "classroom",
            ServiceKind::Assignments => "assignment",
            ServiceKind::Users => "users",
        };
        f.write_str(name)
    }
}

/// JSON client for one remote service rooted at `{endpoint}/{stage}`.
#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    kind: ServiceKind,
}

impl ServiceClient {
    pub fn new(client: reqwest::Client, kind: ServiceKind, endpoint: &str, stage: &str) -> Self {
        let endpoint = endpoint.trim_end_matches('/');
        let stage = stage.trim_matches('/');
        let base_url = if stage.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}/{}", endpoint, stage)
        };

        Self {
            client,
            base_url,
            kind,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T>(&self, path: &str, credential: &Credential) -> Result<T, DashboardError>
    where
        T: DeserializeOwned,
    {
        debug!(service = %self.kind, path = path, "GET");

        let response = self
            .client
            .get(self.url(path))
            .header(AUTHORIZATION, credential.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(path, response).await
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        credential: &Credential,
    ) -> Result<T, DashboardError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(service = %self.kind, path = path, "POST");

        let response = self
            .client
            .post(self.url(path))
            .header(AUTHORIZATION, credential.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(path, response).await
    }

    async fn decode<T>(&self, path: &str, response: reqwest::Response) -> Result<T, DashboardError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            // Non-2xx bodies carry an `error` string shown to the teacher as is
            let body: UpstreamErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = body
                .error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{} service returned error status: {}", self.kind, status));

            warn!(
                service = %self.kind,
                path = path,
                status = status.as_u16(),
                error = %message,
                "Remote service call failed"
            );

            return Err(DashboardError::fetch_failed(self.kind, message));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(service = %self.kind, path = path, error = %e, "Failed to decode response");
            DashboardError::malformed(self.kind, e.to_string())
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> DashboardError {
        warn!(service = %self.kind, error = %e, "Failed to reach remote service");
        DashboardError::fetch_failed(self.kind, format!("Failed to reach {} service: {}", self.kind, e))
    }
}

/// Reject ids that would change the shape of the request path.
pub fn path_id(id: &str) -> Result<&str, DashboardError> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(DashboardError::InvalidInput(format!("Invalid identifier: {:?}", id)));
    }
    Ok(id)
}

/// The three backends the dashboard talks to.
#[derive(Clone)]
pub struct Services {
    pub classroom: ClassroomService,
    pub assignments: AssignmentService,
    pub users: UserService,
}

impl Services {
    pub fn from_config(config: &ServicesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ServicesConfig) -> Self {
        Self {
            classroom: ClassroomService::new(ServiceClient::new(
                client.clone(),
                ServiceKind::Classroom,
                &config.classroom_url,
                &config.stage,
            )),
            assignments: AssignmentService::new(ServiceClient::new(
                client.clone(),
                ServiceKind::Assignments,
                &config.assignments_url,
                &config.stage,
            )),
            users: UserService::new(ServiceClient::new(
                client,
                ServiceKind::Users,
                &config.users_url,
                &config.stage,
            )),
        }
    }
}
