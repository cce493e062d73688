//! Pi-hole v6 HTTP client (reqwest-based).
//!
//! A single `PiholeClient` implements all three directory capabilities
//! against the `/api` endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::lookup::canonical_hardware_address;
use crate::models::{
    AssignGroupsRequest, ClientListResponse, ClientRecord, CreateGroupRequest, Device,
    DeviceListResponse, Group, GroupListResponse, DEFAULT_GROUP_ID,
};
use crate::traits::{ClientRegistry, DeviceDirectory, GroupProvisioner};

const DEVICES_ENDPOINT: &str = "/api/network/devices";
const CLIENTS_ENDPOINT: &str = "/api/clients";
const GROUPS_ENDPOINT: &str = "/api/groups";

/// HTTP client for a Pi-hole style directory.
#[derive(Debug, Clone)]
pub struct PiholeClient {
    /// Base URL of the directory (e.g. "http://192.168.0.200").
    base_url: String,
    http_client: Client,
}

impl PiholeClient {
    /// Create a client with its own connection pool.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DirectoryResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devgroup-pihole/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DirectoryError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, http_client))
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &DirectoryConfig) -> DirectoryResult<Self> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    /// Create a client with a pre-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(base_url: impl Into<String>, http_client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> DirectoryResult<T> {
        debug!(endpoint, "directory GET");
        let response = self
            .http_client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| DirectoryError::transport(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_status(endpoint, status));
        }
        decode_body(endpoint, response).await
    }
}

#[async_trait]
impl DeviceDirectory for PiholeClient {
    async fn list_devices(&self) -> DirectoryResult<Vec<Device>> {
        let body: DeviceListResponse = self.get_json(DEVICES_ENDPOINT).await?;
        Ok(body.devices)
    }
}

#[async_trait]
impl ClientRegistry for PiholeClient {
    async fn list_client_records(&self) -> DirectoryResult<Vec<ClientRecord>> {
        let body: ClientListResponse = self.get_json(CLIENTS_ENDPOINT).await?;
        Ok(body.clients)
    }

    async fn assign_groups(
        &self,
        hardware_address: &str,
        group_ids: &[u32],
    ) -> DirectoryResult<()> {
        let hardware_address = canonical_hardware_address(hardware_address);
        let endpoint = format!("{CLIENTS_ENDPOINT}/{hardware_address}");
        debug!(endpoint = %endpoint, groups = ?group_ids, "directory PUT");

        let response = self
            .http_client
            .put(self.url(&endpoint))
            .json(&AssignGroupsRequest { groups: group_ids })
            .send()
            .await
            .map_err(|e| DirectoryError::transport(endpoint.as_str(), e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(DirectoryError::Assignment {
            hardware_address,
            status: status.as_u16(),
            body: error_body(response).await,
        })
    }
}

#[async_trait]
impl GroupProvisioner for PiholeClient {
    async fn find_group(&self, name: &str) -> DirectoryResult<Option<Group>> {
        let endpoint = format!("{GROUPS_ENDPOINT}/{name}");
        debug!(endpoint = %endpoint, "directory GET");

        let response = self
            .http_client
            .get(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| DirectoryError::transport(endpoint.as_str(), e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(upstream_status(&endpoint, status));
        }

        let body: GroupListResponse = decode_body(&endpoint, response).await?;
        Ok(body
            .groups
            .into_iter()
            .filter_map(|value| match Group::deserialize(&value) {
                Ok(group) => Some(group),
                Err(e) => {
                    debug!(
                        endpoint = %endpoint,
                        entry = %value,
                        error = %e,
                        "skipping undecodable group entry"
                    );
                    None
                }
            })
            .find(|group| group.name == name))
    }

    async fn create_group(&self, name: &str, comment: &str) -> DirectoryResult<u32> {
        debug!(endpoint = GROUPS_ENDPOINT, name, "directory POST");
        let response = self
            .http_client
            .post(self.url(GROUPS_ENDPOINT))
            .json(&CreateGroupRequest {
                name,
                comment,
                enabled: true,
            })
            .send()
            .await
            .map_err(|e| DirectoryError::transport(GROUPS_ENDPOINT, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Creation {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let body: GroupListResponse = decode_body(GROUPS_ENDPOINT, response).await?;
        body.groups
            .first()
            .and_then(|group| group.get("id"))
            .and_then(serde_json::Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
            .filter(|id| *id != DEFAULT_GROUP_ID)
            .ok_or_else(|| {
                DirectoryError::malformed(
                    GROUPS_ENDPOINT,
                    "missing or reserved groups[0].id in response",
                )
            })
    }

    async fn delete_group(&self, name: &str) -> DirectoryResult<()> {
        let endpoint = format!("{GROUPS_ENDPOINT}/{name}");
        debug!(endpoint = %endpoint, "directory DELETE");

        let response = self
            .http_client
            .delete(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| DirectoryError::transport(endpoint.as_str(), e))?;

        let status = response.status();
        // Already gone counts as deleted.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(upstream_status(&endpoint, status))
        }
    }
}

fn upstream_status(endpoint: &str, status: StatusCode) -> DirectoryError {
    DirectoryError::UpstreamStatus {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

async fn decode_body<T: DeserializeOwned>(endpoint: &str, response: Response) -> DirectoryResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| DirectoryError::transport(endpoint, e))?;
    serde_json::from_str(&body)
        .map_err(|e| DirectoryError::malformed(endpoint, format!("Failed to parse response: {e}")))
}

async fn error_body(response: Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body
    }
}
