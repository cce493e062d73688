//! Mock Pi-hole API using wiremock for integration testing.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devgroup_pihole::{PiholeClient, Reconciler};

pub const HW: &str = "AA:BB:CC:DD:EE:FF";
pub const IP: &str = "192.168.0.10";
pub const GROUP_NAME: &str = "group-for-AA-BB-CC-DD-EE-FF";

/// A wiremock server answering the directory endpoints.
pub struct MockPihole {
    server: MockServer,
}

impl MockPihole {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> PiholeClient {
        PiholeClient::with_http_client(self.uri(), reqwest::Client::new())
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::from_client(self.client())
    }

    /// Number of non-GET requests the server has seen.
    pub async fn write_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() != "GET")
            .count()
    }

    // =========================================================================
    // Devices
    // =========================================================================

    pub async fn mock_devices(&self, devices: Value) {
        Mock::given(method("GET"))
            .and(path("/api/network/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": devices })))
            .mount(&self.server)
            .await;
    }

    /// One device owning [`IP`] under [`HW`].
    pub async fn mock_single_device(&self) {
        self.mock_devices(json!([
            { "hwaddr": HW.to_lowercase(), "interface": "eth0", "ips": [{ "ip": IP }] }
        ]))
        .await;
    }

    pub async fn mock_devices_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/network/devices"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Clients
    // =========================================================================

    pub async fn mock_clients(&self, clients: Value) {
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "clients": clients })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_client_groups(&self, groups: &[u32]) {
        self.mock_clients(json!([
            { "client": "11:11:11:11:11:11", "groups": [0] },
            { "client": HW, "groups": groups }
        ]))
        .await;
    }

    pub async fn mock_clients_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one assignment of `groups` to [`HW`].
    pub async fn expect_assign(&self, groups: &[u32], status: u16) {
        Mock::given(method("PUT"))
            .and(path(format!("/api/clients/{HW}")))
            .and(body_json(json!({ "groups": groups })))
            .respond_with(ResponseTemplate::new(status).set_body_string(if status < 300 {
                ""
            } else {
                "assignment rejected"
            }))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Groups
    // =========================================================================

    pub async fn mock_group_missing(&self) {
        Mock::given(method("GET"))
            .and(path(format!("/api/groups/{GROUP_NAME}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_group_exists(&self, id: u32) {
        Mock::given(method("GET"))
            .and(path(format!("/api/groups/{GROUP_NAME}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "groups": [{ "id": id, "name": GROUP_NAME, "comment": null, "enabled": true }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one creation of [`GROUP_NAME`], answered with `id`.
    pub async fn expect_create(&self, id: u32) {
        Mock::given(method("POST"))
            .and(path("/api/groups"))
            .and(body_json(json!({
                "name": GROUP_NAME,
                "comment": format!("Auto-created for {HW}"),
                "enabled": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "groups": [{ "id": id, "name": GROUP_NAME, "enabled": true }],
                "processed": { "success": [{ "item": GROUP_NAME }], "errors": [] }
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn expect_delete(&self, status: u16, times: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/groups/{GROUP_NAME}")))
            .respond_with(ResponseTemplate::new(status))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}
