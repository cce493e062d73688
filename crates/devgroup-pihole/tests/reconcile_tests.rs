//! End-to-end reconciliation against a wiremock directory.

mod helpers;

use helpers::mock_pihole_server::{MockPihole, HW, IP};
use serde_json::json;

use devgroup_pihole::{GroupState, Stage};

#[tokio::test]
async fn test_steady_state_client_issues_no_writes() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server.mock_client_groups(&[0, 7]).await;

    let reconciler = server.reconciler();
    let first = reconciler.reconcile(&format!("::ffff:{IP}")).await;
    let second = reconciler.reconcile(&format!("::ffff:{IP}")).await;

    assert_eq!(first.client_address, IP);
    assert_eq!(first.resolved_group, Some(7));
    assert!(first.client_found);
    assert_eq!(first, second);
    assert_eq!(server.write_count().await, 0);
}

#[tokio::test]
async fn test_default_only_client_gets_dedicated_group() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server.mock_client_groups(&[0]).await;
    server.mock_group_missing().await;
    server.expect_create(23).await;
    server.expect_assign(&[0, 23], 200).await;

    let result = server.reconciler().reconcile(IP).await;

    assert_eq!(result.resolved_group, Some(23));
    assert_eq!(result.state, GroupState::NeedsProvisioning);
    assert_eq!(result.group_ids, Some(vec![0]));
    assert!(result.diagnostics.is_empty());
    assert_eq!(server.write_count().await, 2);
}

#[tokio::test]
async fn test_existing_group_is_assigned_without_creation() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server.mock_client_groups(&[0]).await;
    server.mock_group_exists(31).await;
    server.expect_assign(&[0, 31], 200).await;

    let result = server.reconciler().reconcile(IP).await;

    assert_eq!(result.resolved_group, Some(31));
    assert_eq!(server.write_count().await, 1);
}

#[tokio::test]
async fn test_failed_assignment_deletes_new_group() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server.mock_client_groups(&[0]).await;
    server.mock_group_missing().await;
    server.expect_create(23).await;
    server.expect_assign(&[0, 23], 400).await;
    server.expect_delete(204, 1).await;

    let result = server.reconciler().reconcile(IP).await;

    assert_eq!(result.resolved_group, None);
    let stages: Vec<Stage> = result.diagnostics.iter().map(|d| d.stage).collect();
    assert_eq!(stages, vec![Stage::Assignment, Stage::Compensation]);
    assert_eq!(result.diagnostics[1].code, "group_rolled_back");
}

#[tokio::test]
async fn test_three_groups_left_untouched() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server.mock_client_groups(&[0, 3, 9]).await;

    let result = server.reconciler().reconcile(IP).await;

    assert_eq!(result.resolved_group, None);
    assert_eq!(result.group_ids, Some(vec![0, 3, 9]));
    assert!(result.error.is_none());
    assert_eq!(server.write_count().await, 0);
}

#[tokio::test]
async fn test_device_directory_failure_sets_error() {
    let server = MockPihole::new().await;
    server.mock_devices_status(500).await;

    let result = server.reconciler().reconcile(IP).await;

    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(
        wire,
        json!({
            "clientAddress": IP,
            "resolvedDevices": null,
            "hardwareAddress": null,
            "groupIds": null,
            "resolvedGroup": null,
            "clientFound": false,
            "error": "Failed to fetch network devices: Internal Server Error"
        })
    );
}

#[tokio::test]
async fn test_client_list_failure_is_not_fatal() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server.mock_clients_status(502).await;

    let result = server.reconciler().reconcile(IP).await;

    assert!(result.error.is_none());
    assert_eq!(result.hardware_address.as_deref(), Some(HW.to_lowercase().as_str()));
    assert!(result.group_ids.is_none());
    assert!(!result.client_found);
    assert_eq!(result.resolved_devices.map(|d| d.len()), Some(1));
}

#[tokio::test]
async fn test_first_matching_device_wins() {
    let server = MockPihole::new().await;
    server
        .mock_devices(json!([
            { "hwaddr": HW, "ips": [{ "ip": IP }] },
            { "hwaddr": "22:22:22:22:22:22", "ips": [{ "ip": IP }] }
        ]))
        .await;
    server
        .mock_clients(json!([
            { "client": "22:22:22:22:22:22", "groups": [0, 5] },
            { "client": HW.to_lowercase(), "groups": [0, 6] }
        ]))
        .await;

    let result = server.reconciler().reconcile(IP).await;

    assert_eq!(result.hardware_address.as_deref(), Some(HW));
    assert_eq!(result.resolved_group, Some(6));
}

#[tokio::test]
async fn test_device_with_null_addresses_is_skipped() {
    let server = MockPihole::new().await;
    server
        .mock_devices(json!([
            { "hwaddr": "00:00:00:00:00:01", "ips": null },
            { "hwaddr": "00:00:00:00:00:02", "ips": [{ "ip": null }] },
            { "hwaddr": HW, "ips": [{ "ip": IP }] }
        ]))
        .await;
    server.mock_client_groups(&[0, 7]).await;

    let result = server.reconciler().reconcile(IP).await;

    assert!(result.error.is_none());
    assert_eq!(result.resolved_devices.map(|d| d.len()), Some(3));
    assert_eq!(result.hardware_address.as_deref(), Some(HW));
    assert_eq!(result.resolved_group, Some(7));
}

#[tokio::test]
async fn test_unrelated_client_with_null_groups_is_ignored() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server
        .mock_clients(json!([
            { "client": "11:11:11:11:11:11", "groups": null },
            { "client": HW, "groups": [0, 7] }
        ]))
        .await;

    let result = server.reconciler().reconcile(IP).await;

    assert!(result.client_found);
    assert_eq!(result.group_ids, Some(vec![0, 7]));
    assert_eq!(result.resolved_group, Some(7));
    assert!(result.diagnostics.is_empty());
}

#[tokio::test]
async fn test_matched_client_with_null_groups_is_left_alone() {
    let server = MockPihole::new().await;
    server.mock_single_device().await;
    server
        .mock_clients(json!([{ "client": HW, "groups": null }]))
        .await;

    let result = server.reconciler().reconcile(IP).await;

    assert!(result.client_found);
    assert_eq!(result.group_ids, Some(vec![]));
    assert_eq!(result.resolved_group, None);
    assert!(matches!(result.state, GroupState::Unresolved(_)));
    assert_eq!(server.write_count().await, 0);
}
