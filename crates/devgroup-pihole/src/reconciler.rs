//! Per-request reconciliation of a device's directory group.
//!
//! One call to [`Reconciler::reconcile`] resolves the caller's address to a
//! hardware address, looks up the matching client record, classifies its
//! group set and, when the client only sits in the default group, provisions
//! a dedicated group for it. Every failure is downgraded to an absent field
//! plus a [`Diagnostic`]; the call itself never fails.
//!
//! Provisioning is not atomic across invocations. Two requests for the same
//! unprovisioned device can both create a group; the name lookup performed
//! before creation only narrows that window.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::address::normalize_client_address;
use crate::client::PiholeClient;
use crate::error::DirectoryError;
use crate::lookup::{
    canonical_hardware_address, find_client_record, group_comment_for, group_name_for,
    resolve_hardware_address,
};
use crate::models::{Device, DEFAULT_GROUP_ID};
use crate::traits::{ClientRegistry, DeviceDirectory, GroupProvisioner};

/// Classification of a client's group set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    /// Exactly `[0, g]`: the client already owns group `g`.
    SteadyState(u32),
    /// Exactly `[0]`: a dedicated group must be created and assigned.
    NeedsProvisioning,
    /// Anything this crate will not act on.
    Unresolved(UnresolvedReason),
}

/// Why a group set could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No hardware address, no client record, or the registry was unreadable.
    NoRecord,
    /// A group set of any other shape. Never repaired.
    InvariantMismatch(Vec<u32>),
}

/// Classify a client's observed group set.
#[must_use]
pub fn classify_groups(groups: Option<&[u32]>) -> GroupState {
    match groups {
        None => GroupState::Unresolved(UnresolvedReason::NoRecord),
        Some([DEFAULT_GROUP_ID]) => GroupState::NeedsProvisioning,
        Some(&[DEFAULT_GROUP_ID, custom] | &[custom, DEFAULT_GROUP_ID])
            if custom != DEFAULT_GROUP_ID =>
        {
            GroupState::SteadyState(custom)
        }
        Some(other) => GroupState::Unresolved(UnresolvedReason::InvariantMismatch(other.to_vec())),
    }
}

/// Step of the reconciliation a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DeviceLookup,
    ClientLookup,
    Classification,
    GroupLookup,
    GroupCreation,
    Assignment,
    Compensation,
}

/// A degraded step recorded during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    /// Machine-readable code, see [`DirectoryError::error_code`].
    pub code: &'static str,
    pub detail: String,
}

impl Diagnostic {
    fn new(stage: Stage, code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            detail: detail.into(),
        }
    }

    fn from_error(stage: Stage, err: &DirectoryError) -> Self {
        Self::new(stage, err.error_code(), err.to_string())
    }
}

/// Snapshot handed to the presentation layer. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Caller address after normalization.
    pub client_address: String,
    pub resolved_devices: Option<Vec<Device>>,
    /// Hardware address as reported by the device directory.
    pub hardware_address: Option<String>,
    /// Group set observed before any write.
    pub group_ids: Option<Vec<u32>>,
    /// The client's dedicated group, once known.
    pub resolved_group: Option<u32>,
    pub client_found: bool,
    /// Set only when the device directory could not be read.
    pub error: Option<String>,

    #[serde(skip)]
    pub state: GroupState,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ReconciliationResult {
    fn new(client_address: String) -> Self {
        Self {
            client_address,
            resolved_devices: None,
            hardware_address: None,
            group_ids: None,
            resolved_group: None,
            client_found: false,
            error: None,
            state: GroupState::Unresolved(UnresolvedReason::NoRecord),
            diagnostics: Vec::new(),
        }
    }
}

/// Composes the directory capabilities into the reconciliation flow.
#[derive(Clone)]
pub struct Reconciler {
    devices: Arc<dyn DeviceDirectory>,
    registry: Arc<dyn ClientRegistry>,
    provisioner: Arc<dyn GroupProvisioner>,
}

impl Reconciler {
    pub fn new(
        devices: Arc<dyn DeviceDirectory>,
        registry: Arc<dyn ClientRegistry>,
        provisioner: Arc<dyn GroupProvisioner>,
    ) -> Self {
        Self {
            devices,
            registry,
            provisioner,
        }
    }

    /// Drive every capability through one HTTP client.
    #[must_use]
    pub fn from_client(client: PiholeClient) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client.clone(), client)
    }

    /// Run the full chain once for the caller at `raw_address`.
    pub async fn reconcile(&self, raw_address: &str) -> ReconciliationResult {
        let mut result = ReconciliationResult::new(normalize_client_address(raw_address));
        info!(client_address = %result.client_address, "reconciling device group");

        let devices = match self.devices.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                error!(
                    client_address = %result.client_address,
                    error = %e,
                    error_code = e.error_code(),
                    "Failed to fetch network devices"
                );
                result.error = Some(match &e {
                    DirectoryError::UpstreamStatus { status_text, .. } => {
                        format!("Failed to fetch network devices: {status_text}")
                    }
                    other => format!("An error occurred: {other}"),
                });
                result
                    .diagnostics
                    .push(Diagnostic::from_error(Stage::DeviceLookup, &e));
                return result;
            }
        };

        result.hardware_address =
            resolve_hardware_address(&devices, &result.client_address).map(str::to_string);
        result.resolved_devices = Some(devices);

        let Some(hardware_address) = result.hardware_address.clone() else {
            let e = DirectoryError::IdentityUnresolved(result.client_address.clone());
            info!(client_address = %result.client_address, "no device matches client address");
            result
                .diagnostics
                .push(Diagnostic::from_error(Stage::DeviceLookup, &e));
            return result;
        };
        info!(hardware_address = %hardware_address, "resolved client hardware address");

        self.lookup_client(&hardware_address, &mut result).await;

        let state = classify_groups(result.group_ids.as_deref());
        result.resolved_group = match &state {
            GroupState::SteadyState(group_id) => Some(*group_id),
            GroupState::NeedsProvisioning => {
                self.provision(&hardware_address, &mut result.diagnostics)
                    .await
            }
            GroupState::Unresolved(UnresolvedReason::InvariantMismatch(groups)) => {
                let e = DirectoryError::InvariantMismatch(groups.clone());
                warn!(
                    hardware_address = %hardware_address,
                    groups = ?groups,
                    "group set not in a recognized shape, leaving untouched"
                );
                result
                    .diagnostics
                    .push(Diagnostic::from_error(Stage::Classification, &e));
                None
            }
            GroupState::Unresolved(UnresolvedReason::NoRecord) => None,
        };
        result.state = state;
        result
    }

    /// Fill `group_ids` and `client_found` from the client registry.
    async fn lookup_client(&self, hardware_address: &str, result: &mut ReconciliationResult) {
        let records = match self.registry.list_client_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    hardware_address,
                    error = %e,
                    error_code = e.error_code(),
                    "Failed to fetch client list"
                );
                result
                    .diagnostics
                    .push(Diagnostic::from_error(Stage::ClientLookup, &e));
                return;
            }
        };

        match find_client_record(&records, hardware_address) {
            Some(record) => {
                info!(hardware_address, groups = ?record.groups, "client record found");
                result.group_ids = Some(record.groups.clone());
                result.client_found = true;
            }
            None => {
                let e = DirectoryError::ClientUnresolved(hardware_address.to_string());
                info!(hardware_address, "hardware address not in client list");
                result
                    .diagnostics
                    .push(Diagnostic::from_error(Stage::ClientLookup, &e));
            }
        }
    }

    /// Give a default-only client its own group. Returns the group on success.
    async fn provision(
        &self,
        hardware_address: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<u32> {
        let name = group_name_for(hardware_address);

        let (group_id, created) = match self.provisioner.find_group(&name).await {
            Ok(Some(existing)) if existing.id != DEFAULT_GROUP_ID => {
                info!(group = %name, group_id = existing.id, "reusing existing group");
                (existing.id, false)
            }
            Ok(_) => {
                let comment = group_comment_for(hardware_address);
                match self.provisioner.create_group(&name, &comment).await {
                    Ok(group_id) => {
                        info!(group = %name, group_id, "created group");
                        (group_id, true)
                    }
                    Err(e) => {
                        warn!(group = %name, error = %e, "Failed to create new group");
                        diagnostics.push(Diagnostic::from_error(Stage::GroupCreation, &e));
                        return None;
                    }
                }
            }
            Err(e) => {
                warn!(group = %name, error = %e, "group lookup failed, skipping provisioning");
                diagnostics.push(Diagnostic::from_error(Stage::GroupLookup, &e));
                return None;
            }
        };

        let canonical = canonical_hardware_address(hardware_address);
        let groups = [DEFAULT_GROUP_ID, group_id];
        match self.registry.assign_groups(&canonical, &groups).await {
            Ok(()) => {
                info!(hardware_address, group_id, "assigned client to group");
                Some(group_id)
            }
            Err(e) => {
                warn!(
                    hardware_address,
                    group_id,
                    error = %e,
                    "Failed to assign new group to client"
                );
                diagnostics.push(Diagnostic::from_error(Stage::Assignment, &e));
                if created {
                    self.compensate(&name, group_id, diagnostics).await;
                }
                None
            }
        }
    }

    /// Remove a group created by this call whose assignment failed.
    async fn compensate(&self, name: &str, group_id: u32, diagnostics: &mut Vec<Diagnostic>) {
        match self.provisioner.delete_group(name).await {
            Ok(()) => {
                info!(group = %name, group_id, "rolled back unassigned group");
                diagnostics.push(Diagnostic::new(
                    Stage::Compensation,
                    "group_rolled_back",
                    format!("deleted group {name} ({group_id}) after failed assignment"),
                ));
            }
            Err(e) => {
                error!(
                    group = %name,
                    group_id,
                    error = %e,
                    "orphaned group left in directory"
                );
                diagnostics.push(Diagnostic::new(
                    Stage::Compensation,
                    "orphaned_group",
                    format!("group {name} ({group_id}) could not be deleted: {e}"),
                ));
            }
        }
    }
}
