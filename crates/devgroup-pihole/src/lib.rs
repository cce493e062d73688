//! Device identity resolution and group reconciliation for Pi-hole style
//! access-control directories.
//!
//! The caller's network address is resolved to a hardware address through
//! the directory's device table, matched against the client registry, and
//! the client's group set is reconciled so every device ends up in the
//! default group plus exactly one dedicated group.

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod reconciler;
pub mod traits;

pub use client::PiholeClient;
pub use config::{ConfigError, DirectoryConfig};
pub use error::{DirectoryError, DirectoryResult};
pub use reconciler::{
    classify_groups, Diagnostic, GroupState, ReconciliationResult, Reconciler, Stage,
    UnresolvedReason,
};
