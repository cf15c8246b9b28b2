//! Terminal configuration pushed by the core service at runtime.
//!
//! Unlike the rest of the configuration, this block is authored by the
//! control plane and replaced wholesale while the service runs. It is held
//! in an atomically swapped slot so session threads read a consistent
//! snapshot without coordinating with the updater.

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session policy block owned by the core service.
///
/// Never merged field by field: each push from the control plane replaces
/// the previous snapshot entirely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Page size for asset listings, e.g. "auto" or a number.
    #[serde(default)]
    pub asset_list_page_size: String,

    /// Sort order for asset listings.
    #[serde(default)]
    pub asset_list_sort_by: String,

    /// Seconds between keepalive reports to the core service.
    #[serde(default)]
    pub heartbeat_duration: u64,

    /// PEM-encoded host key issued by the core service.
    #[serde(default)]
    pub host_key: String,

    /// Minutes a session may idle before being closed.
    #[serde(default)]
    pub max_idle_time: u64,

    /// Whether password logins are accepted.
    #[serde(default)]
    pub password_auth: bool,

    /// Whether public key logins are accepted.
    #[serde(default)]
    pub public_key_auth: bool,

    /// Days finished session recordings are kept.
    #[serde(default)]
    pub session_keep_duration: u64,

    /// Regex marking a successful telnet login.
    #[serde(default)]
    pub telnet_success_regex: String,
}

/// Shared slot holding the current [`TerminalConfig`] snapshot.
///
/// Reads copy the snapshot out, so no caller ever holds a reference into
/// shared mutable state; updates swap the whole snapshot atomically. Clones
/// of the cell observe the same slot. The slot is empty until the control
/// plane pushes the first snapshot.
#[derive(Debug, Clone, Default)]
pub struct TerminalConfigCell {
    inner: Arc<ArcSwapOption<TerminalConfig>>,
}

impl TerminalConfigCell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current snapshot, or `None` before the first update.
    pub fn get(&self) -> Option<TerminalConfig> {
        self.inner.load_full().map(|conf| (*conf).clone())
    }

    /// Replace the held snapshot wholesale.
    pub fn update(&self, conf: TerminalConfig) {
        self.inner.store(Some(Arc::new(conf)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_before_first_update_is_none() {
        let cell = TerminalConfigCell::new();
        assert!(cell.get().is_none());
    }

    #[test]
    fn update_replaces_the_snapshot_wholesale() {
        let cell = TerminalConfigCell::new();
        cell.update(TerminalConfig {
            max_idle_time: 30,
            password_auth: true,
            ..TerminalConfig::default()
        });
        cell.update(TerminalConfig {
            max_idle_time: 60,
            ..TerminalConfig::default()
        });

        let conf = cell.get().unwrap();
        assert_eq!(conf.max_idle_time, 60);
        // The earlier snapshot's fields do not bleed through.
        assert!(!conf.password_auth);
    }

    #[test]
    fn get_returns_a_copy_not_the_live_value() {
        let cell = TerminalConfigCell::new();
        cell.update(TerminalConfig {
            host_key: "key-a".to_string(),
            ..TerminalConfig::default()
        });

        let mut copy = cell.get().unwrap();
        copy.host_key = "scribbled".to_string();
        assert_eq!(cell.get().unwrap().host_key, "key-a");
    }

    #[test]
    fn clones_share_the_same_slot() {
        let cell = TerminalConfigCell::new();
        let other = cell.clone();
        other.update(TerminalConfig {
            heartbeat_duration: 10,
            ..TerminalConfig::default()
        });
        assert_eq!(cell.get().unwrap().heartbeat_duration, 10);
    }
}
