//! Layered configuration loading.
//!
//! `Config::load` runs two passes over a default-populated configuration:
//! an environment pass, then a file pass. Both funnel through the same
//! document merge, so the file layer wins over the environment layer and
//! both win over compiled-in defaults.
//!
//! A handful of environment keys need non-string coercion (switches, the
//! SSH timeout, the Redis database index, the cluster list) and are applied
//! directly to the struct; every other environment entry rides the generic
//! document path. Coercion failures on the typed keys keep the prior value
//! and are never an error.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use super::merge::deep_merge;
use super::types::Config;
use crate::error::ConfigError;

impl Config {
    /// Layer environment and file overrides onto this configuration.
    ///
    /// The environment pass always runs; the file pass runs when `path` is
    /// readable. Both passes apply as much as they can: a malformed layer is
    /// logged and its error returned, but earlier layers stay applied. A
    /// missing or unreadable file is not an error. The language-code
    /// invariant is restored before returning, on success and failure alike.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        debug!("loading configuration overrides from the environment");
        let env_result = self.load_from_env();
        if let Err(err) = &env_result {
            warn!("environment overrides only partially applied: {err}");
        }

        let file_result = self.load_from_file(path.as_ref());
        self.ensure_valid();

        // A file-layer failure takes precedence in the returned result; an
        // environment-layer failure alone still surfaces to the caller.
        file_result.and(env_result)
    }

    /// Apply overrides from the process environment.
    ///
    /// Typed keys get bespoke coercion with keep-prior-value leniency; all
    /// other entries are collected into a single declarative document (each
    /// value read as a YAML scalar) and merged like a file. Entries whose
    /// name or value is not valid UTF-8 are skipped.
    pub fn load_from_env(&mut self) -> Result<(), ConfigError> {
        let mut overrides = Map::new();
        for (key, value) in std::env::vars_os() {
            let (Some(key), Some(value)) = (key.to_str(), value.to_str()) else {
                continue;
            };
            match key {
                "SFTP_SHOW_HIDDEN_FILE" => {
                    if let Some(on) = parse_switch(value) {
                        self.show_hidden_file = on;
                    }
                }
                "REUSE_CONNECTION" => {
                    if let Some(on) = parse_switch(value) {
                        self.reuse_connection = on;
                    }
                }
                "UPLOAD_FAILED_REPLAY_ON_START" => {
                    if let Some(on) = parse_switch(value) {
                        self.upload_failed_replay = on;
                    }
                }
                "SSH_TIMEOUT" => {
                    if let Some(secs) = parse_unsigned(value) {
                        self.ssh_timeout = secs;
                    }
                }
                "REDIS_DB_ROOM" => {
                    if let Some(index) = parse_unsigned(value) {
                        self.redis_db_index = index;
                    }
                }
                "REDIS_CLUSTERS" => {
                    self.redis_clusters = split_list(value);
                }
                _ => {
                    overrides.insert(key.to_string(), scalar_value(value));
                }
            }
        }
        self.apply_document(Value::Object(overrides))
    }

    /// Apply overrides from a YAML file, if one exists at `path`.
    ///
    /// Absent or unreadable files are treated as "no override layer". A file
    /// that reads but does not parse or apply is an error.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) => {
                debug!("no configuration file at {}: {err}", path.display());
                return Ok(());
            }
        };
        info!("loading configuration overrides from {}", path.display());
        self.apply_yaml(&body).inspect_err(|err| {
            warn!("failed to apply {}: {err}", path.display());
        })
    }

    /// Parse a YAML document and merge it onto this configuration.
    pub fn apply_yaml(&mut self, body: &str) -> Result<(), ConfigError> {
        let document: Value = serde_yaml::from_str(body)?;
        self.apply_document(document)
    }

    /// Merge one declarative document onto the configuration.
    ///
    /// Round-trips through `serde_json::Value`: serialize the current state,
    /// deep-merge the document over it, deserialize back. Unknown keys fall
    /// away in the final deserialize. If the merged document does not match
    /// the schema, the configuration is left untouched.
    fn apply_document(&mut self, document: Value) -> Result<(), ConfigError> {
        let base = serde_json::to_value(&*self)?;
        let merged = deep_merge(base, document);
        let mut next: Config = serde_json::from_value(merged)?;
        // The terminal slot is serde-skipped; keep the live cell.
        next.terminal = self.terminal.clone();
        *self = next;
        Ok(())
    }
}

/// Coerce a switch-style value: "true"/"on" and "false"/"off" in any case;
/// anything else is "no change".
fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" => Some(true),
        "false" | "off" => Some(false),
        _ => None,
    }
}

/// Coerce an unsigned integer value; non-numeric is "no change".
fn parse_unsigned(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Split a comma-separated address list, preserving order.
fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

/// Read an environment value as a YAML scalar so numeric and boolean
/// spellings keep their type through the merge. Values that are not plain
/// scalars (or fail to parse as YAML at all) stay raw strings.
fn scalar_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => scalar,
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_accepts_true_on_false_off_any_case() {
        assert_eq!(parse_switch("True"), Some(true));
        assert_eq!(parse_switch("ON"), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("false"), Some(false));
    }

    #[test]
    fn switch_leaves_other_values_unchanged() {
        assert_eq!(parse_switch("maybe"), None);
        assert_eq!(parse_switch("1"), None);
        assert_eq!(parse_switch(""), None);
    }

    #[test]
    fn unsigned_ignores_non_numeric() {
        assert_eq!(parse_unsigned("30"), Some(30));
        assert_eq!(parse_unsigned(" 45 "), Some(45));
        assert_eq!(parse_unsigned("soon"), None);
        assert_eq!(parse_unsigned("-3"), None);
    }

    #[test]
    fn list_splits_on_commas_in_order() {
        assert_eq!(split_list("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("single"), vec!["single"]);
    }

    #[test]
    fn scalar_keeps_numeric_and_boolean_typing() {
        assert_eq!(scalar_value("45"), Value::from(45));
        assert_eq!(scalar_value("true"), Value::from(true));
        assert_eq!(scalar_value("DEBUG"), Value::from("DEBUG"));
        assert_eq!(scalar_value(""), Value::from(""));
    }

    #[test]
    fn scalar_falls_back_to_raw_string_for_non_scalars() {
        // Parses as a YAML sequence; must stay a plain string.
        assert_eq!(scalar_value("[1, 2]"), Value::from("[1, 2]"));
        // Not valid YAML at all (block scalar header with inline content).
        assert_eq!(
            scalar_value("| /usr/bin/lesspipe %s"),
            Value::from("| /usr/bin/lesspipe %s")
        );
    }

    #[test]
    fn apply_yaml_overrides_only_named_keys() {
        let mut config = Config::default();
        config
            .apply_yaml("BIND_HOST: 10.0.0.1\nSSH_TIMEOUT: 60\n")
            .unwrap();
        assert_eq!(config.bind_host, "10.0.0.1");
        assert_eq!(config.ssh_timeout, 60);
        assert_eq!(config.sshd_port, "2222");
    }

    #[test]
    fn apply_yaml_rejects_malformed_documents() {
        let mut config = Config::default();
        assert!(config.apply_yaml("BIND_HOST: [unterminated").is_err());
    }

    #[test]
    fn failed_apply_leaves_configuration_untouched() {
        let mut config = Config::default();
        config.bind_host = "10.1.2.3".to_string();
        let result = config.apply_yaml("CLIENT_ALIVE_INTERVAL: soon\n");
        assert!(result.is_err());
        assert_eq!(config.bind_host, "10.1.2.3");
        assert_eq!(config.client_alive_interval, 30);
    }

    #[test]
    fn unknown_document_keys_are_ignored() {
        let mut config = Config::default();
        config
            .apply_yaml("SOME_FUTURE_KEY: whatever\nLOG_LEVEL: DEBUG\n")
            .unwrap();
        assert_eq!(config.log_level, "DEBUG");
    }

    #[test]
    fn apply_document_preserves_the_terminal_cell() {
        use crate::config::TerminalConfig;

        let mut config = Config::default();
        config.update_terminal_conf(TerminalConfig {
            max_idle_time: 99,
            ..TerminalConfig::default()
        });
        config.apply_yaml("LOG_LEVEL: WARN\n").unwrap();
        assert_eq!(config.terminal_conf().unwrap().max_idle_time, 99);
    }
}
