//! Configuration types and compiled-in defaults.
//!
//! Every field carries exactly one externally visible key (its serde rename),
//! shared by the YAML file layer and the environment layer. Defaults live in
//! per-field functions so a partial document deserializes cleanly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::terminal::{TerminalConfig, TerminalConfigCell};
use crate::paths;

/// Fixed 32-byte key used to encrypt locally buffered replay files before
/// they are shipped to the core service.
pub const REPLAY_CIPHER_KEY: &str = "TermGate Replay Cipher Key 0001!";

/// Prefix prepended to the machine host name to form the default service name.
const NAME_PREFIX: &str = "[TermGate]";

/// Upper bound on the service name, counted in Unicode code points.
const NAME_MAX_CHARS: usize = 32;

/// Fallback when the language code resolves to an empty string.
const FALLBACK_LANGUAGE: &str = "en";

/// Resolved service configuration.
///
/// Constructed once at startup from compiled-in defaults, then layered with
/// environment and file overrides by [`Config::load`]. After loading, every
/// field holds either an explicit override or its default; nothing is left in
/// an ambiguous unset state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name registered with the core service.
    #[serde(rename = "NAME", default = "default_name")]
    pub name: String,

    /// Path to the SSH host key, relative to the root path unless absolute.
    #[serde(rename = "HOST_KEY_FILE", default = "default_host_key_file")]
    pub host_key_file: String,

    /// Base URL of the core service.
    #[serde(rename = "CORE_HOST", default = "default_core_host")]
    pub core_host: String,

    /// One-time token used to register with the core service.
    #[serde(rename = "BOOTSTRAP_TOKEN", default)]
    pub bootstrap_token: String,

    /// Address the SSH and HTTP listeners bind to.
    #[serde(rename = "BIND_HOST", default = "default_bind_host")]
    pub bind_host: String,

    /// SSH listener port.
    #[serde(
        rename = "SSHD_PORT",
        default = "default_sshd_port",
        deserialize_with = "coerce::flex_string"
    )]
    pub sshd_port: String,

    /// HTTP listener port.
    #[serde(
        rename = "HTTPD_PORT",
        default = "default_httpd_port",
        deserialize_with = "coerce::flex_string"
    )]
    pub httpd_port: String,

    /// SSH connect timeout in seconds.
    #[serde(
        rename = "SSH_TIMEOUT",
        default = "default_ssh_timeout",
        deserialize_with = "coerce::flex_u64"
    )]
    pub ssh_timeout: u64,

    /// Inline access key, `id:secret`. Takes precedence over the key file.
    #[serde(rename = "ACCESS_KEY", default)]
    pub access_key: String,

    /// Access key file, relative to the root path unless absolute.
    #[serde(rename = "ACCESS_KEY_FILE", default = "default_access_key_file")]
    pub access_key_file: String,

    /// Log level name passed to the host's subscriber.
    #[serde(rename = "LOG_LEVEL", default = "default_log_level")]
    pub log_level: String,

    /// Root directory for data files; defaults to the working directory at
    /// construction time.
    #[serde(rename = "ROOT_PATH", default = "default_root_path")]
    pub root_path: PathBuf,

    /// Language code for user-facing messages.
    #[serde(rename = "LANGUAGE_CODE", default = "default_language_code")]
    pub language_code: String,

    /// Re-upload replay files left behind by a previous crash on startup.
    #[serde(rename = "UPLOAD_FAILED_REPLAY_ON_START", default = "default_true")]
    pub upload_failed_replay: bool,

    /// List dotfiles in SFTP directory listings.
    #[serde(rename = "SFTP_SHOW_HIDDEN_FILE", default)]
    pub show_hidden_file: bool,

    /// Reuse backend connections across sessions for the same user and asset.
    #[serde(rename = "REUSE_CONNECTION", default = "default_true")]
    pub reuse_connection: bool,

    /// Asset loading policy; empty means load on demand, "all" preloads.
    #[serde(rename = "ASSET_LOAD_POLICY", default)]
    pub asset_load_policy: String,

    /// Size cap for bulk-download zip archives, e.g. "1024M".
    #[serde(
        rename = "ZIP_MAX_SIZE",
        default = "default_zip_max_size",
        deserialize_with = "coerce::flex_string"
    )]
    pub zip_max_size: String,

    /// Scratch directory for building zip archives.
    #[serde(rename = "ZIP_TMP_PATH", default = "default_zip_tmp_path")]
    pub zip_tmp_path: String,

    /// Keepalive probe interval in seconds.
    #[serde(
        rename = "CLIENT_ALIVE_INTERVAL",
        default = "default_client_alive_interval",
        deserialize_with = "coerce::flex_u64"
    )]
    pub client_alive_interval: u64,

    /// Missed keepalive probes tolerated before a session is dropped.
    #[serde(
        rename = "RETRY_ALIVE_COUNT_MAX",
        default = "default_retry_alive_count_max",
        deserialize_with = "coerce::flex_i32"
    )]
    pub retry_alive_count_max: i32,

    /// Shared-session backend: "local" for in-process, "redis" for the broker.
    #[serde(rename = "SHARE_ROOM_TYPE", default = "default_share_room_type")]
    pub share_room_type: String,

    /// Redis broker host.
    #[serde(rename = "REDIS_HOST", default = "default_redis_host")]
    pub redis_host: String,

    /// Redis broker port.
    #[serde(
        rename = "REDIS_PORT",
        default = "default_redis_port",
        deserialize_with = "coerce::flex_string"
    )]
    pub redis_port: String,

    /// Redis password; empty disables auth.
    #[serde(rename = "REDIS_PASSWORD", default)]
    pub redis_password: String,

    /// Redis database index holding shared rooms.
    #[serde(
        rename = "REDIS_DB_ROOM",
        default,
        deserialize_with = "coerce::flex_u64"
    )]
    pub redis_db_index: u64,

    /// Redis cluster addresses; empty means a single-node broker.
    #[serde(rename = "REDIS_CLUSTERS", default)]
    pub redis_clusters: Vec<String>,

    /// Slot for the terminal configuration pushed by the core service at
    /// runtime. Shared, not deep-copied, across clones; never serialized.
    #[serde(skip, default)]
    pub terminal: TerminalConfigCell,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            host_key_file: default_host_key_file(),
            core_host: default_core_host(),
            bootstrap_token: String::new(),
            bind_host: default_bind_host(),
            sshd_port: default_sshd_port(),
            httpd_port: default_httpd_port(),
            ssh_timeout: default_ssh_timeout(),
            access_key: String::new(),
            access_key_file: default_access_key_file(),
            log_level: default_log_level(),
            root_path: default_root_path(),
            language_code: default_language_code(),
            upload_failed_replay: true,
            show_hidden_file: false,
            reuse_connection: true,
            asset_load_policy: String::new(),
            zip_max_size: default_zip_max_size(),
            zip_tmp_path: default_zip_tmp_path(),
            client_alive_interval: default_client_alive_interval(),
            retry_alive_count_max: default_retry_alive_count_max(),
            share_room_type: default_share_room_type(),
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            redis_password: String::new(),
            redis_db_index: 0,
            redis_clusters: Vec::new(),
            terminal: TerminalConfigCell::default(),
        }
    }
}

impl Config {
    /// Repair fields whose loaded value would be unusable. Currently this
    /// only covers the language code, which must never be empty.
    pub fn ensure_valid(&mut self) {
        if self.language_code.is_empty() {
            self.language_code = FALLBACK_LANGUAGE.to_string();
        }
    }

    /// Effective location of the access key file: the configured path if
    /// absolute, otherwise joined onto the root path. No I/O.
    pub fn access_key_file_path(&self) -> PathBuf {
        paths::resolve_under_root(&self.root_path, Path::new(&self.access_key_file))
    }

    /// Effective location of the SSH host key file.
    pub fn host_key_file_path(&self) -> PathBuf {
        paths::resolve_under_root(&self.root_path, Path::new(&self.host_key_file))
    }

    /// Copy of the terminal configuration last pushed by the core service,
    /// or `None` before the first push.
    pub fn terminal_conf(&self) -> Option<TerminalConfig> {
        self.terminal.get()
    }

    /// Replace the terminal configuration wholesale.
    pub fn update_terminal_conf(&self, conf: TerminalConfig) {
        self.terminal.update(conf);
    }
}

fn default_name() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default();
    truncated_name(&format!("{NAME_PREFIX}{host}"))
}

/// Bound a candidate name to [`NAME_MAX_CHARS`] code points by keeping the
/// first and last 16, so very long host names stay identifying at both ends.
fn truncated_name(candidate: &str) -> String {
    let chars: Vec<char> = candidate.chars().collect();
    if chars.len() <= NAME_MAX_CHARS {
        return candidate.to_string();
    }
    let half = NAME_MAX_CHARS / 2;
    chars[..half]
        .iter()
        .chain(chars[chars.len() - half..].iter())
        .collect()
}

fn default_host_key_file() -> String {
    "data/keys/host_key".to_string()
}

fn default_core_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_sshd_port() -> String {
    "2222".to_string()
}

fn default_httpd_port() -> String {
    "5000".to_string()
}

fn default_ssh_timeout() -> u64 {
    15
}

fn default_access_key_file() -> String {
    "data/keys/.access_key".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_root_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_language_code() -> String {
    FALLBACK_LANGUAGE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_zip_max_size() -> String {
    "1024M".to_string()
}

fn default_zip_tmp_path() -> String {
    "/tmp".to_string()
}

fn default_client_alive_interval() -> u64 {
    30
}

fn default_retry_alive_count_max() -> i32 {
    3
}

fn default_share_room_type() -> String {
    "local".to_string()
}

fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_port() -> String {
    "6379".to_string()
}

/// Lenient scalar deserializers shared by the file and environment layers.
///
/// The environment layer reads every value as a YAML scalar, so a numeric
/// override arrives as a number even when the target field is a string port,
/// and a file may quote a number targeting an integer field. Both spellings
/// coerce here; anything else fails the whole-document apply.
mod coerce {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        String(String),
        U64(u64),
        I64(i64),
    }

    pub(super) fn flex_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::String(s) => s,
            Scalar::U64(n) => n.to_string(),
            Scalar::I64(n) => n.to_string(),
        })
    }

    pub(super) fn flex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Scalar::deserialize(deserializer)? {
            Scalar::U64(n) => Ok(n),
            Scalar::I64(n) => u64::try_from(n).map_err(D::Error::custom),
            Scalar::String(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }

    pub(super) fn flex_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Scalar::deserialize(deserializer)? {
            Scalar::U64(n) => i32::try_from(n).map_err(D::Error::custom),
            Scalar::I64(n) => i32::try_from(n).map_err(D::Error::custom),
            Scalar::String(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }
}
