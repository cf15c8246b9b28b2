//! Configuration resolution for the termgate terminal gateway.
//!
//! Produces one internally consistent [`Config`] from compiled-in defaults,
//! process environment variables, and an optional YAML file, in that
//! precedence order, and holds the terminal configuration block that the
//! core service pushes while the gateway runs.
//!
//! ```no_run
//! use termgate_config::Config;
//!
//! # fn main() -> Result<(), termgate_config::ConfigError> {
//! let mut config = Config::default();
//! config.load("config.yaml")?;
//! println!("binding {}:{}", config.bind_host, config.sshd_port);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod paths;

pub use config::{Config, REPLAY_CIPHER_KEY, TerminalConfig, TerminalConfigCell};
pub use error::ConfigError;
