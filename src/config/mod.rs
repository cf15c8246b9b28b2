//! Layered service configuration.
//!
//! Resolution order, lowest to highest:
//! 1. **Defaults** - compiled-in constants (plus the computed service name)
//! 2. **Environment** - typed keys coerced in place, the rest merged as a
//!    declarative document
//! 3. **File** - an optional YAML document at a caller-supplied path
//!
//! Later layers override only the keys they name. The terminal
//! configuration block lives outside the layering entirely: the core
//! service pushes it at runtime through [`TerminalConfigCell`].

mod loader;
mod merge;
mod terminal;
mod types;

pub use merge::deep_merge;
pub use terminal::{TerminalConfig, TerminalConfigCell};
pub use types::{Config, REPLAY_CIPHER_KEY};
