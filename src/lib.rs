//! Bind environment variables onto nested configuration structs.
//!
//! Fields opt in with `#[env("VAR")]`. Nested structs are walked whether or
//! not they are tagged, `Option<Struct>` fields are allocated before being
//! walked, and a variable that is unset leaves its field alone. With the
//! `file` feature a TOML file can be decoded first, so the environment
//! overrides whatever the file provided.
//!
//! ```rust
//! use config_bindr::{load_env_from, Bind};
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! #[derive(Bind, Default)]
//! struct Server {
//!     #[env("SERVER_PORT")]
//!     pub port: u16,
//!     #[env("SERVER_TIMEOUT")]
//!     pub timeout: Duration,
//! }
//!
//! #[derive(Bind, Default)]
//! struct Config {
//!     pub server: Server,
//!     #[env("ALLOWED_HOSTS")]
//!     pub allowed_hosts: Vec<String>,
//! }
//!
//! let env: HashMap<String, String> = [
//!     ("SERVER_PORT", "8080"),
//!     ("SERVER_TIMEOUT", "1m30s"),
//!     ("ALLOWED_HOSTS", "a.example, b.example"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let mut config = Config::default();
//! load_env_from(&mut config, &env).unwrap();
//! assert_eq!(config.server.port, 8080);
//! assert_eq!(config.server.timeout, Duration::from_secs(90));
//! assert_eq!(config.allowed_hosts, vec!["a.example", "b.example"]);
//! ```

extern crate self as config_bindr;

pub mod bind;
pub mod builder;
pub mod duration;
pub mod environment;
pub mod error;
pub mod field;
#[cfg(feature = "file")]
pub mod file;
mod leaf;

// Re-export main types
pub use bind::{describe, load_env, load_env_from, Bind, Binder, Shape};
pub use builder::{format_docs, write_docs, ConfigLoader};
pub use environment::{DotenvFile, EnvSource, Layered, ProcessEnv};
pub use error::{ConfigError, ParseError};
pub use field::{Binding, FieldDescriptor, Tag};
#[cfg(feature = "file")]
pub use file::{decode_file, load_config, load_config_from};

// Re-export derive
pub use config_bindr_macros::Bind;
