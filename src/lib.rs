//! Populate one configuration struct from several sources.
//!
//! A struct deriving [`Record`] is filled in layers: `default` tags, then
//! config files (TOML, JSON or YAML), then environment variables, then
//! command line flags. Every source writes text through the same coercion
//! rules ([`Value`]), and a source with no value for a field leaves it alone.
//! After loading, [`RequiredValidator`] reports every marked field still at
//! its zero value.
//!
//! ```rust
//! use multiconf::{DefaultLoader, EnvLoader, FlagLoader, Record};
//! use std::time::Duration;
//!
//! #[derive(Debug, Default, Record)]
//! struct Postgres {
//!     #[config(default = 5432)]
//!     port: u16,
//!     hosts: Vec<String>,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct Server {
//!     #[config(required)]
//!     name: String,
//!     #[config(default = "30s")]
//!     timeout: Duration,
//!     #[config(nested)]
//!     postgres: Postgres,
//! }
//!
//! let mut server = Server::default();
//! DefaultLoader::new()
//!     .env(EnvLoader::new().vars([("SERVER_NAME", "koding")]))
//!     .flag(FlagLoader::new().args(["--postgres-hosts", "db1,db2"]))
//!     .load(&mut server)
//!     .unwrap();
//!
//! assert_eq!(server.name, "koding");
//! assert_eq!(server.timeout, Duration::from_secs(30));
//! assert_eq!(server.postgres.hosts, ["db1", "db2"]);
//! ```

extern crate self as multiconf;

pub mod builder;
pub mod docs;
pub mod duration;
pub mod error;
pub mod field;
pub mod kind;
pub mod loader;
pub mod macros;
pub mod naming;
pub mod validator;
pub mod value;
pub mod walk;

pub use builder::DefaultLoader;
pub use docs::{FieldSummary, summarize, write_docs};
pub use error::{CoerceError, Error, RequiredError, format_errors};
pub use field::{FieldDef, Record, Schema, Shape, Slot, SlotMut, get_path, set_path};
pub use kind::Kind;
pub use loader::{EnvLoader, FileLoader, FlagLoader, Format, Loader, MultiLoader, TagLoader};
pub use naming::Naming;
pub use validator::{MultiValidator, RequiredValidator, Validator};
pub use value::Value;
pub use walk::{Leaf, walk};

// Re-export derive macro
pub use multiconf_macros::Record;
