//! Script identity model shared by the location scanners and the CLI.
//!
//! A [`Script`] is derived from nothing but its path relative to a location root:
//! the numeric index of every path segment, the target database marker, the
//! qualifier tags and whether it lives in the pre- or postprocessing folder.

pub mod config;
pub mod encoding;
pub mod error;
pub mod factory;
pub mod indexes;
pub mod qualifier;
pub mod script;

pub use config::ScriptConfig;
pub use encoding::ScriptEncoding;
pub use error::{Result, ScriptError};
pub use factory::ScriptFactory;
pub use indexes::ScriptIndexes;
pub use qualifier::{validate_qualifiers, Qualifier};
pub use script::{Script, ScriptContent, ScriptKind};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
