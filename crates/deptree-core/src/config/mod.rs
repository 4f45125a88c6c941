//! Layered deptree settings
//!
//! Settings come from the global config dir, the project's
//! `.deptree/config.toml`, its git-ignored `.deptree/config.local.toml`, and
//! finally from command-line overrides. See [`ConfigResolver`].

mod resolver;
mod settings;

pub use resolver::ConfigResolver;
pub use settings::{Settings, SettingsLayer};
