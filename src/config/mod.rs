#[cfg(feature = "cli")]
pub mod cli;
pub mod input;
pub mod toml_config;

pub use input::ZipSource;
pub use toml_config::{MapboxSettings, SanitySettings, ToolConfig};
