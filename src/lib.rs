pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, MapboxClient, RevalidateClient, SanityClient};
pub use config::{ToolConfig, ZipSource};
pub use core::{etl::EtlEngine, RunReport};
pub use utils::error::{EtlError, Result};
