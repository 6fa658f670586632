pub mod copy_check;
pub mod copy_patches;
pub mod etl;
pub mod market_stats;
pub mod neighborhood_centers;
pub mod records;
pub mod text;
pub mod zip_centroids;

pub use crate::domain::model::RunReport;
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
