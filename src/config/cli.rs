use crate::config::input::ZipSource;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_input_file, validate_non_empty_string, validate_path, validate_positive_number,
    validate_required_field, validate_url, Validate,
};
use clap::{ArgGroup, Args, Parser};

/// Flags every tool accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Optional TOML file with [sanity] / [mapbox] settings
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
#[command(group(ArgGroup::new("zip_source").required(true).args(["zips", "zips_file"])))]
pub struct ZipArgs {
    /// Comma list of ZIPs
    #[arg(long, value_delimiter = ',')]
    pub zips: Vec<String>,

    /// Text file with one ZIP per line
    #[arg(long)]
    pub zips_file: Option<String>,
}

impl ZipArgs {
    pub fn source(&self) -> ZipSource {
        match &self.zips_file {
            Some(path) => ZipSource::File(path.clone()),
            None => ZipSource::Inline(self.zips.clone()),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build-market-stats")]
#[command(about = "Build current-month marketStatMonthly NDJSON from Realtor.com ZIP CSVs")]
pub struct MarketStatsArgs {
    /// Path to RDC_Inventory_Core_Metrics_Zip.csv
    #[arg(long)]
    pub core_current: String,

    /// Path to RDC_Inventory_Hotness_Metrics_Zip_History.csv
    #[arg(long)]
    pub hotness_history: String,

    #[command(flatten)]
    pub zips: ZipArgs,

    /// Output NDJSON path
    #[arg(long)]
    pub out: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Validate for MarketStatsArgs {
    fn validate(&self) -> Result<()> {
        validate_input_file("Core metrics CSV", &self.core_current)?;
        validate_input_file("Hotness history CSV", &self.hotness_history)?;
        validate_path("out", &self.out)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build-neighborhood-centers")]
#[command(about = "Geocode neighborhood centers and emit patch NDJSON")]
pub struct NeighborhoodCentersArgs {
    /// Mapbox public token
    #[arg(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,

    /// Neighborhoods NDJSON (with name/municipality/slug)
    #[arg(long)]
    pub input: String,

    /// Output NDJSON patch file
    #[arg(long)]
    pub out: String,

    /// Do not write the file, only print results
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Validate for NeighborhoodCentersArgs {
    fn validate(&self) -> Result<()> {
        validate_required_field("MAPBOX_TOKEN", &self.mapbox_token)?;
        validate_input_file("Neighborhoods NDJSON", &self.input)?;
        validate_path("out", &self.out)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build-zip-centroids")]
#[command(about = "Build a ZIP centroid map using Mapbox geocoding")]
pub struct ZipCentroidsArgs {
    #[command(flatten)]
    pub zips: ZipArgs,

    /// Mapbox public token
    #[arg(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output JSON file
    #[arg(long)]
    pub out: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Validate for ZipCentroidsArgs {
    fn validate(&self) -> Result<()> {
        validate_required_field("MAPBOX_TOKEN", &self.token)?;
        validate_path("out", &self.out)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build-copy-patches")]
#[command(about = "Build neighborhood copy patch NDJSON from the copy CSV")]
pub struct CopyPatchesArgs {
    /// Neighborhood copy CSV
    #[arg(long, env = "NEIGHBORHOOD_COPY_CSV")]
    pub csv: Option<String>,

    /// Output NDJSON path
    #[arg(long, env = "NEIGHBORHOOD_COPY_NDJSON")]
    pub out: Option<String>,

    /// Sanity API token with read access
    #[arg(long, env = "SANITY_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Validate for CopyPatchesArgs {
    fn validate(&self) -> Result<()> {
        let csv = validate_required_field("NEIGHBORHOOD_COPY_CSV", &self.csv)?;
        validate_input_file("CSV", csv)?;
        let out = validate_required_field("NEIGHBORHOOD_COPY_NDJSON", &self.out)?;
        validate_path("NEIGHBORHOOD_COPY_NDJSON", out)?;
        let token = validate_required_field("SANITY_AUTH_TOKEN", &self.token)?;
        validate_non_empty_string("SANITY_AUTH_TOKEN", token)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "check-copy")]
#[command(about = "Compare the neighborhood copy CSV against what Sanity holds")]
pub struct CheckCopyArgs {
    /// Neighborhood copy CSV
    #[arg(long, env = "NEIGHBORHOOD_COPY_CSV")]
    pub csv: Option<String>,

    /// Sanity API token with read access
    #[arg(long, env = "SANITY_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Slugs per query
    #[arg(long, default_value = "50")]
    pub batch_size: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Validate for CheckCopyArgs {
    fn validate(&self) -> Result<()> {
        let token = validate_required_field("SANITY_AUTH_TOKEN", &self.token)?;
        validate_non_empty_string("SANITY_AUTH_TOKEN", token)?;
        let csv = validate_required_field("NEIGHBORHOOD_COPY_CSV", &self.csv)?;
        validate_input_file("CSV", csv)?;
        validate_positive_number("batch_size", self.batch_size, 1)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "revalidate-paths")]
#[command(about = "Ask the site to revalidate cached paths")]
#[command(after_help = "Example: revalidate-paths http://localhost:3000 secret /neighborhoods")]
pub struct RevalidateArgs {
    /// Site base URL, e.g. http://localhost:3000
    pub base_url: String,

    /// Shared revalidation secret
    pub secret: String,

    /// Paths to revalidate
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Validate for RevalidateArgs {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("secret", &self.secret)
    }
}
