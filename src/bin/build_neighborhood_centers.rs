use clap::Parser;
use cms_etl::config::cli::NeighborhoodCentersArgs;
use cms_etl::core::neighborhood_centers::NeighborhoodCentersPipeline;
use cms_etl::utils::{logger, validation::Validate};
use cms_etl::{EtlEngine, EtlError, LocalStorage, MapboxClient, Result, ToolConfig};

const TOOL: &str = "build-neighborhood-centers";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = NeighborhoodCentersArgs::parse();

    logger::init_cli_logger(args.common.verbose, args.common.log_json);

    if let Err(e) = run(args).await {
        logger::report_failure(TOOL, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: NeighborhoodCentersArgs) -> Result<()> {
    args.validate()?;
    let config = ToolConfig::load(args.common.config.as_deref())?;

    let token = args.mapbox_token.ok_or_else(|| EtlError::missing("MAPBOX_TOKEN"))?;
    let geocoder = MapboxClient::new(&config.mapbox, token)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no file will be written");
    }

    let pipeline = NeighborhoodCentersPipeline::new(
        LocalStorage::default(),
        geocoder,
        config.mapbox,
        args.input,
        args.out,
    )
    .with_dry_run(args.dry_run);
    let report = EtlEngine::new(pipeline).with_name(TOOL).run().await?;

    if report.output_path.is_some() {
        println!("{}", report.summary());
    }
    if !report.failed.is_empty() {
        eprintln!("Geocoding failed for: {:?}", report.failed);
    }
    Ok(())
}
