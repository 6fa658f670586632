use clap::Parser;
use cms_etl::config::cli::ZipCentroidsArgs;
use cms_etl::core::zip_centroids::ZipCentroidsPipeline;
use cms_etl::utils::{logger, validation::Validate};
use cms_etl::{EtlEngine, EtlError, LocalStorage, MapboxClient, Result, ToolConfig};

const TOOL: &str = "build-zip-centroids";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = ZipCentroidsArgs::parse();

    logger::init_cli_logger(args.common.verbose, args.common.log_json);

    if let Err(e) = run(args).await {
        logger::report_failure(TOOL, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: ZipCentroidsArgs) -> Result<()> {
    args.validate()?;
    let config = ToolConfig::load(args.common.config.as_deref())?;

    let token = args.token.ok_or_else(|| EtlError::missing("MAPBOX_TOKEN"))?;
    let geocoder = MapboxClient::new(&config.mapbox, token)?;
    let pipeline = ZipCentroidsPipeline::new(
        LocalStorage::default(),
        geocoder,
        &config.mapbox,
        args.zips.source(),
        args.out,
    );
    let report = EtlEngine::new(pipeline).with_name(TOOL).run().await?;

    println!("{}", report.summary());
    Ok(())
}
