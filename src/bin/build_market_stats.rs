use clap::Parser;
use cms_etl::config::cli::MarketStatsArgs;
use cms_etl::core::market_stats::MarketStatsPipeline;
use cms_etl::utils::{logger, validation::Validate};
use cms_etl::{EtlEngine, LocalStorage, Result};

const TOOL: &str = "build-market-stats";

#[tokio::main]
async fn main() {
    let args = MarketStatsArgs::parse();

    logger::init_cli_logger(args.common.verbose, args.common.log_json);
    tracing::debug!("CLI args: {:?}", args);

    if let Err(e) = run(args).await {
        logger::report_failure(TOOL, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: MarketStatsArgs) -> Result<()> {
    args.validate()?;

    let storage = LocalStorage::default();
    let zips = args.zips.source().resolve(&storage).await?;

    let pipeline = MarketStatsPipeline::new(
        storage,
        args.core_current,
        args.hotness_history,
        zips,
        args.out,
    );
    let report = EtlEngine::new(pipeline).with_name(TOOL).run().await?;

    println!("{}", report.summary());
    if !report.skipped.is_empty() {
        eprintln!("Skipped undecodable rows: {:?}", report.skipped);
    }
    Ok(())
}
