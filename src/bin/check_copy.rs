use clap::Parser;
use cms_etl::config::cli::CheckCopyArgs;
use cms_etl::core::copy_check::CopyCheckPipeline;
use cms_etl::utils::{logger, validation::Validate};
use cms_etl::{EtlEngine, EtlError, LocalStorage, Result, SanityClient, ToolConfig};

const TOOL: &str = "check-copy";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = CheckCopyArgs::parse();

    logger::init_cli_logger(args.common.verbose, args.common.log_json);

    if let Err(e) = run(args).await {
        logger::report_failure(TOOL, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CheckCopyArgs) -> Result<()> {
    args.validate()?;
    let config = ToolConfig::load(args.common.config.as_deref())?;

    let csv = args.csv.ok_or_else(|| EtlError::missing("NEIGHBORHOOD_COPY_CSV"))?;
    let token = args.token.ok_or_else(|| EtlError::missing("SANITY_AUTH_TOKEN"))?;

    let client = SanityClient::new(&config.sanity, token)?;
    let pipeline = CopyCheckPipeline::new(
        LocalStorage::default(),
        client,
        config.sanity.document_type.clone(),
        csv,
    )
    .with_batch_size(args.batch_size);

    let report = EtlEngine::new(pipeline).with_name(TOOL).run().await?;
    if !report.is_clean() {
        tracing::warn!("Sanity is out of sync with the copy sheet");
    }
    Ok(())
}
