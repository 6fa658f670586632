use clap::Parser;
use cms_etl::config::cli::CopyPatchesArgs;
use cms_etl::core::copy_patches::{report_lines, CopyPatchesPipeline};
use cms_etl::utils::{logger, validation::Validate};
use cms_etl::{EtlEngine, EtlError, LocalStorage, Result, SanityClient, ToolConfig};

const TOOL: &str = "build-copy-patches";

#[tokio::main]
async fn main() {
    // NEIGHBORHOOD_COPY_CSV / NEIGHBORHOOD_COPY_NDJSON / SANITY_AUTH_TOKEN may live in .env
    let _ = dotenvy::dotenv();
    let args = CopyPatchesArgs::parse();

    logger::init_cli_logger(args.common.verbose, args.common.log_json);

    if let Err(e) = run(args).await {
        logger::report_failure(TOOL, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CopyPatchesArgs) -> Result<()> {
    args.validate()?;
    let config = ToolConfig::load(args.common.config.as_deref())?;

    let csv = args.csv.ok_or_else(|| EtlError::missing("NEIGHBORHOOD_COPY_CSV"))?;
    let out = args.out.ok_or_else(|| EtlError::missing("NEIGHBORHOOD_COPY_NDJSON"))?;
    let token = args.token.ok_or_else(|| EtlError::missing("SANITY_AUTH_TOKEN"))?;

    let client = SanityClient::new(&config.sanity, token)?;
    let pipeline = CopyPatchesPipeline::new(
        LocalStorage::default(),
        client,
        config.sanity.document_type.clone(),
        csv,
        out,
    );
    let report = EtlEngine::new(pipeline).with_name(TOOL).run().await?;

    for line in report_lines(&report) {
        println!("{}", line);
    }
    Ok(())
}
