use clap::Parser;
use cms_etl::config::cli::RevalidateArgs;
use cms_etl::utils::{logger, validation::Validate};
use cms_etl::{Result, RevalidateClient};

const TOOL: &str = "revalidate-paths";

#[tokio::main]
async fn main() {
    let args = RevalidateArgs::parse();

    logger::init_cli_logger(args.common.verbose, args.common.log_json);

    if let Err(e) = run(args).await {
        logger::report_failure(TOOL, &e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: RevalidateArgs) -> Result<()> {
    args.validate()?;

    let client = RevalidateClient::new(&args.base_url)?;
    let body = client.trigger(&args.secret, &args.paths).await?;
    println!("{}", body);
    Ok(())
}
