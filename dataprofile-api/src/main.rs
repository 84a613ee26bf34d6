use dataprofile_api::api::start_server;
use dataprofile_core::{load_config, logger::init_logging};
use std::path::PathBuf;
use tracing::info;

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    // An optional config file path may be passed as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    init_logging(&config.logging);

    info!("Reports are written to {:?}", config.report.output_dir());
    start_server(&config).await?;
    Ok(())
}
