use anyhow::Result;
use clap::Parser;
use dataprofile_cli::cli::{self, Cli, Commands, ProfileArgs};
use dataprofile_core::{load_config, logger::init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Profile {
            file,
            output_dir,
            title,
            minimal,
            json,
        } => {
            let args = ProfileArgs {
                file,
                output_dir,
                title,
                minimal,
                json,
            };
            cli::profile_command(&config, args).await
        }
        Commands::Preview { file, rows } => cli::preview_command(file, rows).await,
    }
}
