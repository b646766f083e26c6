use clap::Parser;

use linkhub::cli::{Cli, Commands};
use linkhub::config::{get_config, init_config_from};
use linkhub::runtime::modes::{run_cli, run_server};
use linkhub::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = get_config();
            let _guard = init_logging(&config.logging)?;
            run_server().await
        }
        cmd => {
            if let Err(e) = run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
