use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sos_feed::app::AppContext;
use sos_feed::cli::{commands, Cli, Commands};
use sos_feed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Commands::Categories = cli.command {
        commands::list_categories();
        return Ok(());
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Feed { pages, search } => {
            commands::show_feed(&ctx, pages, search.as_deref()).await?;
        }
        Commands::Post(args) => {
            commands::submit_post(&ctx, &args).await?;
        }
        Commands::Cep { code } => {
            commands::lookup_cep(&ctx, &code).await?;
        }
        Commands::Categories => {}
    }

    Ok(())
}
