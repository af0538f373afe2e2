pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sos-feed")]
#[command(about = "Community emergency-reporting feed client", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: ~/.config/sos-feed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the feed and print it
    Feed {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Only show posts matching this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Compose and submit a new post
    Post(PostArgs),
    /// Resolve a postal code (CEP) to an address
    Cep {
        /// Postal code, with or without separator
        code: String,
    },
    /// List the incident categories
    Categories,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PostArgs {
    /// Author display name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Description of the situation (at least 10 characters)
    #[arg(long, default_value = "")]
    pub content: String,

    /// Category tag: flood, fire, landslide, help, rescue, structural, traffic, power, storm
    #[arg(long, default_value = "")]
    pub category: String,

    /// Contact phone; digits are masked automatically
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Postal code; a complete code fills the address automatically
    #[arg(long, default_value = "")]
    pub cep: String,

    /// Street address
    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub number: String,

    #[arg(long)]
    pub neighborhood: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    /// Image to attach
    #[arg(long)]
    pub image: Option<std::path::PathBuf>,

    /// Fill the address from the configured device position
    #[arg(long)]
    pub locate: bool,
}
