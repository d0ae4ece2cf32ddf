pub mod completions;
pub mod inspect;
pub mod shade;
pub mod stack;

use clap::{Parser, Subcommand};

/// rastershade - Turn aggregated data grids into images
#[derive(Parser, Debug)]
#[command(name = "rastershade")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "debug")
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shade an aggregate (JSON) into a PNG
    Shade(shade::ShadeArgs),

    /// Composite PNG images into one
    Stack(stack::StackArgs),

    /// Report size, coverage and density of a PNG
    Inspect(inspect::InspectArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
