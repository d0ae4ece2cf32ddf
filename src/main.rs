use clap::Parser;
use miette::Result;
use rastershade::cli::{Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Shade(args) => rastershade::cli::shade::run(args)?,
        Commands::Stack(args) => rastershade::cli::stack::run(args)?,
        Commands::Inspect(args) => rastershade::cli::inspect::run(args)?,
        Commands::Completions(args) => rastershade::cli::completions::run(args)?,
    }

    Ok(())
}
