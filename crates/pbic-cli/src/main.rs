//! pbic CLI - ZIP-in, PBIT-out front-end for the pbi-tools compiler.

mod compile;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pbic")]
#[command(about = "Compile Power BI project archives with pbi-tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP compile service
    Serve {
        /// Host address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on (defaults to the PORT environment variable,
        /// then 8080)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the demo project for /compile/demo
        #[arg(long, default_value = "compile-tests/pbit")]
        demo_dir: PathBuf,
    },

    /// Compile a project ZIP from disk and write the result bundle
    Compile {
        /// Path to the project ZIP
        archive: PathBuf,

        /// Output path for the result ZIP (defaults to `<name>.zip`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output name recorded in the bundle
        #[arg(long)]
        name: Option<String>,

        /// Per-compile timeout in seconds (overrides WORK_TIMEOUT_SECONDS)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            demo_dir,
        } => serve::execute(host, port, demo_dir).await?,

        Commands::Compile {
            archive,
            output,
            name,
            timeout,
        } => compile::execute(&archive, output.as_deref(), name.as_deref(), timeout).await?,
    }

    Ok(())
}
