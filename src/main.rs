use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Command to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fenced code block at (or nearest) the cursor and print the result as JSON
    #[command(name = "run-block")]
    RunBlock {
        /// Markdown or text file containing fenced code blocks
        #[arg(long)]
        file: PathBuf,

        /// Byte offset of the cursor in the file
        #[arg(long, default_value_t = 0)]
        cursor: usize,

        /// Configuration file path (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the per-block deadline, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// List the fenced code blocks found in a file as JSON
    Blocks {
        /// File to scan
        #[arg(long)]
        file: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::RunBlock {
            file,
            cursor,
            config,
            timeout_ms,
        } => commands::run_block::handle_run_block(&file, cursor, config.as_deref(), timeout_ms),
        Commands::Blocks { file } => commands::blocks::handle_blocks(&file),
        Commands::Version => commands::version::handle_version(),
    }
}
