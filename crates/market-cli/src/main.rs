use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use market_execution::InvocationEvent;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

mod commands;

#[derive(Parser)]
#[command(name = "market-suite")]
#[command(about = "Market Suite - AI marketing tools from the command line", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Base directory for config and data (defaults to the platform locations)
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tool catalog
    Tools {
        /// Only tools of this category (visual, strategy, content, utilities)
        #[arg(long)]
        category: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a tool and its form fields
    Show {
        /// Tool key
        key: String,
    },
    /// Open a tool, fill its form and submit it
    Run(RunArgs),
    /// Render a Markdown file the way text results are shown
    Render {
        file: PathBuf,
        /// Print HTML
        #[arg(long, conflicts_with = "plain")]
        html: bool,
        /// Print plain text, as copied to the clipboard
        #[arg(long)]
        plain: bool,
    },
    /// Create config.toml and the secret.json template
    Init,
}

#[derive(Args)]
pub struct RunArgs {
    /// Tool key
    pub key: String,
    /// Text field value (name=value), repeatable
    #[arg(short = 'f', long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,
    /// Image from the file picker (name=path), repeatable
    #[arg(long = "file", value_name = "NAME=PATH")]
    pub files: Vec<String>,
    /// Image dropped onto the form (name=path); non-images are ignored
    #[arg(long = "drop", value_name = "NAME=PATH")]
    pub drops: Vec<String>,
    /// Copy a text result to the clipboard
    #[arg(long)]
    pub copy: bool,
    /// Print a text result as HTML
    #[arg(long)]
    pub html: bool,
    /// Directory for downloaded media
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Poll long-running operations until they finish
    #[arg(long)]
    pub unbounded_polling: bool,
}

type EventChannel = (
    Option<UnboundedSender<InvocationEvent>>,
    Option<UnboundedReceiver<InvocationEvent>>,
);

/// Status lines stand in for the log only on quiet runs; otherwise no
/// events are collected.
fn event_channel(command: &Commands, verbose: u8) -> EventChannel {
    match (command, verbose) {
        (Commands::Run(_), 0) => {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            (Some(tx), Some(rx))
        }
        _ => (None, None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (event_tx, event_rx) = event_channel(&cli.command, cli.verbose);
    market_execution::init_logging(cli.verbose, event_tx)?;

    let home = cli.home.as_deref();
    match cli.command {
        Commands::Tools { category, json } => {
            commands::tools::list(home, category.as_deref(), json)?
        }
        Commands::Show { key } => commands::tools::show(home, &key)?,
        Commands::Run(args) => commands::run::run(home, args, event_rx).await?,
        Commands::Render { file, html, plain } => commands::render::run(&file, html, plain)?,
        Commands::Init => commands::init::run(home)?,
    }

    Ok(())
}
