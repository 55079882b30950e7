pub mod render;
pub mod report;
pub mod shell;

use std::{io::IsTerminal, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use report::print_report;
use shell::Shell;
use tokio::io::{self, BufReader};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    session::Session,
    storage::week_storage::{JsonWeekStorage, DEFAULT_FILE_NAME},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "attendance-tracker", version, long_about = None)]
#[command(about = "Record weekly working times and calculate worked hours", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(long, default_value = DEFAULT_FILE_NAME, help = "File where weeks are stored")]
    file: PathBuf,
    #[arg(long, help = "Show logs in the console")]
    log: bool,
    #[arg(long = "log-filter", help = "Level of logs written into the log file")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start an interactive session. This is the default")]
    Shell,
    #[command(about = "Print total hours of every stored week")]
    Report,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = match (args.log_filter, args.log) {
        (Some(level), _) => Some(level),
        (None, true) => Some(LevelFilter::TRACE),
        (None, false) => None,
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?,
        logging_level,
        args.log,
    )?;

    let storage = JsonWeekStorage::new(args.file);
    info!("Using data file {:?}", storage.path());

    match args.commands.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let session = Session::start(storage).await;
            let color = std::io::stdout().is_terminal();
            let mut shell = Shell::new(session, color);
            shell
                .run(BufReader::new(io::stdin()), io::stdout())
                .await
        }
        Commands::Report => {
            let session = Session::start(storage).await;
            print_report(&session, io::stdout()).await
        }
    }
}
