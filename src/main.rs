use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use bank_ledger::batch::{BatchError, BatchRunner};
use bank_ledger::interactive::Session;
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

#[derive(Debug, Parser)]
#[command(about = "Toy banking ledger driven by text commands")]
struct Args {
    #[arg(short, long, global = true, help = "Log every command to stderr")]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Run a counted batch of comma-separated commands
    Batch {
        #[arg(index = 1, help = "Path to the command file, stdin when omitted")]
        input_file: Option<PathBuf>,

        #[arg(long, help = "Write the final accounts to this path as CSV")]
        export: Option<PathBuf>,
    },
    /// Run the numbered menu on the terminal
    Interactive,
}

fn run_batch(input_file: Option<PathBuf>, export: Option<PathBuf>) -> Result<(), BatchError> {
    let mut runner = BatchRunner::new();
    let mut stdout = io::stdout().lock();
    match input_file {
        Some(path) => runner.run(File::open(path)?, &mut stdout)?,
        None => runner.run(io::stdin().lock(), &mut stdout)?,
    }
    info!("Batch finished with {} accounts", runner.ledger().len());

    if let Some(path) = export {
        runner.export_accounts(BufWriter::new(File::create(&path)?))?;
        info!("Exported accounts to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let result: Result<(), Box<dyn Error>> = match args.mode {
        Mode::Batch { input_file, export } => run_batch(input_file, export).map_err(Into::into),
        Mode::Interactive => Session::new(io::stdin().lock(), io::stdout().lock())
            .run()
            .map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
