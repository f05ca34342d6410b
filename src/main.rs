//! Command-line entry point: `tmx2lvl <map> <level>`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tmx2lvl::{convert, DefaultLoader, Schema};

#[derive(Parser)]
#[command(name = "tmx2lvl")]
#[command(about = "Convert a Tiled map into a binary level asset", long_about = None)]
#[command(version)]
struct Cli {
    /// Map to convert (.tmx, .tmj or .json)
    input: PathBuf,

    /// Level asset to write; replaced if it exists
    output: PathBuf,

    /// JSON file overriding the required tileset, layer and object group names
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage problems go to stdout like every other diagnostic.
            print!("{}", err.render());
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v`/`-q` pick the level around a `warn` default.
fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_level(match (cli.verbose, cli.quiet) {
                (0, true) => log::LevelFilter::Error,
                (0, false) => log::LevelFilter::Warn,
                (1, _) => log::LevelFilter::Info,
                (2, _) => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            });
        }
    }
    builder.init();
}

fn run(cli: &Cli) -> Result<()> {
    let schema = match &cli.schema {
        Some(path) => {
            log::info!("loading schema {}", path.display());
            Schema::from_json_file(path)
                .with_context(|| format!("cannot load schema {}", path.display()))?
        }
        None => Schema::default(),
    };

    if !cli.quiet {
        println!("Parsing the map file \"{}\"...", cli.input.display());
    }
    let done = convert(&DefaultLoader, &cli.input, &cli.output, &schema)
        .with_context(|| format!("cannot convert {}", cli.input.display()))?;

    if !cli.quiet {
        println!(
            "The level file \"{}\" has been successfully generated ({} bytes, {} objects)",
            cli.output.display(),
            done.bytes,
            done.objects
        );
    }
    Ok(())
}
