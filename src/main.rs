//! csvparserorders CLI - Convert orders CSV data to JSON.
//!
//! ```bash
//! csvparserorders -t deliveries -i deliveries.csv      # file to stdout
//! cat returns.csv | csvparserorders -t returninfo     # stdin to stdout
//! csvparserorders -t lineitemstate -i in.csv -o out.json
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use csv_parser_orders::{
    parse_file, parse_stream, ConsoleLogger, LogLevel, ParserConfig, PipelineResult, RecordKind,
    DEFAULT_BATCH_SIZE,
};

#[derive(Parser)]
#[command(name = "csvparserorders")]
#[command(version)]
#[command(about = "Convert orders CSV data to JSON", long_about = None)]
struct Cli {
    /// Predefined type of csv: lineitemstate, returninfo or deliveries
    #[arg(short = 't', long = "type")]
    record_type: RecordKind,

    /// Path to the input CSV file (default: stdin)
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Path to the output JSON file (default: stdout)
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Number of CSV rows to consolidate per batch
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// CSV delimiter (auto-detected for file input if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Fail on rows whose length does not match the header row
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    strict_mode: bool,

    /// Logging level: error, warn, info or verbose
    #[arg(short, long, default_value = "info")]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    let logger = ConsoleLogger::new(cli.log_level);

    let config = ParserConfig {
        batch_size: cli.batch_size,
        delimiter: cli.delimiter,
        strict_mode: cli.strict_mode,
    };

    // The fatal error has already been reported through the logger
    if run(&cli, &config, &logger).is_err() {
        process::exit(1);
    }
}

fn run(cli: &Cli, config: &ParserConfig, logger: &ConsoleLogger) -> PipelineResult<()> {
    let output: Box<dyn Write> = match &cli.output_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    match &cli.input_file {
        Some(path) => {
            parse_file(path, output, cli.record_type, config, logger)?;
        }
        None => {
            parse_stream(io::stdin().lock(), output, cli.record_type, config, logger)?;
        }
    }
    Ok(())
}
