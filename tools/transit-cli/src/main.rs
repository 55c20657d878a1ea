use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use transit_catalogue::{FileStorage, TransitIndex};

mod handler;
mod requests;
mod responses;

use handler::{answer_all, build_index};
use requests::RequestDocument;

#[derive(Parser, Debug)]
#[command(
    name = "transit-cli",
    author,
    version,
    about = "Build a bus routing index and answer queries against it",
    long_about = "Works in two phases.\n\n\
                  make-base reads stops, buses and road distances from a JSON document, \
                  builds the routing index and writes it to serialization_settings.file.\n\n\
                  process-requests loads that index without rebuilding it and answers \
                  the document's stat_requests as a JSON array."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Input JSON document (stdin if omitted)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output file for responses (stdout if omitted)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the index from base_requests and save it
    #[command(alias = "make_base")]
    MakeBase,

    /// Load a saved index and answer stat_requests
    #[command(alias = "process_requests")]
    ProcessRequests,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let document = read_document(args.input.as_deref())?;

    match args.command {
        Command::MakeBase => make_base(&document),
        Command::ProcessRequests => process_requests(&document, args.output.as_deref()),
    }
}

fn read_document(input: Option<&Path>) -> Result<RequestDocument> {
    let mut raw = String::new();
    match input {
        Some(path) => {
            log::info!("Input: {}", path.display());
            if !path.exists() {
                bail!("Input file does not exist: {}", path.display());
            }
            BufReader::new(File::open(path).context("Failed to open input file")?)
                .read_to_string(&mut raw)
                .context("Failed to read input file")?;
        }
        None => {
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
        }
    }

    serde_json::from_str(&raw).context("Failed to parse request document")
}

fn index_path(document: &RequestDocument) -> Result<&Path> {
    let path = document.serialization_settings.file.as_path();
    if path.as_os_str().is_empty() {
        bail!("serialization_settings.file is not set");
    }
    Ok(path)
}

fn make_base(document: &RequestDocument) -> Result<()> {
    let path = index_path(document)?;

    log::info!(
        "Building index from {} base requests...",
        document.base_requests.len()
    );
    let index = build_index(document).context("Failed to build index")?;

    index
        .save(&FileStorage, path)
        .with_context(|| format!("Failed to write index to {}", path.display()))?;
    log::info!("Index written to {}", path.display());

    Ok(())
}

fn process_requests(document: &RequestDocument, output: Option<&Path>) -> Result<()> {
    let path = index_path(document)?;

    let index = TransitIndex::load(&FileStorage, path)
        .with_context(|| format!("Failed to load index from {}", path.display()))?;
    log::info!(
        "Loaded index: {} stops, {} buses",
        index.store().stops().len(),
        index.store().buses().len()
    );

    let responses = answer_all(&index, &document.stat_requests);
    log::info!("Answered {} requests", responses.len());

    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            log::info!("Output: {}", path.display());
            Box::new(BufWriter::new(
                File::create(path).context("Failed to create output file")?,
            ))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    serde_json::to_writer_pretty(&mut writer, &responses).context("Failed to write responses")?;
    writeln!(writer).context("Failed to write responses")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
