use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xzscan::batch::scan_files;
use xzscan::{inspect_file, trace, ScanEvent, ScanOptions, Stream};

#[derive(Parser)]
#[command(name = "xzscan", version, about = "Report XZ stream sizes without decompressing")]
struct Cli {
    /// Log every parsed structure
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Treat index and footer inconsistencies as errors
    #[arg(global = true, long)]
    strict: bool,

    /// Fail when the stream footer magic is not "YZ"
    #[arg(global = true, long)]
    require_footer_magic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print compressed and uncompressed totals of one or more .xz files
    Size {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the stream structure of an .xz file
    List {
        input: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SizeRow {
    path:         String,
    compressed:   Option<u64>,
    uncompressed: Option<u64>,
    error:        Option<String>,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = ScanOptions {
        strict:               cli.strict,
        require_footer_magic: cli.require_footer_magic,
    };

    match cli.command {

        // ── Size ─────────────────────────────────────────────────────────────
        Commands::Size { files, json } => {
            let results = scan_files(&files, &options);
            let failed = results.iter().any(|r| r.result.is_err());

            if json {
                let rows: Vec<SizeRow> = results
                    .iter()
                    .map(|r| SizeRow {
                        path:         r.path.display().to_string(),
                        compressed:   r.result.as_ref().ok().map(|t| t.0),
                        uncompressed: r.result.as_ref().ok().map(|t| t.1),
                        error:        r.result.as_ref().err().map(|e| e.to_string()),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:>14} {:>14} {:>7}  Name", "Compressed", "Uncompressed", "Ratio");
                for r in &results {
                    match &r.result {
                        Ok((compressed, uncompressed)) => println!(
                            "{:>14} {:>14} {:>7}  {}",
                            compressed,
                            uncompressed,
                            ratio(*compressed, *uncompressed),
                            r.path.display()
                        ),
                        Err(e) => tracing::error!("{}: {}", r.path.display(), e),
                    }
                }
            }

            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json } => {
            let mut log = |e: ScanEvent<'_>| trace::log_event(&e);
            let stream = inspect_file(&input, &options, Some(&mut log))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stream)?);
            } else {
                print_stream(&input, &stream);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed == 0 {
        return "-".into();
    }
    format!("{:.1}%", compressed as f64 / uncompressed as f64 * 100.0)
}

fn print_stream(path: &Path, stream: &Stream) {
    let h = &stream.header;
    println!("── XZ Stream ────────────────────────────────────────────");
    println!("  Path           {}", path.display());
    println!("  Stream flags   {} ({}, {} B check)", hex::encode(h.flags), h.check.name, h.check.size);
    println!("  Blocks         {}", stream.blocks.len());
    println!("  Compressed     {} B", stream.compressed_size);
    println!("  Uncompressed   {} B", stream.uncompressed_size);
    println!("  Ratio          {}", ratio(stream.compressed_size, stream.uncompressed_size));
    println!("  Stream size    {} B", stream.stream_size);

    println!();
    println!("{:>6} {:>12} {:>7} {:>14} {:>14}  Filters",
             "Block", "Offset", "Header", "Compressed", "Uncompressed");
    for b in &stream.blocks {
        let filters: Vec<String> = b.header.filters
            .iter()
            .map(|f| format!("{:#x}[{}]", f.id, hex::encode(&f.properties)))
            .collect();
        let uncompressed = b.uncompressed_size
            .map(|u| u.to_string())
            .unwrap_or_else(|| "?".into());
        println!("{:>6} {:>12} {:>7} {:>14} {:>14}  {}",
                 b.number, b.offset, b.header.size, b.compressed_size, uncompressed,
                 filters.join(" "));
    }

    println!();
    println!("  Index          {} record(s), {} B, crc32 {}",
             stream.index.records.len(), stream.index.size,
             hex::encode(stream.index.crc32.to_le_bytes()));
    let f = &stream.footer;
    println!("  Footer         backward size {}, flags {}, magic {}",
             f.backward_size, hex::encode(f.flags), hex::encode(f.magic));

    for w in &stream.warnings {
        println!("  Warning        {}", w);
    }
}
