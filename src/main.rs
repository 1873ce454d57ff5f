use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};
use tsnorm::batch::SingleError;
use tsnorm::prompt::{LinePrompter, Prompter};
use tsnorm::report::LogReporter;
use tsnorm::{BatchSummary, Config, Pipeline, SelectMode, SingleReport};

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize CSV timestamp columns to ISO-8601 UTC", long_about = None)]
struct Args {
    /// JSON file overriding keywords, output column and naming
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process one file, choosing the timestamp column interactively
    Single {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long)]
        output_dir: PathBuf,

        /// Use this column instead of asking
        #[arg(long, conflicts_with = "auto")]
        column: Option<String>,

        /// Pick the column by keyword instead of asking
        #[arg(long)]
        auto: bool,

        #[arg(long)]
        benchmark: bool,
    },
    /// Process every matching file under a folder, recursively, without asking
    Bulk {
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        #[arg(short, long)]
        output_dir: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json_summary: bool,

        #[arg(long)]
        benchmark: bool,
    },
    /// Menu-driven session
    Menu,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(args.config.as_deref())?;
    let reporter = LogReporter;
    let pipeline = Pipeline::new(&config, &reporter).context("invalid priority keyword")?;

    match args.command {
        Command::Single {
            file,
            output_dir,
            column,
            auto,
            benchmark,
        } => {
            let mode = match (column, auto) {
                (Some(name), _) => SelectMode::Column(name),
                (None, true) => SelectMode::Auto,
                (None, false) => SelectMode::Interactive,
            };
            let start = Instant::now();
            let mut prompter = LinePrompter::stdio();
            let report = pipeline.process_single(&file, &output_dir, &mut prompter, &mode)?;
            print_single_summary(&report);
            if benchmark {
                print_benchmark_results(report.rows_read, report.rows_written, start.elapsed());
            }
        }
        Command::Bulk {
            input_dir,
            output_dir,
            json_summary,
            benchmark,
        } => {
            let start = Instant::now();
            let summary = pipeline.process_bulk(&input_dir, &output_dir);
            if json_summary {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_bulk_summary(&summary);
            }
            if benchmark {
                print_benchmark_results(summary.rows_read, summary.rows_written, start.elapsed());
            }
        }
        Command::Menu => run_menu(&pipeline)?,
    }

    Ok(())
}

fn run_menu(pipeline: &Pipeline<'_>) -> Result<()> {
    let mut prompter = LinePrompter::stdio();
    loop {
        prompter.say("\n=== CSV Timestamp Processor ===")?;
        prompter.say("1. Process single CSV file (interactive)")?;
        prompter.say("2. Bulk process CSV files (automatic)")?;
        prompter.say("0. Exit")?;

        let Some(choice) = prompter.ask("Enter choice: ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => {
                let Some(file) = ask_path(&mut prompter, "Input CSV file: ")? else {
                    prompter.say("No file selected.")?;
                    continue;
                };
                let result = pipeline.process_single_with(
                    &file,
                    &mut prompter,
                    &SelectMode::Interactive,
                    |p| Ok(non_empty_path(p.ask("Output folder: ")?)),
                );
                match result {
                    Ok(report) => print_single_summary(&report),
                    Err(SingleError::NoOutputDir) => prompter.say("No output folder selected.")?,
                    Err(SingleError::Prompt(err)) => return Err(err.into()),
                    // already reported as a dataset failure
                    Err(SingleError::Dataset(err)) => error!(%err, "file not processed"),
                }
            }
            "2" => {
                let Some(input) = ask_path(&mut prompter, "Input folder: ")? else {
                    prompter.say("No input folder selected.")?;
                    continue;
                };
                let Some(out) = ask_path(&mut prompter, "Output folder: ")? else {
                    prompter.say("No output folder selected.")?;
                    continue;
                };
                print_bulk_summary(&pipeline.process_bulk(&input, &out));
            }
            "0" => {
                prompter.say("Goodbye!")?;
                return Ok(());
            }
            _ => prompter.say("Invalid choice. Please try again.")?,
        }
    }
}

fn ask_path(prompter: &mut dyn Prompter, question: &str) -> Result<Option<PathBuf>> {
    Ok(non_empty_path(prompter.ask(question)?))
}

fn non_empty_path(answer: Option<String>) -> Option<PathBuf> {
    let answer = answer?;
    let answer = answer.trim();
    (!answer.is_empty()).then(|| PathBuf::from(answer))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_single_summary(report: &SingleReport) {
    println!("\n{}", "=".repeat(50));
    println!("Processing Summary:");
    println!("• Input file: {}", file_name(&report.input));
    println!("• Timestamp column: {}", report.column);
    println!("• Lines read: {}", report.rows_read);
    println!("• Output file: {}", file_name(&report.output));
    println!("• Lines written: {}", report.rows_written);
    println!("{}\n", "=".repeat(50));
}

fn print_bulk_summary(summary: &BatchSummary) {
    if summary.files_found == 0 {
        println!("No CSV files found in the selected folder.");
        return;
    }
    println!("\n{}", "=".repeat(50));
    println!("Bulk Processing Summary:");
    println!("• Files found: {}", summary.files_found);
    println!("• Files successfully processed: {}", summary.succeeded);
    println!("• Files failed: {}", summary.failed);
    for failure in &summary.failures {
        println!("    - {}: {}", failure.path.display(), failure.error);
    }
    println!("• Total lines read: {}", summary.rows_read);
    println!("• Total lines written: {}", summary.rows_written);
    println!("{}\n", "=".repeat(50));
}

fn print_benchmark_results(rows_read: usize, rows_written: usize, duration: Duration) {
    let duration_secs = duration.as_secs_f64();
    let throughput_rows = rows_read as f64 / duration_secs;

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("Rows read: {}", rows_read);
    eprintln!("Rows written: {}", rows_written);
    eprintln!("Processing time: {:.3}s", duration_secs);
    eprintln!("Throughput: {:.0} rows/s", throughput_rows);
}
