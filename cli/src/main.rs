//! pdfoutline CLI - batch PDF outline extraction

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::{process, ExtractOptions};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Extract PDF outlines (title + headings) to JSON", long_about = None)]
struct Cli {
    /// Input directory of PDF files
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output directory for JSON files
    #[arg(value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Heading extraction deadline in seconds
    #[arg(long, default_value = "20")]
    timeout: u64,

    /// Minimum heading text length in characters
    #[arg(long, default_value = "3")]
    min_text_len: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory into JSON outlines
    Batch {
        /// Input directory
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory (created if absent)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Extract the outline of a single PDF
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let options = ExtractOptions::new()
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_min_text_len(cli.min_text_len);

    let result = match cli.command {
        Some(Commands::Batch { input, output }) => cmd_batch(&input, output.as_deref(), &options),
        Some(Commands::Outline { input, output }) => {
            cmd_outline(&input, output.as_deref(), &options)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: batch mode when a directory is provided
            if let Some(input) = cli.input {
                cmd_batch(&input, cli.output.as_deref(), &options)
            } else {
                println!("{}", "Usage: pdfoutline <INPUT_DIR> [OUTPUT_DIR]".yellow());
                println!("       pdfoutline --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("output_jsons"));

    let files = process::collect_pdf_files(input)?;
    if files.is_empty() {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut processed = 0usize;
    let mut failed = 0usize;

    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name.clone());

        let out = process::output_path_for(file, &output_dir);
        match process::process_file(file, &out, options) {
            Ok(()) => processed += 1,
            Err(e) => {
                failed += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), name, e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} processed, {} failed",
        "Summary:".green().bold(),
        processed,
        failed
    );
    println!("{} {}", "Output directory:".green(), output_dir.display());

    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = pdfoutline::extract_file(input, options)?;
    let json = result.to_json()?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "pdfoutline".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PDF outline extraction tool");
}
