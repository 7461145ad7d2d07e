//! # Folio CLI
//!
//! Usage:
//!   folio brief.json brief.pdf
//!   folio brief.json brief.pdf --font-dir ./fonts --config theme.json

use std::path::PathBuf;
use std::process;

use clap::Parser;

use folio::{render_to_path, FolioError, RenderConfig};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Render a donor intelligence brief to PDF", long_about = None)]
struct Cli {
    /// Content document (JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the PDF
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Directory holding the custom font files
    #[arg(long, value_name = "DIR", env = "FOLIO_FONT_DIR")]
    font_dir: Option<PathBuf>,

    /// Render config (JSON); built-in defaults when absent
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => {
            eprintln!(
                "\u{2713} Written {} bytes ({} pages) to {}",
                summary.bytes,
                summary.pages,
                cli.output.display()
            );
        }
        Err(e) => {
            eprintln!("\u{2717} {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<folio::RenderSummary, FolioError> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(dir) = &cli.font_dir {
        config.font_dir = dir.clone();
    }
    render_to_path(&cli.input, &cli.output, &config)
}
