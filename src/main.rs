//! trimcss - Fast multi-level CSS minifier

use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trimcss::compat::CompatibilitySource;
use trimcss::util::{decode_text, extract_charset};
use trimcss::{Minifier, OptimizationLevel, Options};

#[derive(Parser)]
#[command(name = "trimcss")]
#[command(version, about = "Fast multi-level CSS minifier", long_about = None)]
#[command(after_help = "EXAMPLES:
    trimcss style.css -o style.min.css     Minify with level 1
    trimcss -O 2 style.css                 Merge rules too, print to stdout
    cat a.css | trimcss --compatibility ie9 Minify stdin for IE9")]
struct Cli {
    /// Input stylesheet (stdin when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Optimization level: 0, 1 or 2
    #[arg(short = 'O', long = "level", value_parser = clap::value_parser!(u8).range(0..=2))]
    level: Option<u8>,

    /// Compatibility preset with overrides, e.g. "ie8,+units.rem"
    #[arg(long, value_name = "STR")]
    compatibility: Option<String>,

    /// JSON options file
    #[arg(long, value_name = "FILE")]
    options: Option<String>,

    /// Print size and timing statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Log optimizer passes to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "trimcss=debug" } else { "trimcss=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn options(cli: &Cli) -> trimcss::Result<Options> {
    let mut options = match &cli.options {
        Some(path) => Options::from_path(path)?,
        None => Options::default(),
    };
    if let Some(level) = cli.level {
        options.level = OptimizationLevel::try_from(level).map_err(trimcss::Error::InvalidOption)?;
    }
    if let Some(compatibility) = &cli.compatibility {
        options.compatibility = CompatibilitySource::Preset(compatibility.clone());
    }
    Ok(options)
}

fn read_input(input: Option<&str>) -> std::io::Result<Vec<u8>> {
    match input {
        Some(path) if path != "-" => std::fs::read(path),
        _ => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let minifier = Minifier::new(options(cli).map_err(|e| e.to_string())?).map_err(|e| e.to_string())?;

    let bytes = read_input(cli.input.as_deref()).map_err(|e| e.to_string())?;
    let css = decode_text(&bytes, extract_charset(&bytes));
    let output = minifier.minify(&css);

    match &cli.output {
        Some(path) => std::fs::write(path, &output.css).map_err(|e| e.to_string())?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.css.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(|e| e.to_string())?;
        }
    }

    if cli.stats {
        let stats = output.stats;
        eprintln!("Original: {} bytes", stats.original_size);
        eprintln!("Minified: {} bytes", stats.minified_size);
        eprintln!("Efficiency: {:.2}%", stats.efficiency * 100.0);
        eprintln!("Time: {:.2?}", stats.time);
        eprintln!("Warnings: {}", output.warnings.len());
    }

    Ok(())
}
