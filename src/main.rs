// name-variants: print normalized names and their index variants
//
// Usage: name-variants [--config PATH] [NAME...]
// Without names, reads one name per line from stdin.
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use name_variants_lib::{NameProcessor, VariantConfig};

#[derive(Parser)]
#[command(name = "name-variants")]
#[command(about = "Print normalized place names and their index variants")]
struct Args {
    /// Variant configuration (JSON); defaults to the user config file if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Names to process; read one per line from stdin when empty
    names: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // explicit path, then the user config file if present, then the standard pipeline
    let config = match args.config {
        Some(path) => VariantConfig::load(&path)?,
        None => match VariantConfig::default_path() {
            Ok(path) if path.exists() => VariantConfig::load(&path)?,
            _ => {
                tracing::info!("No variant configuration found, using the standard pipeline");
                VariantConfig::new()
            }
        },
    };
    let processor = NameProcessor::from_config(&config).context("invalid variant configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.names.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            print_name(&mut out, &processor, &line)?;
        }
    } else {
        for name in &args.names {
            print_name(&mut out, &processor, name)?;
        }
    }

    Ok(())
}

fn print_name(out: &mut impl Write, processor: &NameProcessor, name: &str) -> Result<()> {
    let processed = processor.process(name);
    let variants: Vec<&str> = processed.variants.iter().map(String::as_str).collect();
    writeln!(out, "{}\t{}", processed.normalized, variants.join("|"))?;
    tracing::debug!("'{}' processed in {}us", name, processed.elapsed_us);
    Ok(())
}
