//! Lorebinder - Entry Point
//!
//! One-shot converter: loads the raw ruleset JSON from a data directory,
//! resolves entity inheritance for the creature domain, composes the base
//! and fluff halves, and writes the flattened output JSON.

use lorebinder::compose::compose_all;
use lorebinder::core::config::ConvertConfig;
use lorebinder::core::error::Result;
use lorebinder::graph::loader::{load_base_graph, load_fluff_graph, Databank};
use lorebinder::modify::ModContext;
use lorebinder::render::flatten::PlainFlattener;
use lorebinder::resolve::{resolve_graph, ResolveOptions};

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lorebinder", about = "Flatten tabletop ruleset JSON")]
struct Args {
    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of raw ruleset JSON files (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory to write flattened output into (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("lorebinder=info")
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConvertConfig::load_file(path)?,
        None => ConvertConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    tracing::info!("Loading source data from {}", config.data_dir.display());
    let databank = Databank::load_dir(&config.data_dir)?;
    tracing::info!("Merged {} record tables", databank.table_count());

    let flattener = PlainFlattener;
    let ctx = ModContext {
        flattener: &flattener,
        image_base: &config.image_base_url,
    };

    let mut base = load_base_graph(databank.records("monster"), &ctx)?;
    let mut fluff = load_fluff_graph(databank.records("monsterFluff"), &ctx)?;
    tracing::info!(
        "Loaded {} creatures ({} with fluff records)",
        base.len(),
        fluff.len()
    );

    let options = ResolveOptions {
        empty_stats_inherit: config.empty_stats_inherit,
    };

    // The two graphs resolve independently; keys may coincide but parent
    // chains never cross between them.
    let base_report = resolve_graph(&mut base, &options);
    let fluff_report = resolve_graph(&mut fluff, &options);
    for report in [&base_report, &fluff_report] {
        if !report.is_clean() {
            tracing::warn!(
                "Resolution diagnostics: {} missing parents, {} cycles",
                report.missing_parents(),
                report.cycles()
            );
        }
    }

    let composed = compose_all(base, fluff);
    tracing::info!("Composed {} entities", composed.len());

    std::fs::create_dir_all(&config.output_dir)?;
    let out_path = config.output_dir.join("bestiary.json");
    let json = serde_json::to_string_pretty(&composed)?;
    std::fs::write(&out_path, json)?;
    tracing::info!("Wrote {}", out_path.display());

    Ok(())
}
