//! Street clipping CLI.
//!
//! Reads `<city>_streets.geojson`, fetches the boundary relation from
//! Overpass and writes the clipped streets, the flattened boundary and the
//! matching rows of `list.csv`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streetclip::config::ClipConfig;
use streetclip::{run, OverpassResolver};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "streetclip")]
#[command(about = "Pass a city name to get the step 1 data and an OSM relation ID to clip it!")]
struct Args {
    /// City in your data folder
    #[arg(short, long)]
    city: String,

    /// OSM relation ID for that city
    #[arg(short, long)]
    relation: u64,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with one sub-directory per city
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Directory for outputs (defaults to the data root)
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Overpass interpreter URL
    #[arg(long)]
    overpass_url: Option<String>,

    /// Timeout for the boundary request, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Do not read list.csv or write list_filtered.csv
    #[arg(long)]
    skip_join: bool,
}

impl Args {
    /// File values first, then command line overrides
    fn resolve_config(&self) -> Result<ClipConfig> {
        let mut config = match &self.config {
            Some(path) => ClipConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ClipConfig::default(),
        };

        if let Some(root) = &self.data_root {
            config.data_root = root.clone();
        }
        if let Some(root) = &self.output_root {
            config.output_root = Some(root.clone());
        }
        if let Some(url) = &self.overpass_url {
            config.overpass_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if self.skip_join {
            config.join = false;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn process_city(args: &Args) -> Result<()> {
    let config = args.resolve_config()?;

    info!("city       : {}", args.city);
    info!("relation id: {}", args.relation);

    let resolver = OverpassResolver::new(&config)?;
    let report = run(&config, &args.city, args.relation, &resolver)
        .await
        .with_context(|| format!("Clipping {} failed", args.city))?;

    info!(
        "{} of {} features inside {} boundary polygons",
        report.retained_features, report.input_features, report.boundary_polygons
    );
    if let Some(rows) = report.joined_rows {
        info!("{} street list rows kept", rows);
    }
    for path in &report.written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }

    let args = Args::parse();

    if let Err(error) = process_city(&args).await {
        println!("Something went wrong: {:#}", error);
        std::process::exit(1);
    }

    info!("Done!!");
}
