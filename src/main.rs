pub mod classify;
pub mod color;
pub mod config;
pub mod data;
pub mod detail;
pub mod encode;
pub mod label;
pub mod server;
pub mod session;
pub mod types;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the wage map API and static frontend
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Run the encoder once for an occupation and write the frame JSON
    Export {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// SOC occupation code, e.g. 15-1252
        #[arg(long)]
        soc: String,
        /// Industry collection: all or ed
        #[arg(long, default_value = "all")]
        collection: String,
        /// Wage level view: level1..level4 or average
        #[arg(long, default_value = "level1")]
        level: String,
        /// Personal annual salary for comparison coloring
        #[arg(long)]
        salary: Option<u32>,
        /// Color theme: dark or light
        #[arg(long, default_value = "dark")]
        theme: String,
        /// County FIPS to include a detail view for
        #[arg(long)]
        select: Option<String>,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ExportFrame<'a> {
    colors: &'a encode::ColorEncoding,
    labels: &'a BTreeMap<types::Fips, String>,
    scale: types::WageScale,
    meta: &'a types::DatasetMeta,
    detail: Option<&'a detail::DetailViewModel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { config } => {
            println!("Serving wage map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let store = data::load_store(&app_config)?;
            let counties = data::load_counties(&app_config.input.counties_geojson)?;

            server::start_server(app_config, store, counties).await?;
        }
        Commands::Export {
            config,
            soc,
            collection,
            level,
            salary,
            theme,
            select,
            output,
        } => {
            let app_config = config::AppConfig::load_from_file(config)?;

            let collection = types::Collection::parse(collection)
                .ok_or_else(|| anyhow!("Unknown collection: {}", collection))?;
            let level = types::WageLevel::parse(level)
                .ok_or_else(|| anyhow!("Unknown wage level: {}", level))?;
            let theme = types::Theme::parse(theme)
                .ok_or_else(|| anyhow!("Unknown theme: {}", theme))?;

            let store = data::load_store(&app_config)?;
            let dataset = store
                .dataset(collection, soc, level)
                .ok_or_else(|| anyhow!("No wage data for SOC {}", soc))?;

            let session = session::ViewSession::new();
            let ticket = session.begin_load();
            session.install(ticket, (*dataset).clone());
            session.set_level(level);
            session.set_personal_salary(*salary);
            session.set_theme(theme);
            if let Some(fips) = select {
                session.select(Some(fips.as_str()));
            }

            let frame = session
                .frame()
                .ok_or_else(|| anyhow!("Dataset failed to install"))?;

            let export = ExportFrame {
                colors: &frame.encoding.colors,
                labels: &frame.encoding.labels,
                scale: dataset.scale,
                meta: &dataset.meta,
                detail: frame.detail.as_ref(),
            };
            let json = serde_json::to_string_pretty(&export)?;

            match output {
                Some(path) => {
                    std::fs::write(path, json)
                        .with_context(|| format!("Failed to write frame to {:?}", path))?;
                    println!("Wrote frame to {:?}", path);
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
