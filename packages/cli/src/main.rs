#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line driver for the arbovirus alert map.
//!
//! Talks to the same upstreams as the interactive map and can run a whole
//! map session headlessly, writing the drawn overlays as `GeoJSON`.

mod geojson_surface;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use epi_map_alert_models::{Disease, EpiWeekRange};
use epi_map_geography_models::BoundingBox;
use epi_map_map::{LoadReport, MapLayer, MapSession};
use epi_map_region_models::{MunicipalityCode, Region};
use epi_map_source::{DataService, HttpUpstream, UpstreamConfig};

use crate::geojson_surface::GeoJsonSurface;

#[derive(Parser)]
#[command(name = "epi_map", about = "Arbovirus alert map toolkit")]
struct Cli {
    /// Upstream configuration file (TOML). Defaults to the built-in
    /// configuration; `EPI_MAP_*` environment variables override either.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every state
    States,
    /// Search states and municipalities by name
    Search {
        /// Name or prefix, accents optional (e.g. "sao paulo")
        query: String,
        /// Maximum number of results
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Print the alert series and summary of a municipality
    Series {
        /// 7-digit IBGE geocode (e.g. 3550308 for São Paulo)
        #[arg(long)]
        geocode: u32,
        /// dengue, chikungunya or zika
        #[arg(long, default_value = "dengue", value_parser = parse_disease)]
        disease: Disease,
        /// Number of trailing epidemiological weeks
        #[arg(long)]
        weeks: Option<u32>,
    },
    /// Run a map session and write the drawn overlays as GeoJSON
    Render {
        /// disease, sewage-collection or sewage-treatment
        #[arg(long, default_value = "disease")]
        layer: MapLayer,
        /// dengue, chikungunya or zika
        #[arg(long, default_value = "dengue", value_parser = parse_disease)]
        disease: Disease,
        /// Region filter (north, northeast, southeast, south, center-west, all)
        #[arg(long, default_value = "all", value_parser = parse_region)]
        region: Region,
        /// Viewport as "west,south,east,north". Defaults to the region's bounds.
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<BoundingBox>,
        /// Zoom level; municipalities are drawn from 6 up
        #[arg(long, default_value = "4")]
        zoom: f64,
        /// Number of trailing epidemiological weeks
        #[arg(long)]
        weeks: Option<u32>,
        /// Output file. Writes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    BoundingBox::parse(s)
        .ok_or_else(|| format!("invalid bbox {s:?}: expected west,south,east,north"))
}

fn parse_disease(s: &str) -> Result<Disease, String> {
    s.parse()
        .map_err(|_| format!("unknown disease {s:?}: expected dengue, chikungunya or zika"))
}

fn parse_region(s: &str) -> Result<Region, String> {
    s.parse().map_err(|_| {
        format!("unknown region {s:?}: expected north, northeast, southeast, south, center-west or all")
    })
}

fn trailing_window(weeks: u32) -> Result<EpiWeekRange, Box<dyn std::error::Error>> {
    Ok(EpiWeekRange::trailing(Utc::now().date_naive(), weeks)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => UpstreamConfig::from_file(path)?,
        None => UpstreamConfig::embedded(),
    }
    .with_env_overrides();
    let default_weeks = config.alert_window_weeks;
    let service = Arc::new(DataService::new(Arc::new(HttpUpstream::new(config)?)));

    match cli.command {
        Commands::States => {
            let states = service.states().await?;
            println!("{:<4} {:<4} NAME", "CODE", "UF");
            println!("{}", "-".repeat(40));
            for state in &*states {
                println!("{:<4} {:<4} {}", u32::from(state.uf), state.abbr, state.name);
            }
        }
        Commands::Search { query, limit } => {
            let index = service.search_index().await?;
            for m in index.search(&query, limit) {
                println!("{:<12} {:<8} {:<4} {}", m.kind, m.code, m.uf.abbr(), m.name);
            }
        }
        Commands::Series {
            geocode,
            disease,
            weeks,
        } => {
            let window = trailing_window(weeks.unwrap_or(default_weeks))?;
            let geocode = MunicipalityCode(geocode);
            let series = service.alert_series(disease, geocode, window).await?;

            println!("{disease} in {geocode}, weeks {window}");
            println!("{:<8} {:>8} {:>6} {:>10} LEVEL", "WEEK", "CASES", "RT", "INC/100K");
            for record in &*series {
                let rt = record.rt.map_or_else(|| "-".to_string(), |rt| format!("{rt:.2}"));
                let incidence = record
                    .incidence_100k
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
                println!(
                    "{:<8} {:>8} {:>6} {:>10} {}",
                    record.week,
                    record.cases,
                    rt,
                    incidence,
                    record.alert_level()
                );
            }

            match service.series_summary(disease, geocode, window).await? {
                Some(summary) => println!("\n{}", serde_json::to_string_pretty(&summary)?),
                None => println!("\nNo data for this period."),
            }
        }
        Commands::Render {
            layer,
            disease,
            region,
            bbox,
            zoom,
            weeks,
            output,
        } => {
            let window = trailing_window(weeks.unwrap_or(default_weeks))?;
            let mut session = MapSession::new(service, window, GeoJsonSurface::default());
            session.set_layer(layer);
            session.set_disease(disease).await;
            session.set_region(region);
            session.load().await?;

            let viewport = bbox.unwrap_or_else(|| region.bounds());
            let update = session.on_viewport_change(zoom, viewport);
            if !update.started.is_empty() {
                log::info!("Loading municipalities of {} states", update.started.len());
            }
            for report in session.run_until_idle().await {
                if let LoadReport::Failed(uf) = report {
                    log::warn!("Municipalities of {} were not drawn", uf.abbr());
                }
            }

            let collection = session.into_surface().to_feature_collection();
            let json = collection.to_string();
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!(
                        "Wrote {} features to {}",
                        collection.features.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_arguments_parse() {
        let cli = Cli::try_parse_from([
            "epi_map",
            "render",
            "--disease",
            "Zika",
            "--region",
            "center-west",
            "--layer",
            "sewage-treatment",
            "--bbox=-48,-16,-47,-15",
            "--zoom",
            "7",
        ])
        .unwrap();

        let Commands::Render {
            disease,
            region,
            layer,
            bbox,
            zoom,
            ..
        } = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(disease, Disease::Zika);
        assert_eq!(region, Region::CenterWest);
        assert_eq!(layer.to_string(), "sewage-treatment");
        assert!(bbox.is_some());
        assert!((zoom - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_disease_is_rejected() {
        let args = ["epi_map", "series", "--geocode", "3550308", "--disease", "malaria"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
