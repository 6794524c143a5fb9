mod app;
mod cmd;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::CmdExplorerApp;
use clap::Parser;
use eframe::egui;

use config::ExplorerConfig;
use data::band::Band;
use data::isochrone::{combined_file, load_isochrones, read_isochrone_table, save_isochrones};
use data::loader::load_catalog;
use state::AppState;

#[derive(Parser)]
#[command(name = "cmd-explorer")]
#[command(about = "Interactive color-magnitude diagrams with photometric quality cuts", long_about = None)]
struct Cli {
    /// Photometry catalog (.parquet, .csv, or whitespace-delimited text)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Directory holding iso_<population>_<age>.txt files
    #[arg(short, long)]
    isochrone_dir: Option<PathBuf>,

    /// Isochrone population name
    #[arg(short, long)]
    population: Option<String>,

    /// Previously saved iso_<population>_all.txt table
    #[arg(short = 't', long, conflicts_with = "isochrone_dir")]
    isochrone_table: Option<PathBuf>,

    /// Write the assembled table next to the per-age files
    #[arg(long, requires = "isochrone_dir")]
    save_isochrones: bool,

    /// Initial blue band
    #[arg(long)]
    blue: Option<Band>,

    /// Initial red band
    #[arg(long)]
    red: Option<Band>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ExplorerConfig::load(path)?,
        None => ExplorerConfig::default(),
    };
    if let Some(population) = cli.population {
        config.population = population;
    }
    if let Some(blue) = cli.blue {
        config.blue = blue;
    }
    if let Some(red) = cli.red {
        config.red = red;
    }

    // Start-up loads are fatal; later loads from the File menu only report.
    let mut state = AppState::new(config);
    if let Some(dir) = &cli.isochrone_dir {
        let table = load_isochrones(dir, &state.config.population, state.config.mag_columns.as_slice())?;
        if cli.save_isochrones {
            save_isochrones(&table, &combined_file(dir, &state.config.population))?;
        }
        state.config.isochrone_dir = dir.clone();
        state.set_isochrones(table);
    } else if let Some(path) = &cli.isochrone_table {
        state.set_isochrones(read_isochrone_table(path)?);
    }
    if let Some(path) = &cli.catalog {
        state.set_catalog(load_catalog(path)?, Some(path.clone()));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([800.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CMD Explorer – NGC 3344",
        options,
        Box::new(|cc| {
            // Isochrone colours are chosen for a white background.
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(CmdExplorerApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
