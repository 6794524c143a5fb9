use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cmd::{CmdParams, DEFAULT_DISTANCE_MODULUS, ZoomMargins};
use crate::data::band::{Band, BandPair};
use crate::data::filter::QualityCuts;
use crate::data::isochrone::DEFAULT_MAG_COLUMNS;

// ---------------------------------------------------------------------------
// Explorer configuration (JSON, every field optional)
// ---------------------------------------------------------------------------

/// Start-up settings: initial cut values, slider ranges and data locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub blue: Band,
    pub red: Band,

    /// Initial signal-to-noise floor.
    pub snr: f64,
    /// Initial sharpness² ceiling.
    pub sharp: f64,
    /// Initial roundness² ceiling.
    pub round: f64,
    /// Initial crowding ceiling.
    pub crowd: f64,

    pub snr_max: f64,
    pub sharp_max: f64,
    pub round_max: f64,
    pub crowd_max: f64,
    /// Upper end of the four zoom-margin sliders.
    pub zoom_max: f64,

    pub distance_modulus: f64,

    /// Directory holding `iso_<population>_<age>.txt`.
    pub isochrone_dir: PathBuf,
    pub population: String,
    /// Isochrone magnitude column per band, blue to red.
    pub mag_columns: Vec<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let pair = BandPair::default();
        Self {
            blue: pair.blue,
            red: pair.red,
            snr: 4.0,
            sharp: 0.1,
            round: 1.0,
            crowd: 0.5,
            snr_max: 10.0,
            sharp_max: 1.5,
            round_max: 10.0,
            crowd_max: 3.0,
            zoom_max: 5.0,
            distance_modulus: DEFAULT_DISTANCE_MODULUS,
            isochrone_dir: PathBuf::from("isochrones/ngc3344"),
            population: "solar".to_string(),
            mag_columns: DEFAULT_MAG_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExplorerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parameters the controls start from.
    pub fn initial_params(&self) -> CmdParams {
        CmdParams {
            pair: BandPair::new(self.blue, self.red),
            cuts: QualityCuts {
                snr_min: self.snr,
                sharp_max: self.sharp,
                round_max: self.round,
                crowd_max: self.crowd,
            },
            distance_modulus: self.distance_modulus,
            zoom: ZoomMargins::default(),
            show_isochrones: false,
            zoom_removed: false,
        }
    }
}
