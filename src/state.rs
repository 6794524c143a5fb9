use std::path::{Path, PathBuf};

use crate::cmd::{CmdFrame, CmdParams, build_frame};
use crate::config::ExplorerConfig;
use crate::data::band::Band;
use crate::data::filter::band_pass_counts;
use crate::data::isochrone::{
    MIN_INITIAL_MASS, load_isochrones, read_isochrone_table, save_isochrones,
};
use crate::data::loader::load_catalog;
use crate::data::model::{IsochroneTable, PhotometryCatalog};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ExplorerConfig,

    /// Loaded photometry (None until a catalog is opened).
    pub catalog: Option<PhotometryCatalog>,
    pub catalog_path: Option<PathBuf>,

    /// Assembled isochrones (None until loaded).
    pub isochrones: Option<IsochroneTable>,

    /// Current control values.
    pub params: CmdParams,

    /// Result of the last rebuild.
    pub frame: Option<CmdFrame>,

    /// Per-band `(passing, detected)` counts under the current cuts.
    pub band_counts: [(usize, usize); Band::COUNT],

    /// Set on every rebuild; the plot snaps to the frame limits once.
    pub reset_bounds: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            params: config.initial_params(),
            config,
            catalog: None,
            catalog_path: None,
            isochrones: None,
            frame: None,
            band_counts: [(0, 0); Band::COUNT],
            reset_bounds: false,
            status_message: None,
        }
    }

    /// Recompute the diagram from the current parameters.
    pub fn redraw(&mut self) {
        let Some(catalog) = &self.catalog else {
            self.frame = None;
            return;
        };
        self.frame = Some(build_frame(catalog, self.isochrones.as_ref(), &self.params));
        self.band_counts = band_pass_counts(catalog, &self.params.cuts);
        self.reset_bounds = true;
    }

    /// Returns whether the plot should snap to the frame limits, clearing the flag.
    pub fn take_bounds_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_bounds)
    }

    /// Ingest a newly loaded catalog and redraw.
    pub fn set_catalog(&mut self, catalog: PhotometryCatalog, path: Option<PathBuf>) {
        self.status_message = catalog.is_empty().then(|| {
            log::warn!("Catalog has no stars");
            "Catalog has no stars".to_string()
        });
        self.catalog = Some(catalog);
        self.catalog_path = path;
        self.redraw();
    }

    /// Ingest a newly loaded isochrone table and redraw.
    pub fn set_isochrones(&mut self, table: IsochroneTable) {
        self.status_message = table.is_empty().then(|| {
            log::warn!("No isochrone rows above {MIN_INITIAL_MASS} Msun");
            format!("No isochrone rows above {MIN_INITIAL_MASS} Msun")
        });
        self.isochrones = Some(table);
        self.redraw();
    }

    fn report_error(&mut self, e: anyhow::Error) {
        log::error!("{e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }

    // -- File actions: errors end up in the status line, state is left as it was --

    pub fn open_catalog(&mut self, path: &Path) {
        match load_catalog(path) {
            Ok(catalog) => self.set_catalog(catalog, Some(path.to_path_buf())),
            Err(e) => self.report_error(e),
        }
    }

    /// Assemble `iso_<population>_<age>.txt` files from `dir`.
    pub fn open_isochrone_dir(&mut self, dir: &Path) {
        match load_isochrones(dir, &self.config.population, self.config.mag_columns.as_slice()) {
            Ok(table) => {
                self.config.isochrone_dir = dir.to_path_buf();
                self.set_isochrones(table);
            }
            Err(e) => self.report_error(e),
        }
    }

    pub fn open_isochrone_table(&mut self, path: &Path) {
        match read_isochrone_table(path) {
            Ok(table) => self.set_isochrones(table),
            Err(e) => self.report_error(e),
        }
    }

    pub fn save_isochrone_table(&mut self, path: &Path) {
        let Some(table) = &self.isochrones else {
            self.status_message = Some("No isochrones loaded".to_string());
            return;
        };
        match save_isochrones(table, path) {
            Ok(()) => self.status_message = Some(format!("Saved {}", path.display())),
            Err(e) => self.report_error(e),
        }
    }
}
