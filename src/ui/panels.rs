use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, Response, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::cmd::ZoomMargins;
use crate::config::ExplorerConfig;
use crate::data::band::{Band, BandPair};
use crate::data::filter::QualityCuts;
use crate::data::isochrone::combined_file;
use crate::data::model::{ISOCHRONE_AGES, IsochroneTable};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – CMD controls
// ---------------------------------------------------------------------------

/// A slider edit is committed when the drag ends, or immediately for
/// keyboard / typed edits. Nothing is rebuilt while the handle is held.
fn committed(response: &Response) -> bool {
    response.drag_stopped() || (response.changed() && !response.dragged())
}

fn slider(ui: &mut Ui, value: &mut f64, range: RangeInclusive<f64>, step: f64, text: &str) -> bool {
    let response = ui.add(egui::Slider::new(value, range).step_by(step).text(text));
    committed(&response)
}

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("CMD Controls");
    ui.separator();

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Bands");
            changed |= band_controls(ui, &mut state.params.pair);
            column_hint(ui, state.params.pair);
            ui.separator();

            ui.strong("Quality cuts");
            changed |= cut_controls(ui, &mut state.params.cuts, &state.config);
            band_count_grid(ui, state.params.pair, &state.band_counts);
            ui.separator();

            ui.strong("Zoom (left panel)");
            changed |= zoom_controls(ui, &mut state.params.zoom, state.config.zoom_max);
            ui.separator();

            ui.strong("Overlay");
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .toggle_value(&mut state.params.show_isochrones, "Isochrones")
                    .changed();
                changed |= ui
                    .toggle_value(&mut state.params.zoom_removed, "Zoom removed")
                    .changed();
            });
            ui.label(format!("Distance modulus: {:.2}", state.params.distance_modulus));
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Isochrones").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    isochrone_table(ui, state.isochrones.as_ref());
                });
        });

    if changed {
        state.redraw();
    }
}

fn band_combo(ui: &mut Ui, id: &str, current: &mut Band, choices: &[Band]) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for &band in choices {
                changed |= ui.selectable_value(current, band, band.label()).changed();
            }
        });
    changed
}

fn band_controls(ui: &mut Ui, pair: &mut BandPair) -> bool {
    let mut changed = false;
    egui::Grid::new("band_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Blue");
        changed |= band_combo(ui, "blue_band", &mut pair.blue, Band::blue_choices());
        ui.end_row();
        ui.label("Red");
        changed |= band_combo(ui, "red_band", &mut pair.red, Band::red_choices());
        ui.end_row();
    });
    changed
}

/// Which raw columns the selected bands resolve to.
fn column_hint(ui: &mut Ui, pair: BandPair) {
    let (cat_blue, cat_red) = pair.catalog_columns();
    let (iso_blue, iso_red) = pair.isochrone_columns();
    ui.label(
        RichText::new(format!(
            "catalog columns {cat_blue}/{cat_red}, isochrone columns {iso_blue}/{iso_red}"
        ))
        .weak()
        .small(),
    );
}

fn cut_controls(ui: &mut Ui, cuts: &mut QualityCuts, config: &ExplorerConfig) -> bool {
    let mut changed = false;
    changed |= slider(ui, &mut cuts.snr_min, 0.5..=config.snr_max, 0.5, "SNR >");
    changed |= slider(ui, &mut cuts.sharp_max, 0.05..=config.sharp_max, 0.05, "Sharp² <");
    changed |= slider(ui, &mut cuts.round_max, 0.05..=config.round_max, 0.05, "Round² <");
    changed |= slider(ui, &mut cuts.crowd_max, 0.1..=config.crowd_max, 0.1, "Crowd <");
    changed
}

/// Pass counts for the two selected bands.
fn band_count_grid(ui: &mut Ui, pair: BandPair, counts: &[(usize, usize); Band::COUNT]) {
    egui::Grid::new("band_counts").num_columns(2).show(ui, |ui: &mut Ui| {
        for band in [pair.blue, pair.red] {
            let (pass, detected) = counts[band.index()];
            ui.label(band.label());
            ui.label(format!("{pass} / {detected} pass"));
            ui.end_row();
        }
    });
}

fn zoom_controls(ui: &mut Ui, zoom: &mut ZoomMargins, max: f64) -> bool {
    let mut changed = false;
    changed |= slider(ui, &mut zoom.color_min, 0.0..=max, 0.25, "Color min");
    changed |= slider(ui, &mut zoom.color_max, 0.0..=max, 0.25, "Color max");
    changed |= slider(ui, &mut zoom.mag_bright, 0.0..=max, 0.25, "Bright end");
    changed |= slider(ui, &mut zoom.mag_faint, 0.0..=max, 0.25, "Faint end");
    changed
}

/// Rows and mass range per isochrone age.
fn isochrone_table(ui: &mut Ui, table: Option<&IsochroneTable>) {
    let Some(table) = table else {
        ui.label("No isochrones loaded.");
        return;
    };
    let summary = table.age_summary();

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Age");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Rows");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Mass (M☉)");
            });
        })
        .body(|mut body| {
            for age in ISOCHRONE_AGES {
                let entry = summary.get(&age);
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{age} Myr"));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(entry.map_or(0, |e| e.0).to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        match entry {
                            Some(&(_, lo, hi)) => ui.label(format!("{lo:.2} – {hi:.2}")),
                            None => ui.label("–"),
                        };
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open catalog…").clicked() {
                open_catalog_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open isochrone directory…").clicked() {
                open_isochrone_dir_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open isochrone table…").clicked() {
                open_isochrone_table_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.isochrones.is_some(), egui::Button::new("Save isochrone table…"))
                .clicked()
            {
                save_isochrone_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(path) = &state.catalog_path {
            let name = path.file_name().map_or_else(
                || path.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            );
            ui.label(RichText::new(name).strong());
        }

        if let Some(frame) = &state.frame {
            let part = &frame.partition;
            ui.label(format!(
                "{}: {} stars, {} kept, {} removed, {} not detected",
                frame.color_label(),
                part.detected() + part.not_detected,
                part.kept.len(),
                part.removed.len(),
                part.not_detected
            ));
        }

        if let Some(iso) = &state.isochrones {
            ui.separator();
            ui.label(format!("{} isochrone rows", iso.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_catalog_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open photometry catalog")
        .add_filter("Supported files", &["parquet", "pq", "csv", "dat", "txt", "phot"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Text", &["dat", "txt", "phot"])
        .pick_file();

    if let Some(path) = file {
        state.open_catalog(&path);
    }
}

pub fn open_isochrone_dir_dialog(state: &mut AppState) {
    let dir = rfd::FileDialog::new()
        .set_title(format!("Folder with iso_{}_<age>.txt", state.config.population))
        .set_directory(&state.config.isochrone_dir)
        .pick_folder();

    if let Some(dir) = dir {
        state.open_isochrone_dir(&dir);
    }
}

pub fn open_isochrone_table_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open assembled isochrone table")
        .set_directory(&state.config.isochrone_dir)
        .add_filter("Text", &["txt"])
        .pick_file();

    if let Some(path) = file {
        state.open_isochrone_table(&path);
    }
}

pub fn save_isochrone_dialog(state: &mut AppState) {
    let default = combined_file(&state.config.isochrone_dir, &state.config.population);
    let mut dialog = rfd::FileDialog::new()
        .set_title("Save isochrone table")
        .set_directory(&state.config.isochrone_dir);
    if let Some(name) = default.file_name().and_then(|n| n.to_str()) {
        dialog = dialog.set_file_name(name);
    }

    if let Some(path) = dialog.save_file() {
        state.save_isochrone_table(&path);
    }
}
