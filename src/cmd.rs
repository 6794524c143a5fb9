use crate::data::band::BandPair;
use crate::data::filter::{CutPartition, QualityCuts, partition};
use crate::data::model::{ISOCHRONE_AGES, IsochroneTable, PhotometryCatalog};

// ---------------------------------------------------------------------------
// Parameters: everything the controls can change
// ---------------------------------------------------------------------------

/// Default distance modulus of NGC 3344.
pub const DEFAULT_DISTANCE_MODULUS: f64 = 29.6;

/// Fraction of the data span added on each side by auto-scaling.
const AUTO_MARGIN: f64 = 0.05;

/// How the right panel is placed relative to the left one when zoomed.
const ZOOM_COLOR_LOW: f64 = 1.0;
const ZOOM_COLOR_HIGH: f64 = 2.0;
const ZOOM_MAG_BRIGHT: f64 = 2.0;
const ZOOM_MAG_FAINT: f64 = 1.0;

/// Trims applied to the left panel's auto limits. Positive values shrink.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoomMargins {
    pub color_min: f64,
    pub color_max: f64,
    pub mag_bright: f64,
    pub mag_faint: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CmdParams {
    pub pair: BandPair,
    pub cuts: QualityCuts,
    pub distance_modulus: f64,
    pub zoom: ZoomMargins,
    pub show_isochrones: bool,
    pub zoom_removed: bool,
}

// ---------------------------------------------------------------------------
// Frame: plot-ready output
// ---------------------------------------------------------------------------

/// Visible region of one panel. Magnitudes grow downwards on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    pub color_min: f64,
    pub color_max: f64,
    pub mag_bright: f64,
    pub mag_faint: f64,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self {
            color_min: 0.0,
            color_max: 1.0,
            mag_bright: 0.0,
            mag_faint: 1.0,
        }
    }
}

impl AxisLimits {
    /// Auto-scaled limits around `points` (`[color, mag]`), padded by 5%.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a [f64; 2]>) -> Self {
        let mut lo = [f64::INFINITY; 2];
        let mut hi = [f64::NEG_INFINITY; 2];
        for p in points {
            for k in 0..2 {
                if p[k].is_finite() {
                    lo[k] = lo[k].min(p[k]);
                    hi[k] = hi[k].max(p[k]);
                }
            }
        }
        if !lo[0].is_finite() || !lo[1].is_finite() {
            return Self::default();
        }
        let (color_min, color_max) = pad(lo[0], hi[0]);
        let (mag_bright, mag_faint) = pad(lo[1], hi[1]);
        Self {
            color_min,
            color_max,
            mag_bright,
            mag_faint,
        }
    }

    /// Shrink each edge inwards by the matching margin. Not clamped.
    pub fn trimmed(self, m: &ZoomMargins) -> Self {
        Self {
            color_min: self.color_min + m.color_min,
            color_max: self.color_max - m.color_max,
            mag_bright: self.mag_bright + m.mag_bright,
            mag_faint: self.mag_faint - m.mag_faint,
        }
    }

    /// Fixed widening used for the "zoom removed" view.
    pub fn zoom_removed(self) -> Self {
        Self {
            color_min: self.color_min - ZOOM_COLOR_LOW,
            color_max: self.color_max + ZOOM_COLOR_HIGH,
            mag_bright: self.mag_bright - ZOOM_MAG_BRIGHT,
            mag_faint: self.mag_faint + ZOOM_MAG_FAINT,
        }
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 {
        (lo - AUTO_MARGIN * span, hi + AUTO_MARGIN * span)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

/// One isochrone shifted to apparent magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneCurve {
    pub age: u32,
    /// Index of the age in `ISOCHRONE_AGES`, used to pick a style.
    pub slot: usize,
    pub points: Vec<[f64; 2]>,
}

impl IsochroneCurve {
    pub fn label(&self) -> String {
        format!("{} Myr", self.age)
    }
}

/// Everything needed to draw both panels.
#[derive(Debug, Clone, PartialEq)]
pub struct CmdFrame {
    pub pair: BandPair,
    pub partition: CutPartition,
    /// `[color, mag]` of kept stars.
    pub kept: Vec<[f64; 2]>,
    /// `[color, mag]` of removed stars.
    pub removed: Vec<[f64; 2]>,
    pub isochrones: Vec<IsochroneCurve>,
    pub left: AxisLimits,
    pub right: AxisLimits,
}

impl CmdFrame {
    pub fn color_label(&self) -> String {
        self.pair.color_label()
    }

    pub fn magnitude_label(&self) -> &'static str {
        self.pair.magnitude_label()
    }
}

// ---------------------------------------------------------------------------
// Frame construction
// ---------------------------------------------------------------------------

fn cmd_points(catalog: &PhotometryCatalog, pair: BandPair, indices: &[usize]) -> Vec<[f64; 2]> {
    indices
        .iter()
        .map(|&i| {
            let star = &catalog.stars[i];
            let blue = star.band(pair.blue).mag;
            let red = star.band(pair.red).mag;
            [blue - red, red]
        })
        .collect()
}

/// Isochrone curves for every age, magnitudes shifted by the distance modulus.
pub fn isochrone_curves(table: &IsochroneTable, pair: BandPair, distance_modulus: f64) -> Vec<IsochroneCurve> {
    ISOCHRONE_AGES
        .iter()
        .enumerate()
        .map(|(slot, &age)| {
            let points = table
                .rows_for_age(age)
                .map(|row| {
                    let blue = row.mag(pair.blue);
                    let red = row.mag(pair.red);
                    [blue - red, red + distance_modulus]
                })
                .collect();
            IsochroneCurve { age, slot, points }
        })
        .collect()
}

/// Recompute the whole diagram from scratch.
pub fn build_frame(
    catalog: &PhotometryCatalog,
    isochrones: Option<&IsochroneTable>,
    params: &CmdParams,
) -> CmdFrame {
    let pair = params.pair;
    let partition = partition(catalog, pair, &params.cuts);
    let kept = cmd_points(catalog, pair, &partition.kept);
    let removed = cmd_points(catalog, pair, &partition.removed);

    let isochrones = match isochrones {
        Some(table) if params.show_isochrones => isochrone_curves(table, pair, params.distance_modulus),
        _ => Vec::new(),
    };
    let curve_points = || isochrones.iter().flat_map(|c| c.points.iter());

    let left = AxisLimits::around(kept.iter().chain(curve_points())).trimmed(&params.zoom);
    let right = if params.zoom_removed {
        left.zoom_removed()
    } else {
        AxisLimits::around(removed.iter().chain(curve_points()))
    };

    log::debug!(
        "{}: {} kept, {} removed, {} not detected",
        pair.color_label(),
        kept.len(),
        removed.len(),
        partition.not_detected
    );

    CmdFrame {
        pair,
        partition,
        kept,
        removed,
        isochrones,
        left,
        right,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::band::Band;
    use crate::data::model::{BandPhotometry, IsochroneRow, NON_DETECTION, Star};

    fn star(blue_mag: f64, red_mag: f64, snr: f64) -> Star {
        let p = BandPhotometry {
            mag: 25.0,
            snr,
            sharpness: 0.0,
            roundness: 0.0,
            crowding: 0.0,
        };
        let mut bands = [p; Band::COUNT];
        bands[Band::F555W.index()].mag = blue_mag;
        bands[Band::F814W.index()].mag = red_mag;
        Star { bands }
    }

    fn params() -> CmdParams {
        CmdParams {
            pair: BandPair::new(Band::F555W, Band::F814W),
            cuts: QualityCuts {
                snr_min: 5.0,
                sharp_max: 0.1,
                round_max: 1.0,
                crowd_max: 0.5,
            },
            distance_modulus: DEFAULT_DISTANCE_MODULUS,
            zoom: ZoomMargins::default(),
            show_isochrones: false,
            zoom_removed: false,
        }
    }

    fn catalog() -> PhotometryCatalog {
        PhotometryCatalog::new(vec![
            star(24.0, 23.0, 10.0),
            star(26.0, 24.0, 10.0),
            star(25.0, 25.5, 2.0),
            star(NON_DETECTION, 25.0, 10.0),
        ])
    }

    fn isochrones() -> IsochroneTable {
        let rows = ISOCHRONE_AGES
            .iter()
            .flat_map(|&age| {
                let shift = age as f64 / 100.0;
                [
                    IsochroneRow { mass: 5.0, mags: [0.0, 0.0, 0.0, -3.0 + shift, -3.5], age },
                    IsochroneRow { mass: 8.0, mags: [0.0, 0.0, 0.0, -5.0 + shift, -5.2], age },
                ]
            })
            .collect();
        IsochroneTable { rows }
    }

    #[test]
    fn points_are_color_and_red_magnitude() {
        let frame = build_frame(&catalog(), None, &params());
        assert_eq!(frame.kept, vec![[1.0, 23.0], [2.0, 24.0]]);
        assert_eq!(frame.removed, vec![[-0.5, 25.5]]);
        assert_eq!(frame.partition.not_detected, 1);
        assert_eq!(frame.color_label(), "F555W-F814W");
        assert_eq!(frame.magnitude_label(), "F814W");
    }

    #[test]
    fn auto_limits_pad_by_five_percent() {
        let frame = build_frame(&catalog(), None, &params());
        assert_relative_eq!(frame.left.color_min, 0.95);
        assert_relative_eq!(frame.left.color_max, 2.05);
        assert_relative_eq!(frame.left.mag_bright, 22.95);
        assert_relative_eq!(frame.left.mag_faint, 24.05);
        // A single removed star has zero span on both axes.
        assert_relative_eq!(frame.right.color_min, -1.0);
        assert_relative_eq!(frame.right.mag_faint, 26.0);
    }

    #[test]
    fn empty_panel_gets_unit_limits() {
        let frame = build_frame(&PhotometryCatalog::default(), None, &params());
        assert!(frame.kept.is_empty() && frame.removed.is_empty());
        assert_eq!(frame.left, AxisLimits::default());
        assert_eq!(frame.right, AxisLimits::default());
    }

    #[test]
    fn trims_apply_to_left_panel_only() {
        let mut p = params();
        p.zoom = ZoomMargins {
            color_min: 0.1,
            color_max: 0.2,
            mag_bright: 0.3,
            mag_faint: 0.4,
        };
        let plain = build_frame(&catalog(), None, &params());
        let frame = build_frame(&catalog(), None, &p);
        assert_relative_eq!(frame.left.color_min, plain.left.color_min + 0.1);
        assert_relative_eq!(frame.left.color_max, plain.left.color_max - 0.2);
        assert_relative_eq!(frame.left.mag_bright, plain.left.mag_bright + 0.3);
        assert_relative_eq!(frame.left.mag_faint, plain.left.mag_faint - 0.4);
        assert_eq!(frame.right, plain.right);
    }

    #[test]
    fn oversized_trim_is_not_clamped() {
        let mut p = params();
        p.zoom.mag_faint = 10.0;
        let frame = build_frame(&catalog(), None, &p);
        assert!(frame.left.mag_faint < frame.left.mag_bright);
    }

    #[test]
    fn zoom_removed_follows_left_panel() {
        let mut p = params();
        p.zoom.mag_faint = 0.5;
        p.zoom_removed = true;
        let frame = build_frame(&catalog(), None, &p);
        assert_relative_eq!(frame.right.color_min, frame.left.color_min - 1.0);
        assert_relative_eq!(frame.right.color_max, frame.left.color_max + 2.0);
        assert_relative_eq!(frame.right.mag_bright, frame.left.mag_bright - 2.0);
        assert_relative_eq!(frame.right.mag_faint, frame.left.mag_faint + 1.0);
    }

    #[test]
    fn overlay_draws_one_shifted_curve_per_age() {
        let mut p = params();
        p.show_isochrones = true;
        let table = isochrones();
        let frame = build_frame(&catalog(), Some(&table), &p);

        assert_eq!(frame.isochrones.len(), ISOCHRONE_AGES.len());
        for (curve, &age) in frame.isochrones.iter().zip(&ISOCHRONE_AGES) {
            assert_eq!(curve.age, age);
            assert_eq!(curve.points.len(), 2);
            let shift = age as f64 / 100.0;
            assert_relative_eq!(curve.points[0][0], -3.0 + shift + 3.5);
            assert_relative_eq!(curve.points[0][1], -3.5 + DEFAULT_DISTANCE_MODULUS);
        }
        assert_eq!(frame.isochrones[2].label(), "30 Myr");
        // Curves reach fainter than any kept star, so they widen the limits.
        assert!(frame.left.mag_faint > 26.1);
    }

    #[test]
    fn overlay_off_or_missing_draws_nothing() {
        let table = isochrones();
        assert!(build_frame(&catalog(), Some(&table), &params()).isochrones.is_empty());

        let mut p = params();
        p.show_isochrones = true;
        assert!(build_frame(&catalog(), None, &p).isochrones.is_empty());
    }

    #[test]
    fn curves_follow_selected_bands() {
        let table = IsochroneTable {
            rows: vec![IsochroneRow { mass: 6.0, mags: [-1.0, -2.0, -3.0, -4.0, -5.0], age: 10 }],
        };
        let pair = BandPair::new(Band::F275W, Band::F438W);
        let curves = isochrone_curves(&table, pair, 30.0);
        assert_eq!(curves[0].points, vec![[2.0, 27.0]]);
    }

    #[test]
    fn missing_ages_give_empty_curves() {
        let table = IsochroneTable {
            rows: isochrones().rows.into_iter().filter(|r| r.age == 20).collect(),
        };
        let curves = isochrone_curves(&table, params().pair, 0.0);
        let lengths: Vec<usize> = curves.iter().map(|c| c.points.len()).collect();
        assert_eq!(lengths, vec![0, 2, 0, 0, 0]);
    }
}
