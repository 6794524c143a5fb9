use super::band::{Band, BandPair};
use super::model::{BandPhotometry, PhotometryCatalog};

// ---------------------------------------------------------------------------
// Quality cuts: which stars look like clean point sources
// ---------------------------------------------------------------------------

/// Thresholds applied to both bands of the selected pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityCuts {
    /// Signal-to-noise floor (exclusive).
    pub snr_min: f64,
    /// Ceiling on sharpness squared (exclusive).
    pub sharp_max: f64,
    /// Ceiling on roundness squared (exclusive).
    pub round_max: f64,
    /// Crowding ceiling in magnitudes (exclusive).
    pub crowd_max: f64,
}

impl QualityCuts {
    /// Whether a single band measurement passes all four checks.
    pub fn passes(&self, p: &BandPhotometry) -> bool {
        p.snr > self.snr_min
            && p.sharpness.powi(2) < self.sharp_max
            && p.roundness.powi(2) < self.round_max
            && p.crowding < self.crowd_max
    }
}

/// Kept / removed split of the stars detected in both bands.
///
/// Indices refer to `PhotometryCatalog::stars` and are in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutPartition {
    pub kept: Vec<usize>,
    pub removed: Vec<usize>,
    /// Stars dropped before cutting because one band was not detected.
    pub not_detected: usize,
}

impl CutPartition {
    /// Number of stars detected in both bands.
    pub fn detected(&self) -> usize {
        self.kept.len() + self.removed.len()
    }
}

/// Split the catalog for one band pair.
///
/// A star is considered only if it is detected in both bands. It is kept when
/// both bands pass every cut and removed otherwise.
pub fn partition(catalog: &PhotometryCatalog, pair: BandPair, cuts: &QualityCuts) -> CutPartition {
    let mut out = CutPartition::default();

    for (idx, star) in catalog.stars.iter().enumerate() {
        let (blue, red) = (star.band(pair.blue), star.band(pair.red));
        if !blue.is_detected() || !red.is_detected() {
            out.not_detected += 1;
            continue;
        }
        if cuts.passes(blue) && cuts.passes(red) {
            out.kept.push(idx);
        } else {
            out.removed.push(idx);
        }
    }

    out
}

/// Per-band pass counts among stars detected in that band; shown next to the sliders.
pub fn band_pass_counts(catalog: &PhotometryCatalog, cuts: &QualityCuts) -> [(usize, usize); Band::COUNT] {
    let mut counts = [(0, 0); Band::COUNT];
    for star in &catalog.stars {
        for band in Band::ALL {
            let p = star.band(band);
            if !p.is_detected() {
                continue;
            }
            let slot = &mut counts[band.index()];
            slot.1 += 1;
            if cuts.passes(p) {
                slot.0 += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::{Star, NON_DETECTION};

    fn good() -> BandPhotometry {
        BandPhotometry {
            mag: 25.0,
            snr: 8.0,
            sharpness: 0.05,
            roundness: 0.2,
            crowding: 0.1,
        }
    }

    fn star_with(blue: BandPhotometry, red: BandPhotometry) -> Star {
        let mut bands = [good(); Band::COUNT];
        bands[Band::F555W.index()] = blue;
        bands[Band::F814W.index()] = red;
        Star { bands }
    }

    fn cuts() -> QualityCuts {
        QualityCuts {
            snr_min: 4.0,
            sharp_max: 0.1,
            round_max: 1.0,
            crowd_max: 0.5,
        }
    }

    fn pair() -> BandPair {
        BandPair::new(Band::F555W, Band::F814W)
    }

    #[test]
    fn snr_floor_is_exclusive() {
        let at_floor = BandPhotometry { snr: 4.0, ..good() };
        let above = BandPhotometry { snr: 4.0001, ..good() };
        assert!(!cuts().passes(&at_floor));
        assert!(cuts().passes(&above));
    }

    #[test]
    fn ceilings_are_exclusive() {
        let c = cuts();
        // 0.1f64.sqrt() squared may round either way, so pick exact squares.
        let c = QualityCuts { sharp_max: 0.25, round_max: 0.25, ..c };
        assert!(!c.passes(&BandPhotometry { sharpness: -0.5, ..good() }));
        assert!(!c.passes(&BandPhotometry { roundness: 0.5, ..good() }));
        assert!(!c.passes(&BandPhotometry { crowding: 0.5, ..good() }));
        assert!(c.passes(&BandPhotometry { sharpness: -0.49, ..good() }));
    }

    #[test]
    fn non_detection_is_excluded_from_both_sides() {
        let catalog = PhotometryCatalog::new(vec![
            star_with(good(), good()),
            star_with(BandPhotometry { mag: NON_DETECTION, ..good() }, good()),
            star_with(good(), BandPhotometry { snr: 1.0, ..good() }),
        ]);
        let part = partition(&catalog, pair(), &cuts());
        assert_eq!(part.kept, vec![0]);
        assert_eq!(part.removed, vec![2]);
        assert_eq!(part.not_detected, 1);
    }

    #[test]
    fn non_detection_in_unselected_band_is_ignored() {
        let mut star = star_with(good(), good());
        star.bands[Band::F275W.index()].mag = NON_DETECTION;
        let catalog = PhotometryCatalog::new(vec![star]);
        let part = partition(&catalog, pair(), &cuts());
        assert_eq!(part.kept, vec![0]);
        assert_eq!(part.not_detected, 0);
    }

    #[test]
    fn one_failing_band_removes_the_star() {
        let bad = BandPhotometry { crowding: 2.0, ..good() };
        let catalog = PhotometryCatalog::new(vec![star_with(good(), bad), star_with(bad, good())]);
        let part = partition(&catalog, pair(), &cuts());
        assert!(part.kept.is_empty());
        assert_eq!(part.removed, vec![0, 1]);
    }

    #[test]
    fn partition_is_exact_and_exhaustive() {
        // Sweep a grid of measurements so every condition flips somewhere.
        let mut stars = Vec::new();
        for i in 0..200 {
            let f = i as f64;
            let blue = BandPhotometry {
                mag: if i % 17 == 0 { NON_DETECTION } else { 20.0 + f * 0.01 },
                snr: (i % 9) as f64,
                sharpness: ((i % 7) as f64 - 3.0) * 0.1,
                roundness: ((i % 5) as f64) * 0.3,
                crowding: ((i % 4) as f64) * 0.2,
            };
            let red = BandPhotometry {
                mag: if i % 23 == 0 { 150.0 } else { 19.0 + f * 0.01 },
                snr: (i % 11) as f64,
                ..blue
            };
            stars.push(star_with(blue, red));
        }
        let catalog = PhotometryCatalog::new(stars);
        let part = partition(&catalog, pair(), &cuts());

        let kept: BTreeSet<usize> = part.kept.iter().copied().collect();
        let removed: BTreeSet<usize> = part.removed.iter().copied().collect();
        assert!(kept.is_disjoint(&removed));

        let detected: BTreeSet<usize> = catalog
            .stars
            .iter()
            .enumerate()
            .filter(|(_, s)| s.band(Band::F555W).is_detected() && s.band(Band::F814W).is_detected())
            .map(|(i, _)| i)
            .collect();
        let union: BTreeSet<usize> = kept.union(&removed).copied().collect();
        assert_eq!(union, detected);
        assert_eq!(part.detected() + part.not_detected, catalog.len());
        assert!(!part.kept.is_empty() && !part.removed.is_empty());
    }

    #[test]
    fn empty_catalog_gives_empty_partition() {
        let part = partition(&PhotometryCatalog::default(), pair(), &cuts());
        assert_eq!(part, CutPartition::default());
    }

    #[test]
    fn band_counts_skip_non_detections() {
        let catalog = PhotometryCatalog::new(vec![
            star_with(good(), BandPhotometry { snr: 1.0, ..good() }),
            star_with(BandPhotometry { mag: NON_DETECTION, ..good() }, good()),
        ]);
        let counts = band_pass_counts(&catalog, &cuts());
        assert_eq!(counts[Band::F555W.index()], (1, 1));
        assert_eq!(counts[Band::F814W.index()], (1, 2));
        assert_eq!(counts[Band::F275W.index()], (2, 2));
    }
}
