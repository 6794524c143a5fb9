use std::collections::BTreeMap;

use super::band::Band;

// ---------------------------------------------------------------------------
// Photometry catalog
// ---------------------------------------------------------------------------

/// Magnitudes at or above this value mark a non-detection.
pub const NON_DETECTION: f64 = 99.999;

/// Measurements of one star through one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPhotometry {
    pub mag: f64,
    pub snr: f64,
    pub sharpness: f64,
    pub roundness: f64,
    pub crowding: f64,
}

impl BandPhotometry {
    /// Whether the star was measured in this band. NaN counts as not detected.
    pub fn is_detected(&self) -> bool {
        self.mag < NON_DETECTION
    }
}

/// One row of the photometry catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub bands: [BandPhotometry; Band::COUNT],
}

impl Star {
    pub fn band(&self, band: Band) -> &BandPhotometry {
        &self.bands[band.index()]
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhotometryCatalog {
    pub stars: Vec<Star>,
}

impl PhotometryCatalog {
    pub fn new(stars: Vec<Star>) -> Self {
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Isochrone table
// ---------------------------------------------------------------------------

/// Isochrone ages in Myr, in the order they are loaded and drawn.
pub const ISOCHRONE_AGES: [u32; 5] = [10, 20, 30, 40, 50];

/// One theoretical star of one isochrone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsochroneRow {
    /// Initial mass in solar masses.
    pub mass: f64,
    /// Absolute magnitude per band, in `Band::ALL` order.
    pub mags: [f64; Band::COUNT],
    /// Age in Myr.
    pub age: u32,
}

impl IsochroneRow {
    pub fn mag(&self, band: Band) -> f64 {
        self.mags[band.index()]
    }
}

#[derive(Debug, Clone, Default)]
pub struct IsochroneTable {
    pub rows: Vec<IsochroneRow>,
}

impl IsochroneTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one age, in table order.
    pub fn rows_for_age(&self, age: u32) -> impl Iterator<Item = &IsochroneRow> {
        self.rows.iter().filter(move |r| r.age == age)
    }

    /// Row count and `(min, max)` mass for every age present.
    pub fn age_summary(&self) -> BTreeMap<u32, (usize, f64, f64)> {
        let mut summary: BTreeMap<u32, (usize, f64, f64)> = BTreeMap::new();
        for row in &self.rows {
            let entry = summary
                .entry(row.age)
                .or_insert((0, f64::INFINITY, f64::NEG_INFINITY));
            entry.0 += 1;
            entry.1 = entry.1.min(row.mass);
            entry.2 = entry.2.max(row.mass);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mass: f64, age: u32) -> IsochroneRow {
        IsochroneRow {
            mass,
            mags: [1.0, 2.0, 3.0, 4.0, 5.0],
            age,
        }
    }

    #[test]
    fn sentinel_and_nan_are_not_detections() {
        let mut p = BandPhotometry {
            mag: 24.5,
            snr: 10.0,
            sharpness: 0.0,
            roundness: 0.0,
            crowding: 0.0,
        };
        assert!(p.is_detected());
        p.mag = NON_DETECTION;
        assert!(!p.is_detected());
        p.mag = 120.0;
        assert!(!p.is_detected());
        p.mag = f64::NAN;
        assert!(!p.is_detected());
    }

    #[test]
    fn isochrone_magnitudes_are_looked_up_by_band() {
        let r = row(5.5, 30);
        assert_eq!(r.mag(Band::F275W), 1.0);
        assert_eq!(r.mag(Band::F438W), 3.0);
        assert_eq!(r.mag(Band::F814W), 5.0);
    }

    #[test]
    fn empty_tables() {
        assert!(PhotometryCatalog::default().is_empty());
        assert!(IsochroneTable::default().is_empty());
        assert!(!IsochroneTable { rows: vec![row(5.0, 10)] }.is_empty());
    }

    #[test]
    fn age_summary_counts_rows_and_mass_range() {
        let table = IsochroneTable {
            rows: vec![row(4.5, 10), row(9.0, 10), row(6.0, 20)],
        };
        let summary = table.age_summary();
        assert_eq!(summary[&10], (2, 4.5, 9.0));
        assert_eq!(summary[&20], (1, 6.0, 6.0));
        assert_eq!(table.rows_for_age(10).count(), 2);
        assert_eq!(table.rows_for_age(50).count(), 0);
    }
}
