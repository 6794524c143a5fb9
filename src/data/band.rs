use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Band – the five WFC3/UVIS filters of the NGC 3344 imaging
// ---------------------------------------------------------------------------

/// A photometric band, ordered blue to red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    F275W,
    F336W,
    F438W,
    F555W,
    F814W,
}

/// Catalog magnitude column for each band, indexed by `Band as usize`.
const CATALOG_COLUMNS: [usize; Band::COUNT] = [2, 7, 12, 17, 22];

/// Isochrone table magnitude column for each band (column 0 holds the mass).
const ISOCHRONE_COLUMNS: [usize; Band::COUNT] = [1, 2, 3, 4, 5];

const LABELS: [&str; Band::COUNT] = ["F275W", "F336W", "F438W", "F555W", "F814W"];

impl Band {
    pub const COUNT: usize = 5;

    pub const ALL: [Band; Band::COUNT] = [
        Band::F275W,
        Band::F336W,
        Band::F438W,
        Band::F555W,
        Band::F814W,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column of this band's magnitude in the raw photometry catalog.
    pub fn catalog_column(self) -> usize {
        CATALOG_COLUMNS[self.index()]
    }

    /// Column of this band's magnitude in the assembled isochrone table.
    pub fn isochrone_column(self) -> usize {
        ISOCHRONE_COLUMNS[self.index()]
    }

    pub fn label(self) -> &'static str {
        LABELS[self.index()]
    }

    /// Bands offered for the blue side of the color: everything but the reddest.
    pub fn blue_choices() -> &'static [Band] {
        &Band::ALL[..Band::COUNT - 1]
    }

    /// Bands offered for the red side of the color: everything but the bluest.
    pub fn red_choices() -> &'static [Band] {
        &Band::ALL[1..]
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown band '{0}', expected one of F275W, F336W, F438W, F555W, F814W")]
pub struct UnknownBand(pub String);

impl FromStr for Band {
    type Err = UnknownBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Band::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownBand(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// BandPair – the (blue, red) selection that defines a CMD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPair {
    pub blue: Band,
    pub red: Band,
}

impl Default for BandPair {
    fn default() -> Self {
        Self {
            blue: Band::F555W,
            red: Band::F814W,
        }
    }
}

impl BandPair {
    pub fn new(blue: Band, red: Band) -> Self {
        Self { blue, red }
    }

    /// `(blue, red)` magnitude columns in the photometry catalog.
    pub fn catalog_columns(self) -> (usize, usize) {
        (self.blue.catalog_column(), self.red.catalog_column())
    }

    /// `(blue, red)` magnitude columns in the isochrone table.
    pub fn isochrone_columns(self) -> (usize, usize) {
        (self.blue.isochrone_column(), self.red.isochrone_column())
    }

    /// X-axis label, e.g. `F555W-F814W`.
    pub fn color_label(self) -> String {
        format!("{}-{}", self.blue, self.red)
    }

    /// Y-axis label: the red band.
    pub fn magnitude_label(self) -> &'static str {
        self.red.label()
    }
}
