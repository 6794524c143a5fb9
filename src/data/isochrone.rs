use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::band::Band;
use super::loader::strip_comment;
use super::model::{ISOCHRONE_AGES, IsochroneRow, IsochroneTable};

// ---------------------------------------------------------------------------
// Padova isochrone files → one table
// ---------------------------------------------------------------------------

/// Name of the initial-mass column in Padova output.
pub const MASS_COLUMN: &str = "Mini";

/// Only stars heavier than this (solar masses) are kept.
pub const MIN_INITIAL_MASS: f64 = 4.0;

/// Magnitude column names for the five bands in Padova WFC3/UVIS output.
pub const DEFAULT_MAG_COLUMNS: [&str; Band::COUNT] =
    ["F275Wmag1", "F336Wmag", "F438Wmag", "F555Wmag", "F814Wmag"];

/// `<dir>/iso_<name>_<age>.txt`
pub fn age_file(dir: &Path, name: &str, age: u32) -> PathBuf {
    dir.join(format!("iso_{name}_{age}.txt"))
}

/// `<dir>/iso_<name>_all.txt`, where the assembled table is saved.
pub fn combined_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("iso_{name}_all.txt"))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Assemble the per-age isochrones of one population into a single table.
///
/// `mag_columns` names the magnitude column of every band, in band order; its
/// length is the number of bands and must be five. Every age in
/// [`ISOCHRONE_AGES`] must have a file; any missing file or column aborts the load.
pub fn load_isochrones<S: AsRef<str>>(
    dir: &Path,
    name: &str,
    mag_columns: &[S],
) -> Result<IsochroneTable> {
    if mag_columns.len() != Band::COUNT {
        bail!(
            "expected {} magnitude columns, got {}",
            Band::COUNT,
            mag_columns.len()
        );
    }

    let mut table = IsochroneTable::default();

    for age in ISOCHRONE_AGES {
        let path = age_file(dir, name, age);
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading isochrone {}", path.display()))?;
        let block = parse_age_block(&text, age, mag_columns)
            .with_context(|| format!("parsing isochrone {}", path.display()))?;
        log::debug!("{}: {} rows above {MIN_INITIAL_MASS} Msun", path.display(), block.len());
        table.rows.extend(block);
    }

    log::info!(
        "Assembled {} isochrone rows for population '{name}' from {}",
        table.len(),
        dir.display()
    );
    Ok(table)
}

/// Parse one isochrone file: comments stripped, first line is the header.
fn parse_age_block<S: AsRef<str>>(
    text: &str,
    age: u32,
    mag_columns: &[S],
) -> Result<Vec<IsochroneRow>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, strip_comment(l)))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().context("no header line")?;
    let names: Vec<&str> = header.split_whitespace().collect();
    let position = |wanted: &str| {
        names
            .iter()
            .position(|n| *n == wanted)
            .with_context(|| format!("missing column '{wanted}'"))
    };

    let mass_idx = position(MASS_COLUMN)?;
    let mut mag_idx = [0usize; Band::COUNT];
    for (slot, col) in mag_idx.iter_mut().zip(mag_columns) {
        *slot = position(col.as_ref())?;
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split_whitespace().collect();
        let value = |idx: usize| -> Result<f64> {
            let tok = cells
                .get(idx)
                .with_context(|| format!("line {line_no}: only {} columns", cells.len()))?;
            tok.parse::<f64>()
                .with_context(|| format!("line {line_no}: '{tok}' is not a number"))
        };

        let mass = value(mass_idx)?;
        if !(mass > MIN_INITIAL_MASS) {
            continue;
        }
        let mut mags = [0.0; Band::COUNT];
        for (mag, &idx) in mags.iter_mut().zip(&mag_idx) {
            *mag = round3(value(idx)?);
        }
        rows.push(IsochroneRow {
            mass: round3(mass),
            mags,
            age,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Space-delimited table file
// ---------------------------------------------------------------------------

/// Write the table as `mass mag1..mag5 age`, space-delimited, no header or index.
pub fn save_isochrones(table: &IsochroneTable, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(Band::COUNT + 2);
        record.push(format!("{:.3}", row.mass));
        record.extend(row.mags.iter().map(|m| format!("{m:.3}")));
        record.push(row.age.to_string());
        writer.write_record(&record).context("writing isochrone row")?;
    }
    writer.flush().context("flushing isochrone table")?;

    log::info!("Saved {} isochrone rows to {}", table.len(), path.display());
    Ok(())
}

/// Read back a table written by [`save_isochrones`].
///
/// Any run of whitespace separates columns, so hand-edited or tab-separated
/// copies of the table load as well.
pub fn read_isochrone_table(path: &Path) -> Result<IsochroneTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut table = IsochroneTable::default();
    let lines = text
        .lines()
        .map(strip_comment)
        .filter(|l| !l.trim().is_empty());
    for (row_no, line) in lines.enumerate() {
        let cells = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .with_context(|| format!("row {row_no}: '{tok}' is not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;
        if cells.len() != Band::COUNT + 2 {
            bail!("row {row_no}: {} columns, expected {}", cells.len(), Band::COUNT + 2);
        }

        let tag = cells[Band::COUNT + 1];
        let Some(&age) = ISOCHRONE_AGES.iter().find(|&&a| f64::from(a) == tag) else {
            bail!("row {row_no}: age {tag} is not one of {ISOCHRONE_AGES:?}");
        };
        let mut mags = [0.0; Band::COUNT];
        mags.copy_from_slice(&cells[1..=Band::COUNT]);
        table.rows.push(IsochroneRow {
            mass: cells[0],
            mags,
            age,
        });
    }

    log::info!("Read {} isochrone rows from {}", table.len(), path.display());
    Ok(table)
}
