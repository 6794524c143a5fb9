use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::band::Band;
use super::model::{BandPhotometry, PhotometryCatalog, Star};

// ---------------------------------------------------------------------------
// Catalog layout
// ---------------------------------------------------------------------------

// Offsets of the quality columns relative to a band's magnitude column.
const SNR_OFFSET: usize = 1;
const SHARP_OFFSET: usize = 2;
const ROUND_OFFSET: usize = 3;
const CROWD_OFFSET: usize = 4;

/// Minimum number of columns a catalog row must have.
pub fn required_columns() -> usize {
    Band::ALL
        .iter()
        .map(|b| b.catalog_column() + CROWD_OFFSET + 1)
        .max()
        .unwrap_or(0)
}

/// Resolve one positional row into named per-band records.
///
/// `cell(i)` returns the value of column `i`, or `None` if the row is too short.
fn star_from_columns(cell: impl Fn(usize) -> Option<f64>) -> Option<Star> {
    let mut bands = [BandPhotometry {
        mag: f64::NAN,
        snr: f64::NAN,
        sharpness: f64::NAN,
        roundness: f64::NAN,
        crowding: f64::NAN,
    }; Band::COUNT];

    for band in Band::ALL {
        let col = band.catalog_column();
        bands[band.index()] = BandPhotometry {
            mag: cell(col)?,
            snr: cell(col + SNR_OFFSET)?,
            sharpness: cell(col + SHARP_OFFSET)?,
            roundness: cell(col + ROUND_OFFSET)?,
            crowding: cell(col + CROWD_OFFSET)?,
        };
    }
    Some(Star { bands })
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a photometry catalog.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – numeric columns, read by position
/// * `.csv`     – header row, then comma-separated values read by position
/// * anything else – whitespace-delimited text (DOLPHOT output), `#` comments
pub fn load_catalog(path: &Path) -> Result<PhotometryCatalog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let catalog = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        _ => load_text(path),
    }
    .with_context(|| format!("loading catalog {}", path.display()))?;

    log::info!("Loaded {} stars from {}", catalog.len(), path.display());
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Whitespace text loader
// ---------------------------------------------------------------------------

fn load_text(path: &Path) -> Result<PhotometryCatalog> {
    let text = std::fs::read_to_string(path).context("reading catalog file")?;
    parse_text(&text)
}

fn parse_text(text: &str) -> Result<PhotometryCatalog> {
    let mut stars = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let content = strip_comment(line);
        if content.trim().is_empty() {
            continue;
        }
        let cells = content
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>()
                    .with_context(|| format!("line {}, column {j}: '{tok}' is not a number", line_no + 1))
            })
            .collect::<Result<Vec<f64>>>()?;

        let star = star_from_columns(|i| cells.get(i).copied()).with_context(|| {
            format!(
                "line {}: {} columns, need at least {}",
                line_no + 1,
                cells.len(),
                required_columns()
            )
        })?;
        stars.push(star);
    }

    Ok(PhotometryCatalog::new(stars))
}

/// Drop everything from the first `#` onwards.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: one header row (names are ignored), columns read by position.
fn load_csv(path: &Path) -> Result<PhotometryCatalog> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut stars = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = record
            .iter()
            .enumerate()
            .map(|(j, tok)| {
                tok.trim()
                    .parse::<f64>()
                    .with_context(|| format!("CSV row {row_no}, column {j}: '{tok}' is not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;

        let star = star_from_columns(|i| cells.get(i).copied()).with_context(|| {
            format!(
                "CSV row {row_no}: {} columns, need at least {}",
                cells.len(),
                required_columns()
            )
        })?;
        stars.push(star);
    }

    Ok(PhotometryCatalog::new(stars))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet catalog whose columns follow the text layout by position.
///
/// Column names are ignored, so files written from a DataFrame with integer
/// column labels (`df.columns = df.columns.astype(str)`) load directly.
fn load_parquet(path: &Path) -> Result<PhotometryCatalog> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut stars = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, &mut stars)?;
    }

    Ok(PhotometryCatalog::new(stars))
}

fn append_batch(batch: &RecordBatch, stars: &mut Vec<Star>) -> Result<()> {
    let needed = required_columns();
    if batch.num_columns() < needed {
        bail!(
            "Parquet file has {} columns, need at least {needed}",
            batch.num_columns()
        );
    }

    let columns = (0..needed)
        .map(|i| extract_f64_column(batch.column(i)).with_context(|| format!("column {i}")))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    for row in 0..batch.num_rows() {
        let star = star_from_columns(|i| columns.get(i).map(|c| c[row]))
            .with_context(|| format!("Row {row}: incomplete"))?;
        stars.push(star);
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

/// Read a Float64 or Float32 column; nulls become NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    if let Some(f64_arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!("column type is {:?}, expected Float64 or Float32", col.data_type())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    /// A row where every cell encodes its own column index, so field mapping is visible.
    fn indexed_row() -> Vec<f64> {
        (0..required_columns()).map(|i| i as f64 + 0.5).collect()
    }

    fn assert_indexed(star: &Star) {
        for band in Band::ALL {
            let c = band.catalog_column() as f64 + 0.5;
            let p = star.band(band);
            assert_eq!(p.mag, c);
            assert_eq!(p.snr, c + 1.0);
            assert_eq!(p.sharpness, c + 2.0);
            assert_eq!(p.roundness, c + 3.0);
            assert_eq!(p.crowding, c + 4.0);
        }
    }

    #[test]
    fn layout_needs_27_columns() {
        assert_eq!(required_columns(), 27);
    }

    #[test]
    fn text_rows_map_to_named_fields() {
        let row: Vec<String> = indexed_row().iter().map(|v| v.to_string()).collect();
        let text = format!("# DOLPHOT output\n\n{}   # trailing note\n", row.join("  "));
        let catalog = parse_text(&text).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_indexed(&catalog.stars[0]);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let mut row = indexed_row();
        row.extend([1.0, 2.0, 3.0]);
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        let catalog = parse_text(&line.join(" ")).unwrap();
        assert_indexed(&catalog.stars[0]);
    }

    #[test]
    fn short_text_row_is_an_error() {
        let err = parse_text("1 2 3 4 5\n").unwrap_err();
        assert!(format!("{err:#}").contains("need at least 27"));
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        let mut cells: Vec<String> = indexed_row().iter().map(|v| v.to_string()).collect();
        cells[4] = "abc".into();
        assert!(parse_text(&cells.join(" ")).is_err());
    }

    #[test]
    fn csv_catalog_loads_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phot.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        let header: Vec<String> = (0..required_columns()).map(|i| format!("c{i}")).collect();
        writeln!(f, "{}", header.join(",")).unwrap();
        let row: Vec<String> = indexed_row().iter().map(|v| v.to_string()).collect();
        writeln!(f, "{}", row.join(",")).unwrap();
        writeln!(f, "{}", row.join(",")).unwrap();
        drop(f);

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_indexed(&catalog.stars[1]);
    }

    #[test]
    fn parquet_catalog_loads_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phot.parquet");

        let n = required_columns();
        let fields: Vec<Field> = (0..n)
            .map(|i| Field::new(format!("{i}"), DataType::Float64, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let arrays: Vec<Arc<dyn Array>> = (0..n)
            .map(|i| Arc::new(Float64Array::from(vec![i as f64 + 0.5, i as f64 + 0.5])) as Arc<dyn Array>)
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_indexed(&catalog.stars[0]);
    }

    #[test]
    fn parquet_with_too_few_columns_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("0", DataType::Float64, false)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Float64Array::from(vec![1.0])) as Arc<dyn Array>],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert!(load_catalog(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_catalog(Path::new("/nonexistent/phot.dat")).is_err());
    }
}
