use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const DISTANCE_MODULUS: f64 = 29.6;
const AGES: [u32; 5] = [10, 20, 30, 40, 50];
const BANDS: [&str; 5] = ["F275W", "F336W", "F438W", "F555W", "F814W"];
/// Isochrone header names for the bands (Padova labels the first one oddly).
const ISO_NAMES: [&str; 5] = ["F275Wmag1", "F336Wmag", "F438Wmag", "F555Wmag", "F814Wmag"];
/// Faintest apparent magnitude detected per band.
const DETECTION_LIMIT: [f64; 5] = [26.5, 27.0, 28.0, 28.5, 28.0];
/// Magnitude where each band reaches SNR 5.
const SNR5_MAG: [f64; 5] = [25.5, 26.0, 27.0, 27.5, 27.0];
const N_STARS: usize = 6000;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Most massive star still alive at `age` Myr.
fn turnoff_mass(age: u32) -> f64 {
    60.0 * (10.0 / age as f64).powf(0.75)
}

/// Toy absolute magnitudes in the five bands for a star of `mass` at `age`.
fn absolute_mags(mass: f64, age: u32) -> [f64; 5] {
    let lm = mass.log10();
    let mut v = 4.8 - 8.0 * lm;
    let mut c = (0.7 - 0.8 * lm).max(-0.3);

    // Evolved stars near the turnoff swing to the red and brighten.
    let evolved = mass / turnoff_mass(age);
    if evolved > 0.9 {
        let f = (evolved - 0.9) / 0.1;
        c += 1.8 * f;
        v -= 0.8 * f;
    }

    [v + 1.9 * c - 0.8, v + 1.4 * c - 0.6, v + 0.8 * c, v, v - c]
}

fn write_isochrones(dir: &Path) {
    fs::create_dir_all(dir).expect("Failed to create isochrone directory");

    for age in AGES {
        let mut text = String::new();
        text.push_str("# Synthetic isochrone in Padova CMD layout\n");
        text.push_str(&format!("# Age = {age} Myr, Z = 0.0152\n"));
        text.push_str(&format!("Zini logAge Mini Mass {}\n", ISO_NAMES.join(" ")));

        let top = turnoff_mass(age);
        let n = 120;
        for i in 0..n {
            // Log-spaced masses from 0.8 Msun to the turnoff.
            let mass = 0.8 * (top / 0.8).powf(i as f64 / (n - 1) as f64);
            let mags = absolute_mags(mass, age);
            let cols: Vec<String> = mags.iter().map(|m| format!("{m:.4}")).collect();
            text.push_str(&format!(
                "0.0152 {:.4} {mass:.5} {:.5} {}\n",
                (age as f64 * 1e6).log10(),
                mass * 0.98,
                cols.join(" ")
            ));
        }

        let path = dir.join(format!("iso_solar_{age}.txt"));
        fs::write(&path, text).expect("Failed to write isochrone");
    }
}

/// Salpeter-like mass draw between `lo` and `hi`.
fn draw_mass(rng: &mut SimpleRng, lo: f64, hi: f64) -> f64 {
    let a = 1.35;
    let u = rng.next_f64();
    let span = 1.0 - (hi / lo).powf(-a);
    lo * (1.0 - u * span).powf(-1.0 / a)
}

fn main() {
    let mut rng = SimpleRng::new(3344);

    let out_dir = Path::new("sample_data");
    write_isochrones(&out_dir.join("isochrones"));

    // Column layout: x, y, then (mag, snr, sharp, round, crowd) per band.
    let n_cols = 2 + 5 * BANDS.len();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(N_STARS); n_cols];

    for _ in 0..N_STARS {
        let age = AGES[(rng.next_f64() * AGES.len() as f64) as usize % AGES.len()];
        let mass = draw_mass(&mut rng, 3.0, turnoff_mass(age));
        let mut mags = absolute_mags(mass, age);

        // Some sources are blends / background galaxies with arbitrary colours.
        let contaminant = rng.next_f64() < 0.15;
        let artifact = contaminant || rng.next_f64() < 0.05;
        for (band, m) in mags.iter_mut().enumerate() {
            *m += DISTANCE_MODULUS + rng.gauss(0.0, 0.05);
            if contaminant {
                *m += rng.gauss(0.0, 0.8) + 0.3 * band as f64;
            }
        }

        columns[0].push(rng.next_f64() * 4096.0);
        columns[1].push(rng.next_f64() * 4096.0);

        let crowd_base = rng.gauss(0.0, 0.25).abs();
        for (band, &mag) in mags.iter().enumerate() {
            let base = 2 + 5 * band;
            if mag > DETECTION_LIMIT[band] {
                columns[base].push(99.999);
                columns[base + 1].push(0.0);
                columns[base + 2].push(0.0);
                columns[base + 3].push(0.0);
                columns[base + 4].push(0.0);
                continue;
            }
            let snr = 5.0 * 10f64.powf(-0.4 * (mag - SNR5_MAG[band]));
            let (sharp, round) = if artifact {
                (rng.gauss(0.0, 0.5), rng.gauss(0.0, 1.5))
            } else {
                (rng.gauss(0.0, 0.08), rng.gauss(0.0, 0.3))
            };
            columns[base].push((mag * 1000.0).round() / 1000.0);
            columns[base + 1].push((snr * 10.0).round() / 10.0);
            columns[base + 2].push(sharp);
            columns[base + 3].push(round);
            columns[base + 4].push(crowd_base + rng.gauss(0.0, 0.05).abs());
        }
    }

    let fields: Vec<Field> = (0..n_cols)
        .map(|i| Field::new(i.to_string(), DataType::Float64, false))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|c| Arc::new(Float64Array::from(c)) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = out_dir.join("ngc3344_sample.parquet");
    let file = fs::File::create(&output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {N_STARS} stars to {} and {} isochrones to {}",
        output_path.display(),
        AGES.len(),
        out_dir.join("isochrones").display()
    );
    println!(
        "Try: cargo run -- --catalog {} --isochrone-dir {}",
        output_path.display(),
        out_dir.join("isochrones").display()
    );
}
