use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SERIES: [&str; 5] = ["the", "ghes", "ppp", "oop", "dah"];
const BOUNDS: [&str; 3] = ["mean", "lower", "upper"];

/// Deterministic noise source (splitmix64), so reruns write identical files.
struct Noise(u64);

impl Noise {
    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Standard normal draw scaled by `sigma` (Box-Muller).
    fn jitter(&mut self, sigma: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Spending profile of one synthetic location.
struct Profile {
    name: &'static str,
    /// THE in 1995, currency units.
    base: f64,
    annual_growth: f64,
    /// Shares of GHES, PPP, OOP.
    shares: [f64; 3],
    /// `None` leaves the DAH cells empty, as for high-income countries.
    dah_share: Option<f64>,
    years: std::ops::RangeInclusive<i64>,
}

/// One output row: location, year, then 15 value cells.
struct Row {
    location: &'static str,
    year: i64,
    values: [Option<f64>; 15],
}

fn profiles() -> Vec<Profile> {
    vec![
        Profile {
            name: "Canada",
            base: 60e9,
            annual_growth: 0.045,
            shares: [0.70, 0.13, 0.15],
            dah_share: None,
            years: 1995..=2021,
        },
        Profile {
            name: "Kenya",
            base: 1.1e9,
            annual_growth: 0.07,
            shares: [0.38, 0.08, 0.26],
            dah_share: Some(0.22),
            years: 1995..=2021,
        },
        Profile {
            name: "Peru",
            base: 3.5e9,
            annual_growth: 0.06,
            shares: [0.55, 0.10, 0.33],
            dah_share: Some(0.01),
            years: 1995..=2021,
        },
        Profile {
            name: "United States of America",
            base: 1.0e12,
            annual_growth: 0.05,
            shares: [0.50, 0.38, 0.11],
            dah_share: None,
            years: 1995..=2021,
        },
        // Single reported year: exercises the growth-rate fallback.
        Profile {
            name: "Tokelau",
            base: 4e6,
            annual_growth: 0.0,
            shares: [0.80, 0.0, 0.05],
            dah_share: Some(0.15),
            years: 2015..=2015,
        },
    ]
}

fn generate(noise: &mut Noise) -> Vec<Row> {
    let mut rows = Vec::new();
    for p in profiles() {
        for year in p.years.clone() {
            let t = (year - 1995) as f64;
            let the = p.base * (1.0 + p.annual_growth).powf(t) * (1.0 + noise.jitter(0.02));

            let mut means = [Some(the), None, None, None, None];
            for (slot, share) in means[1..4].iter_mut().zip(p.shares) {
                *slot = Some(the * share);
            }
            means[4] = p.dah_share.map(|s| the * s);

            let mut values = [None; 15];
            for (i, mean) in means.iter().enumerate() {
                let Some(mean) = *mean else { continue };
                let spread = 0.05 + 0.10 * noise.uniform();
                values[i * 3] = Some(mean);
                values[i * 3 + 1] = Some(mean * (1.0 - spread));
                values[i * 3 + 2] = Some(mean * (1.0 + spread));
            }
            rows.push(Row {
                location: p.name,
                year,
                values,
            });
        }
    }
    rows
}

fn column_names() -> Vec<String> {
    SERIES
        .iter()
        .flat_map(|s| BOUNDS.iter().map(move |b| format!("{s}_total_{b}")))
        .collect()
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    let mut header = vec!["location_name".to_string(), "year".to_string()];
    header.extend(column_names());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.location.to_string(), row.year.to_string()];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|x| format!("{x:.2}")).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let mut fields = vec![
        Field::new("location_name", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.location).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
    ];
    for (i, name) in column_names().into_iter().enumerate() {
        fields.push(Field::new(name, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.values[i]).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let rows = generate(&mut Noise(42));

    let csv_path = "sample_health_spending.csv";
    let parquet_path = "sample_health_spending.parquet";
    write_csv(csv_path, &rows)?;
    write_parquet(parquet_path, &rows)?;

    println!(
        "Wrote {} rows for {} locations to {csv_path} and {parquet_path}",
        rows.len(),
        profiles().len()
    );
    Ok(())
}
