use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;
use rusty_estate::data::Record;

/// (city, typical price per sqft of living area)
const CITIES: [(&str, f64); 10] = [
    ("Seattle", 310.0),
    ("Bellevue", 360.0),
    ("Redmond", 330.0),
    ("Kirkland", 340.0),
    ("Renton", 210.0),
    ("Kent", 170.0),
    ("Auburn", 160.0),
    ("Issaquah", 290.0),
    ("Shoreline", 240.0),
    ("Mercer Island", 450.0),
];

const FLOORS: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

/// SplitMix64: small, deterministic, good enough for sample data.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[lo, hi]`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range(0, items.len() as u64 - 1) as usize]
    }
}

fn generate(n: usize, first_day: NaiveDate, rng: &mut SplitMix) -> Vec<Record> {
    (0..n)
        .map(|_| {
            let &(city, per_sqft) = rng.pick(&CITIES);
            let bedrooms = rng.range(1, 6) as u32;
            let sqft_living = (450 * bedrooms as u64 + rng.range(0, 900)) as u32;
            let condition = rng.range(1, 5) as u8;
            let waterfront = rng.unit() < 0.02;

            let mut price = per_sqft * sqft_living as f64;
            price *= 0.85 + 0.075 * condition as f64;
            price *= 0.8 + 0.4 * rng.unit();
            if waterfront {
                price *= 1.8;
            }

            Record {
                date: first_day + Days::new(rng.range(0, 69)),
                price: (price / 100.0).round() * 100.0,
                city: city.to_string(),
                bedrooms,
                bathrooms: (bedrooms as f64 * 0.75 + rng.range(0, 4) as f64 * 0.25).max(1.0),
                sqft_living,
                sqft_lot: rng.range(1_000, 20_000) as u32,
                floors: *rng.pick(&FLOORS),
                condition,
                waterfront,
                yr_built: rng.range(1900, 2014) as i32,
            }
        })
        .collect()
}

fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for rec in records {
        writer.serialize(rec).context("writing CSV row")?;
    }
    // Rows the loader is expected to drop: a zero price and an unreadable date.
    writer.write_record([
        "2014-06-01", "0.0", "Kent", "3", "2.0", "1500", "7000", "1.0", "3", "false", "1978",
    ])?;
    writer.write_record([
        "not-a-date", "450000.0", "Renton", "3", "2.0", "1600", "6500", "1.0", "3", "false", "1990",
    ])?;
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn ints(records: &[Record], f: fn(&Record) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(records.iter().map(f).collect::<Vec<_>>()))
}

fn floats(records: &[Record], f: fn(&Record) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(path: &Path, records: &[Record]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("building epoch date")?;
    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("price", DataType::Float64, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("bedrooms", DataType::Int64, false),
        Field::new("bathrooms", DataType::Float64, false),
        Field::new("sqft_living", DataType::Int64, false),
        Field::new("sqft_lot", DataType::Int64, false),
        Field::new("floors", DataType::Float64, false),
        Field::new("condition", DataType::Int64, false),
        Field::new("waterfront", DataType::Boolean, false),
        Field::new("yr_built", DataType::Int64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(
            records
                .iter()
                .map(|r| (r.date - epoch).num_days() as i32)
                .collect::<Vec<_>>(),
        )),
        floats(records, |r| r.price),
        Arc::new(StringArray::from(
            records.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
        )),
        ints(records, |r| r.bedrooms as i64),
        floats(records, |r| r.bathrooms),
        ints(records, |r| r.sqft_living as i64),
        ints(records, |r| r.sqft_lot as i64),
        floats(records, |r| r.floors),
        ints(records, |r| r.condition as i64),
        Arc::new(BooleanArray::from(
            records.iter().map(|r| r.waterfront).collect::<Vec<_>>(),
        )),
        ints(records, |r| r.yr_built as i64),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut rng = SplitMix(42);
    let first_day = NaiveDate::from_ymd_opt(2014, 5, 2).context("building start date")?;
    let records = generate(2_000, first_day, &mut rng);

    let csv_path = out_dir.join("data_house_price.csv");
    write_csv(&csv_path, &records)?;
    log::info!("Wrote {} records to {}", records.len(), csv_path.display());

    let parquet_path = out_dir.join("data_house_price.parquet");
    write_parquet(&parquet_path, &records)?;
    log::info!("Wrote {} records to {}", records.len(), parquet_path.display());

    println!(
        "Generated {} sample sales in {} (CSV + Parquet)",
        records.len(),
        out_dir.display()
    );
    Ok(())
}
