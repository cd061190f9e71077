use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::{LoadError, ParseError};
use super::model::{Cell, Column, Dataset, LoadReport, Record};

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// What to do with a row whose fields cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Log the row, count it in the [`LoadReport`] and keep going.
    #[default]
    Skip,
    /// Fail the whole load on the first bad row.
    Abort,
}

/// Records priced at or below this are treated as data-entry errors.
pub const DEFAULT_MIN_PRICE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Exclusive lower price bound: a record is kept iff `price > min_price`.
    pub min_price: f64,
    pub on_invalid_row: RowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            min_price: DEFAULT_MIN_PRICE,
            on_invalid_row: RowPolicy::Skip,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a housing dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one sale per line (recommended)
/// * `.json`    – `[{ "date": "...", "price": 313000, ... }, ...]`
/// * `.parquet` – one column per field, as written by Pandas or Polars
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    // A missing source is reported as such whatever its extension.
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::SourceNotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut collector = Collector::new(options);
    match ext.as_str() {
        "csv" => read_csv(file, &mut collector)?,
        "json" => read_json(file, &mut collector)?,
        "parquet" | "pq" => read_parquet(file, &mut collector)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    }

    let dataset = collector.finish();
    let report = dataset.report();
    log::info!(
        "Loaded {} records from {} ({} rows read, {} unparseable, {} at or below ${})",
        dataset.len(),
        path.display(),
        report.rows_read,
        report.rows_skipped,
        report.rows_below_min_price,
        options.min_price,
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row collection: parse policy + price cleaning
// ---------------------------------------------------------------------------

struct Collector<'o> {
    options: &'o LoadOptions,
    records: Vec<Record>,
    report: LoadReport,
}

impl<'o> Collector<'o> {
    fn new(options: &'o LoadOptions) -> Self {
        Self {
            options,
            records: Vec::new(),
            report: LoadReport::default(),
        }
    }

    /// Accept one parsed row. `row` is 1-based over data rows.
    fn push(&mut self, row: usize, parsed: Result<Record, ParseError>) -> Result<(), LoadError> {
        self.report.rows_read += 1;
        match parsed {
            Ok(record) if record.price > self.options.min_price => self.records.push(record),
            Ok(_) => self.report.rows_below_min_price += 1,
            Err(source) => match self.options.on_invalid_row {
                RowPolicy::Abort => return Err(LoadError::Parse { row, source }),
                RowPolicy::Skip => {
                    log::warn!("Skipping row {row}: {source}");
                    self.report.rows_skipped += 1;
                }
            },
        }
        Ok(())
    }

    fn finish(self) -> Dataset {
        Dataset::with_report(self.records, self.report)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, extra columns are ignored.
fn read_csv(file: File, out: &mut Collector<'_>) -> Result<(), LoadError> {
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader.headers()?.clone();

    let mut positions = [0usize; Column::ALL.len()];
    for col in Column::ALL {
        positions[col.index()] = headers
            .iter()
            .position(|h| h.trim() == col.name())
            .ok_or(LoadError::MissingColumn(col.name()))?;
    }

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let parsed = match result {
            Ok(record) => Record::from_cells(|col| {
                record
                    .get(positions[col.index()])
                    .map(Cell::Text)
                    .unwrap_or(Cell::Null)
            }),
            // A structurally broken line (e.g. wrong field count) falls
            // under the row policy like any other unparseable row.
            Err(e) if !e.is_io_error() => Err(ParseError::Malformed(e.to_string())),
            Err(e) => return Err(e.into()),
        };
        out.push(row, parsed)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
fn read_json(file: File, out: &mut Collector<'_>) -> Result<(), LoadError> {
    let root: JsonValue = serde_json::from_reader(BufReader::new(file))?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::JsonLayout("expected a top-level array".into()))?;

    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        if let Some(col) = Column::ALL.iter().find(|c| !first.contains_key(c.name())) {
            return Err(LoadError::MissingColumn(col.name()));
        }
    }

    for (i, rec) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::JsonLayout(format!("row {row} is not an object")))?;
        let parsed = Record::from_cells(|col| json_to_cell(obj.get(col.name())));
        out.push(row, parsed)?;
    }
    Ok(())
}

fn json_to_cell(val: Option<&JsonValue>) -> Cell<'_> {
    match val {
        Some(JsonValue::String(s)) => Cell::Text(s),
        Some(JsonValue::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
        Some(JsonValue::Bool(b)) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        _ => Cell::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn read_parquet(file: File, out: &mut Collector<'_>) -> Result<(), LoadError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut row = 0;
    for batch in reader {
        let batch = batch?;
        let columns = batch_columns(&batch)?;
        for i in 0..batch.num_rows() {
            row += 1;
            let parsed = Record::from_cells(|col| arrow_cell(columns[col.index()].as_ref(), i));
            out.push(row, parsed)?;
        }
    }
    Ok(())
}

/// Locate every required column in a record batch, in [`Column::ALL`] order.
/// A column whose Arrow type [`arrow_cell`] cannot read fails the load.
fn batch_columns(batch: &RecordBatch) -> Result<Vec<Arc<dyn Array>>, LoadError> {
    let schema = batch.schema();
    Column::ALL
        .iter()
        .map(|col| {
            let idx = schema
                .index_of(col.name())
                .map_err(|_| LoadError::MissingColumn(col.name()))?;
            let array = batch.column(idx).clone();
            if !is_readable(array.data_type()) {
                return Err(LoadError::UnsupportedColumnType {
                    column: col.name(),
                    data_type: array.data_type().to_string(),
                });
            }
            Ok(array)
        })
        .collect()
}

fn is_readable(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Utf8View
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
            | DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(_, _)
    )
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &dyn Array, row: usize) -> Cell<'_> {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row)),
        DataType::Utf8View => Cell::Text(col.as_string_view().value(row)),
        DataType::Int8 => Cell::Number(col.as_primitive::<Int8Type>().value(row) as f64),
        DataType::Int16 => Cell::Number(col.as_primitive::<Int16Type>().value(row) as f64),
        DataType::Int32 => Cell::Number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Cell::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::UInt8 => Cell::Number(col.as_primitive::<UInt8Type>().value(row) as f64),
        DataType::UInt16 => Cell::Number(col.as_primitive::<UInt16Type>().value(row) as f64),
        DataType::UInt32 => Cell::Number(col.as_primitive::<UInt32Type>().value(row) as f64),
        DataType::UInt64 => Cell::Number(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => Cell::Number(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Number(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Number(if col.as_boolean().value(row) { 1.0 } else { 0.0 }),
        DataType::Date32 => date_cell(col.as_primitive::<Date32Type>().value_as_date(row)),
        DataType::Date64 => date_cell(col.as_primitive::<Date64Type>().value_as_date(row)),
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
                TimeUnit::Millisecond => {
                    col.as_primitive::<TimestampMillisecondType>().value_as_datetime(row)
                }
                TimeUnit::Microsecond => {
                    col.as_primitive::<TimestampMicrosecondType>().value_as_datetime(row)
                }
                TimeUnit::Nanosecond => {
                    col.as_primitive::<TimestampNanosecondType>().value_as_datetime(row)
                }
            };
            date_cell(datetime.map(|dt| dt.date()))
        }
        // Rejected up front by `batch_columns`.
        _ => Cell::Null,
    }
}

fn date_cell<'a>(date: Option<chrono::NaiveDate>) -> Cell<'a> {
    date.map(Cell::Date).unwrap_or(Cell::Null)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{
        ArrayRef, BooleanArray, Date32Array, Decimal128Array, Float64Array, Int16Array,
        Int64Array, StringArray, UInt32Array,
    };
    use arrow::datatypes::{Field, Schema};
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const HEADER: &str = "date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,view,condition,yr_built,street,city,statezip,country";

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn csv_with_rows(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s.push('\n');
        s
    }

    const SHORELINE: &str = "2014-05-02 00:00:00,313000.0,3.0,1.5,1340,7912,1.5,0,0,3,1955,18810 Densmore Ave N,Shoreline,WA 98133,USA";
    const SEATTLE: &str = "2014-05-02 00:00:00,2384000.0,5.0,2.5,3650,9050,2.0,0,4,5,1921,709 W Blaine St,Seattle,WA 98119,USA";
    const ZERO_PRICE: &str = "2014-05-03 00:00:00,0.0,3.0,2.0,1930,11947,1.0,0,0,4,1966,26206 SE 183rd St,Kent,WA 98042,USA";
    const BAD_DATE: &str = "someday,420000.0,3.0,2.25,2000,8030,1.0,0,0,4,1963,857 170th Pl NE,Bellevue,WA 98008,USA";

    #[test]
    fn loads_csv_and_applies_price_threshold() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "houses.csv", &csv_with_rows(&[SHORELINE, SEATTLE, ZERO_PRICE]));

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].city, "Shoreline");
        assert_eq!(ds.records()[1].city, "Seattle");
        assert_eq!(
            ds.report(),
            LoadReport {
                rows_read: 3,
                rows_skipped: 0,
                rows_below_min_price: 1,
            }
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let at_threshold = SHORELINE.replace("313000.0", "1000.0");
        let just_above = SHORELINE.replace("313000.0", "1000.5");
        let path = write_file(&dir, "edge.csv", &csv_with_rows(&[&at_threshold, &just_above]));

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].price, 1000.5);
    }

    #[test]
    fn skip_policy_drops_unparseable_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", &csv_with_rows(&[SHORELINE, BAD_DATE, SEATTLE]));

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.report().rows_skipped, 1);
    }

    #[test]
    fn abort_policy_fails_on_first_bad_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.csv", &csv_with_rows(&[SHORELINE, BAD_DATE, SEATTLE]));
        let options = LoadOptions {
            on_invalid_row: RowPolicy::Abort,
            ..LoadOptions::default()
        };

        match load_file(&path, &options) {
            Err(LoadError::Parse { row, source }) => {
                assert_eq!(row, 2);
                assert!(matches!(source, ParseError::InvalidDate { .. }));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        match load_file(&path, &LoadOptions::default()) {
            Err(LoadError::SourceNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected SourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_wins_over_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("houses.txt");
        match load_file(&path, &LoadOptions::default()) {
            Err(LoadError::SourceNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected SourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_aborts_even_when_skipping() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "short.csv", "date,price,city\n2014-05-02,313000,Seattle\n");
        assert!(matches!(
            load_file(&path, &LoadOptions::default()),
            Err(LoadError::MissingColumn("bedrooms"))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "houses.xlsx", "");
        assert!(matches!(
            load_file(&path, &LoadOptions::default()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_json_records() {
        let dir = TempDir::new().unwrap();
        let json = r#"[
            {"date": "2014-06-10", "price": 550000, "city": "Redmond", "bedrooms": 4,
             "bathrooms": 2.5, "sqft_living": 2400, "sqft_lot": 9000, "floors": 2,
             "condition": 3, "waterfront": false, "yr_built": 1987},
            {"date": "2014-06-11", "price": 500, "city": "Kent", "bedrooms": 2,
             "bathrooms": 1, "sqft_living": 900, "sqft_lot": 5000, "floors": 1,
             "condition": 2, "waterfront": true, "yr_built": 1940}
        ]"#;
        let path = write_file(&dir, "houses.json", json);

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records()[0];
        assert_eq!(rec.city, "Redmond");
        assert_eq!(rec.bedrooms, 4);
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2014, 6, 10).unwrap());
        assert_eq!(ds.report().rows_below_min_price, 1);
    }

    #[test]
    fn loads_parquet_with_typed_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("houses.parquet");

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let day = |y, m, d| (NaiveDate::from_ymd_opt(y, m, d).unwrap() - epoch).num_days() as i32;

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
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![day(2014, 7, 1), day(2014, 7, 2)])),
                Arc::new(Float64Array::from(vec![640000.0, 720000.0])),
                Arc::new(StringArray::from(vec!["Kirkland", "Bothell"])),
                Arc::new(Int64Array::from(vec![3, 4])),
                Arc::new(Float64Array::from(vec![2.0, 2.75])),
                Arc::new(Int64Array::from(vec![1800, 2600])),
                Arc::new(Int64Array::from(vec![7000, 8100])),
                Arc::new(Float64Array::from(vec![1.0, 2.0])),
                Arc::new(Int64Array::from(vec![4, 3])),
                Arc::new(BooleanArray::from(vec![false, true])),
                Arc::new(Int64Array::from(vec![1978, 2004])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].city, "Bothell");
        assert_eq!(ds.records()[1].date, NaiveDate::from_ymd_opt(2014, 7, 2).unwrap());
        assert!(ds.records()[1].waterfront);
        assert_eq!(ds.records()[0].sqft_living, 1800);
    }

    /// One-row Parquet file; `price` and `bedrooms` use the given Arrow columns.
    fn single_sale_parquet(
        dir: &TempDir,
        price: (DataType, ArrayRef),
        bedrooms: (DataType, ArrayRef),
    ) -> std::path::PathBuf {
        let path = dir.path().join("narrow.parquet");
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let day = (NaiveDate::from_ymd_opt(2014, 8, 4).unwrap() - epoch).num_days() as i32;

        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("price", price.0, false),
            Field::new("city", DataType::Utf8, false),
            Field::new("bedrooms", bedrooms.0, false),
            Field::new("bathrooms", DataType::Float64, false),
            Field::new("sqft_living", DataType::UInt32, false),
            Field::new("sqft_lot", DataType::Int64, false),
            Field::new("floors", DataType::Float64, false),
            Field::new("condition", DataType::Int16, false),
            Field::new("waterfront", DataType::Boolean, false),
            Field::new("yr_built", DataType::Int16, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from(vec![day])),
            price.1,
            Arc::new(StringArray::from(vec!["Issaquah"])),
            bedrooms.1,
            Arc::new(Float64Array::from(vec![2.5])),
            Arc::new(UInt32Array::from(vec![2_150])),
            Arc::new(Int64Array::from(vec![9_800])),
            Arc::new(Float64Array::from(vec![2.0])),
            Arc::new(Int16Array::from(vec![4])),
            Arc::new(BooleanArray::from(vec![false])),
            Arc::new(Int16Array::from(vec![1994])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn loads_parquet_with_narrow_integer_columns() {
        let dir = TempDir::new().unwrap();
        let path = single_sale_parquet(
            &dir,
            (DataType::Float64, Arc::new(Float64Array::from(vec![615_000.0]))),
            (DataType::Int16, Arc::new(Int16Array::from(vec![3]))),
        );

        let ds = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records()[0];
        assert_eq!(rec.bedrooms, 3);
        assert_eq!(rec.sqft_living, 2_150);
        assert_eq!(rec.condition, 4);
        assert_eq!(rec.yr_built, 1994);
    }

    #[test]
    fn unreadable_parquet_type_fails_the_load() {
        let dir = TempDir::new().unwrap();
        let decimal = Decimal128Array::from(vec![61_500_000])
            .with_precision_and_scale(12, 2)
            .unwrap();
        let path = single_sale_parquet(
            &dir,
            (DataType::Decimal128(12, 2), Arc::new(decimal)),
            (DataType::Int16, Arc::new(Int16Array::from(vec![3]))),
        );

        match load_file(&path, &LoadOptions::default()) {
            Err(LoadError::UnsupportedColumnType { column, .. }) => assert_eq!(column, "price"),
            other => panic!("expected UnsupportedColumnType, got {other:?}"),
        }
    }
}
