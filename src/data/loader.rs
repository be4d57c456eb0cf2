use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{REQUIRED_COLUMNS, SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

/// The table does not honour the fixed column contract.
///
/// Rows are numbered from 1, counting data rows only (a CSV header is not a row).
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: column '{column}' has invalid {expected} value '{value}'")]
    InvalidCell {
        row: usize,
        column: &'static str,
        expected: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the required columns (recommended)
/// * `.json`    – `[{ "OrderID": ..., "Tanggal_Pesanan": ..., ... }, ...]`
/// * `.parquet` – one column per required field, any castable type
pub fn load_file(path: &Path) -> Result<SalesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    if dataset.unparsed_dates > 0 {
        log::warn!(
            "{}: {} row(s) have an unparseable '{}' and are skipped by date filters",
            path.display(),
            dataset.unparsed_dates,
            super::model::COL_ORDER_DATE
        );
    }
    Ok(dataset)
}

/// Positions of [`REQUIRED_COLUMNS`] within a header row.
fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> Result<[usize; 8], SchemaError> {
    let mut positions = [0usize; 8];
    let mut missing = Vec::new();
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers
            .iter()
            .position(|h| h.as_ref().trim_start_matches('\u{feff}').trim() == name)
        {
            Some(i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(SchemaError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse an order date, dropping any time-of-day part.
/// Returns `None` for anything unrecognised, including empty cells.
pub fn parse_order_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_quantity(row: usize, s: &str) -> Result<i64, SchemaError> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    // Pandas-written tables often store integer columns as `2.0`.
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(SchemaError::InvalidCell {
            row,
            column: super::model::COL_QUANTITY,
            expected: "integer",
            value: s.to_string(),
        }),
    }
}

fn parse_amount(row: usize, s: &str) -> Result<f64, SchemaError> {
    let s = s.trim();
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(SchemaError::InvalidCell {
            row,
            column: super::model::COL_TOTAL,
            expected: "numeric",
            value: s.to_string(),
        }),
    }
}

/// Build one record from cells ordered like [`REQUIRED_COLUMNS`].
/// `row` is the 1-based data row used in error messages.
fn parse_record(row: usize, cells: [&str; 8]) -> Result<SalesRecord, SchemaError> {
    let [order_id, date, region, category, product, quantity, total, payment] = cells;
    Ok(SalesRecord {
        order_id: order_id.trim().to_string(),
        order_date: parse_order_date(date),
        region: region.trim().to_string(),
        category: category.trim().to_string(),
        product: product.trim().to_string(),
        quantity: parse_quantity(row, quantity)?,
        total: parse_amount(row, total)?,
        payment_method: payment.trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one order line per row.
/// Columns beyond the required ones are ignored.
fn load_csv(path: &Path) -> Result<SalesDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let positions = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row_no = i + 1;
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = positions.map(|i| row.get(i).unwrap_or(""));
        records.push(parse_record(row_no, cells)?);
    }

    Ok(SalesDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "OrderID": 1, "Tanggal_Pesanan": "2024-01-01", "Wilayah": "Jakarta", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SalesDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let obj = row
            .as_object()
            .with_context(|| format!("Row {row_no} is not a JSON object"))?;

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        resolve_columns(&keys).with_context(|| format!("Row {row_no}"))?;

        let texts = REQUIRED_COLUMNS.map(|col| json_to_text(obj.get(col)));
        let cells = texts.each_ref().map(String::as_str);
        records.push(parse_record(row_no, cells)?);
    }

    Ok(SalesDataset::from_records(records))
}

fn json_to_text(val: Option<&JsonValue>) -> String {
    match val {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the sales table.
///
/// Every required column is cast to text and parsed exactly like CSV, so
/// `Date32`, timestamps, integer and float columns written by **Pandas** or
/// **Polars** all work.
fn load_parquet(path: &Path) -> Result<SalesDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // Checked against the file schema so an empty table still has to conform.
    let names: Vec<&str> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    let positions = resolve_columns(&names)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let mut columns: Vec<StringArray> = Vec::with_capacity(positions.len());
        for (&idx, name) in positions.iter().zip(REQUIRED_COLUMNS) {
            let text = cast(batch.column(idx), &DataType::Utf8)
                .with_context(|| format!("casting column '{name}' to text"))?;
            columns.push(text.as_string::<i32>().clone());
        }

        for row in 0..batch.num_rows() {
            let cells: [&str; 8] = std::array::from_fn(|j| {
                let col = &columns[j];
                if col.is_null(row) { "" } else { col.value(row) }
            });
            records.push(parse_record(offset + row + 1, cells)?);
        }
        offset += batch.num_rows();
    }

    Ok(SalesDataset::from_records(records))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str =
        "OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Jumlah,Total_Penjualan,Metode_Pembayaran";

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_date_forms() {
        assert_eq!(parse_order_date("2024-01-31"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_order_date("2024/01/31"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_order_date("31/01/2024"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_order_date("2024-01-31 13:45:00"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_order_date("2024-01-31T13:45:00.250"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_order_date(" 2024-01-31 "), Some(ymd(2024, 1, 31)));
    }

    #[test]
    fn unparseable_dates_become_none() {
        assert_eq!(parse_order_date(""), None);
        assert_eq!(parse_order_date("kemarin"), None);
        assert_eq!(parse_order_date("2024-02-30"), None);
    }

    #[test]
    fn loads_csv_and_keeps_rows_with_bad_dates() {
        let file = write_temp(
            "csv",
            &format!(
                "{HEADER},Catatan\n\
                 1,2024-01-01,Jakarta,Elektronik,Laptop,2,100.5,Kartu Kredit,x\n\
                 2,bukan tanggal,Bandung,Fashion,Kaos,1,50,Tunai,y\n"
            ),
        );

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].order_date, Some(ymd(2024, 1, 1)));
        assert_eq!(ds.records[0].quantity, 2);
        assert_eq!(ds.records[0].total, 100.5);
        assert_eq!(ds.records[0].payment_method, "Kartu Kredit");
        assert_eq!(ds.records[1].order_date, None);
        assert_eq!(ds.unparsed_dates, 1);
        assert_eq!(ds.regions, vec!["Jakarta", "Bandung"]);
    }

    #[test]
    fn columns_may_appear_in_any_order() {
        let file = write_temp(
            "csv",
            "Metode_Pembayaran,Total_Penjualan,Jumlah,Produk,\
             Kategori,Wilayah,Tanggal_Pesanan,OrderID\n\
             Tunai,75,3,Buku,Hobi,Medan,2024-05-05,A-9\n",
        );
        let ds = load_file(file.path()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.order_id, "A-9");
        assert_eq!(rec.region, "Medan");
        assert_eq!(rec.quantity, 3);
        assert_eq!(rec.total, 75.0);
    }

    #[test]
    fn missing_columns_are_fatal() {
        let file = write_temp(
            "csv",
            "OrderID,Tanggal_Pesanan,Wilayah,Produk,Jumlah\n1,2024-01-01,Jakarta,Laptop,1\n",
        );
        let err = load_file(file.path()).unwrap_err();
        let schema = err.downcast_ref::<SchemaError>().unwrap();
        assert_eq!(
            schema,
            &SchemaError::MissingColumns(vec![
                "Kategori".to_string(),
                "Total_Penjualan".to_string(),
                "Metode_Pembayaran".to_string(),
            ])
        );
    }

    #[test]
    fn malformed_numbers_are_fatal() {
        let file = write_temp(
            "csv",
            &format!("{HEADER}\n1,2024-01-01,Jakarta,Elektronik,Laptop,dua,100,Tunai\n"),
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::InvalidCell { row: 1, column: "Jumlah", .. })
        ));
    }

    #[test]
    fn invalid_cells_report_one_based_rows() {
        let file = write_temp(
            "csv",
            &format!(
                "{HEADER}\n\
                 1,2024-01-01,Jakarta,Elektronik,Laptop,1,100,Tunai\n\
                 2,2024-01-02,Jakarta,Elektronik,Laptop,1,seratus,Tunai\n"
            ),
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::InvalidCell { row: 2, column: "Total_Penjualan", .. })
        ));
    }

    #[test]
    fn quantities_beyond_i64_are_rejected() {
        let file = write_temp(
            "csv",
            &format!(
                "{HEADER}\n\
                 1,2024-01-01,Jakarta,Elektronik,Laptop,1e30,100,Tunai\n\
                 2,2024-01-02,Jakarta,Elektronik,Laptop,5,100,Tunai\n"
            ),
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::InvalidCell { row: 1, column: "Jumlah", .. })
        ));

        assert!(parse_quantity(1, "9223372036854775808.0").is_err());
        assert!(parse_quantity(1, "-1e19").is_err());
        assert_eq!(parse_quantity(1, "-9223372036854775808.0"), Ok(i64::MIN));
        assert_eq!(parse_quantity(1, "9223372036854775807"), Ok(i64::MAX));
    }

    #[test]
    fn float_quantities_with_zero_fraction_are_accepted() {
        assert_eq!(parse_quantity(1, "4.0"), Ok(4));
        assert!(parse_quantity(1, "4.5").is_err());
        assert!(parse_amount(1, "NaN").is_err());
    }

    #[test]
    fn loads_records_oriented_json() {
        let file = write_temp(
            "json",
            r#"[
                {"OrderID": 7, "Tanggal_Pesanan": "2024-02-01", "Wilayah": "Surabaya",
                 "Kategori": "Rumah Tangga", "Produk": "Panci", "Jumlah": 2.0,
                 "Total_Penjualan": 120, "Metode_Pembayaran": "E-Wallet"},
                {"OrderID": 8, "Tanggal_Pesanan": null, "Wilayah": "Surabaya",
                 "Kategori": "Rumah Tangga", "Produk": "Wajan", "Jumlah": 1,
                 "Total_Penjualan": 80.25, "Metode_Pembayaran": "Tunai"}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records[0].order_id, "7");
        assert_eq!(ds.records[0].quantity, 2);
        assert_eq!(ds.records[1].order_date, None);
        assert_eq!(ds.records[1].total, 80.25);
    }

    #[test]
    fn json_row_missing_a_column_is_fatal() {
        let file = write_temp("json", r#"[{"OrderID": 1}]"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::MissingColumns(cols)) if cols.len() == 7
        ));
    }

    #[test]
    fn loads_parquet_with_typed_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("OrderID", DataType::Int64, false),
            Field::new("Tanggal_Pesanan", DataType::Utf8, true),
            Field::new("Wilayah", DataType::Utf8, false),
            Field::new("Kategori", DataType::Utf8, false),
            Field::new("Produk", DataType::Utf8, false),
            Field::new("Jumlah", DataType::Int64, false),
            Field::new("Total_Penjualan", DataType::Float64, false),
            Field::new("Metode_Pembayaran", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("2024-03-01"), None])),
                Arc::new(StringArray::from(vec!["Jakarta", "Bali"])),
                Arc::new(StringArray::from(vec!["Elektronik", "Hobi"])),
                Arc::new(StringArray::from(vec!["Kamera", "Gitar"])),
                Arc::new(Int64Array::from(vec![1, 4])),
                Arc::new(Float64Array::from(vec![250.0, 99.5])),
                Arc::new(StringArray::from(vec!["Transfer Bank", "Tunai"])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].order_id, "1");
        assert_eq!(ds.records[0].order_date, Some(ymd(2024, 3, 1)));
        assert_eq!(ds.records[1].order_date, None);
        assert_eq!(ds.records[1].quantity, 4);
        assert_eq!(ds.records[1].total, 99.5);
    }

    #[test]
    fn empty_parquet_with_missing_columns_is_fatal() {
        let schema = Arc::new(Schema::new(vec![Field::new("OrderID", DataType::Utf8, false)]));
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::MissingColumns(cols)) if cols.len() == 7
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp("xlsx", "");
        assert!(load_file(file.path()).is_err());
    }
}
