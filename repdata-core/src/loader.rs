use crate::record::{Column, Resource};
use crate::store::{DatasetStore, Vocabulary};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use memmap2::Mmap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use repdata_common::{DataConfig, RepDataError, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(RepDataError::Schema(format!(
                "unsupported dataset extension '{ext}' for {} (use .csv or .parquet)",
                path.display()
            ))),
        }
    }
}

/// The shared, read-only handles every session is built from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub store: Arc<DatasetStore>,
    pub vocabulary: Arc<Vocabulary>,
}

impl Dataset {
    pub fn new(store: DatasetStore, vocabulary: Vocabulary) -> Self {
        Self { store: Arc::new(store), vocabulary: Arc::new(vocabulary) }
    }

    /// Loads the table, then the vocabulary file if one is given. Lists the file
    /// leaves empty are derived from the table.
    pub fn open(path: &Path, vocabulary_path: Option<&Path>, cfg: &DataConfig) -> Result<Self> {
        let store = load_dataset(path)?;
        let derived = Vocabulary::derive(&store, &cfg.theme_delimiter);
        let vocabulary = match vocabulary_path {
            Some(p) => load_vocabulary(p)?.or_derived(derived),
            None => derived,
        };
        Ok(Self::new(store, vocabulary))
    }
}

pub fn load_dataset(path: &Path) -> Result<DatasetStore> {
    let batches = match DatasetFormat::from_path(path)? {
        DatasetFormat::Csv => read_csv_batches(path)?,
        DatasetFormat::Parquet => read_parquet_batches(path)?,
    };
    let store = DatasetStore::new(batches_to_records(&batches)?);
    info!(path = %path.display(), rows = store.len(), "dataset loaded");
    Ok(store)
}

fn read_csv_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let mut file = File::open(path)?;
    // header only; every column is read as text and typed during conversion
    let (header, _) = Format::default().with_header(true).infer_schema(&mut file, Some(0))?;
    let schema = Schema::new(
        header
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    file.seek(SeekFrom::Start(0))?;
    let reader = ReaderBuilder::new(Arc::new(schema)).with_header(true).build(file)?;
    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn read_parquet_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path)?;
    // memory-map the file instead of buffered reads
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    let bytes = Bytes::copy_from_slice(&mmap);
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;
    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Converts batches into resources. Columns are matched by header name; any
/// Arrow type is cast to text first. Blank cells are null.
pub fn batches_to_records(batches: &[RecordBatch]) -> Result<Vec<Resource>> {
    let Some(first) = batches.first() else {
        return Ok(Vec::new());
    };
    let schema = first.schema();
    let mut mapped: Vec<(usize, Column)> = Vec::new();
    for (i, field) in schema.fields().iter().enumerate() {
        match Column::from_label(field.name()) {
            // ids are assigned by the store, never read from the file
            Some(Column::Id) | None => debug!(column = %field.name(), "dataset column ignored"),
            Some(col) => mapped.push((i, col)),
        }
    }
    if mapped.is_empty() {
        return Err(RepDataError::Schema("no recognised resource columns in dataset".into()));
    }
    let present: BTreeSet<Column> = mapped.iter().map(|(_, c)| *c).collect();
    let missing: Vec<&str> = Column::ALL
        .into_iter()
        .filter(|c| *c != Column::Id && !present.contains(c))
        .map(Column::label)
        .collect();
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "dataset lacks columns; treating them as null");
    }

    let mut out: Vec<Resource> = Vec::new();
    let mut bad_years = 0usize;
    for batch in batches {
        let base = out.len();
        out.resize_with(base + batch.num_rows(), Resource::default);
        for &(i, col) in &mapped {
            let text = cast(batch.column(i), &DataType::Utf8)?;
            let text = text.as_string::<i32>();
            for row in 0..batch.num_rows() {
                if text.is_null(row) {
                    continue;
                }
                let v = text.value(row).trim();
                if v.is_empty() {
                    continue;
                }
                let rec = &mut out[base + row];
                if col == Column::PubDate {
                    rec.pub_date = parse_year(v);
                    if rec.pub_date.is_none() {
                        bad_years += 1;
                    }
                } else if let Some(slot) = col.slot(rec) {
                    *slot = Some(v.to_string());
                }
            }
        }
    }
    if bad_years > 0 {
        warn!(count = bad_years, "unparseable PubDate values treated as unknown");
    }
    Ok(out)
}

/// Accepts `2004` and float renderings such as `2004.0`.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    let content = std::fs::read_to_string(path)?;
    let vocab: Vocabulary = toml::from_str(&content)
        .map_err(|e| RepDataError::Vocabulary(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "vocabulary loaded");
    Ok(vocab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year("2004"), Some(2004));
        assert_eq!(parse_year(" 2004.0 "), Some(2004));
        assert_eq!(parse_year("2004.5"), None);
        assert_eq!(parse_year("circa 2004"), None);
        assert_eq!(parse_year("NaN"), None);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DatasetFormat::from_path(Path::new("a/b.CSV")).unwrap(), DatasetFormat::Csv);
        assert_eq!(DatasetFormat::from_path(Path::new("b.parquet")).unwrap(), DatasetFormat::Parquet);
        assert!(DatasetFormat::from_path(Path::new("b.xlsx")).is_err());
        assert!(DatasetFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn batches_map_by_header_and_cast_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, true),
            Field::new("PubDate", DataType::Float64, true),
            Field::new("Id", DataType::Utf8, true),
            Field::new("Unrelated", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("A"), Some("  "), None])),
                Arc::new(Float64Array::from(vec![Some(2001.0), None, Some(1999.0)])),
                Arc::new(StringArray::from(vec![Some("77"), Some("78"), Some("79")])),
                Arc::new(StringArray::from(vec![Some("x"), Some("y"), Some("z")])),
            ],
        )
        .unwrap();
        let records = batches_to_records(&[batch.clone(), batch]).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].title.as_deref(), Some("A"));
        assert_eq!(records[1].title, None);
        assert_eq!(records[0].pub_date, Some(2001));
        assert_eq!(records[4].pub_date, None);
        assert_eq!(records[5].pub_date, Some(1999));
        // ids come from the store, not the file
        assert_eq!(records[0].id, 0);
    }

    #[test]
    fn unrecognised_schema_is_an_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("foo", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["x"]))]).unwrap();
        assert!(matches!(batches_to_records(&[batch]), Err(RepDataError::Schema(_))));
        assert!(batches_to_records(&[]).unwrap().is_empty());
    }

    #[test]
    fn vocabulary_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.toml");
        std::fs::write(&path, "resource_type = [\"Survey\", \"Archive\"]\nregion = [\"Europe\"]\n").unwrap();
        let v = load_vocabulary(&path).unwrap();
        assert_eq!(v.resource_type, vec!["Survey", "Archive"]);
        assert!(v.language.is_empty());
        std::fs::write(&path, "resource_type = 3").unwrap();
        assert!(matches!(load_vocabulary(&path), Err(RepDataError::Vocabulary(_))));
    }
}
