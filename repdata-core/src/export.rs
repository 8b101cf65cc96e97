use crate::aggregate::{FrequencyResult, Overview};
use crate::criteria::FilterCriteria;
use crate::predicate::RowPredicate;
use crate::record::{Column, RecordId};
use crate::store::DatasetStore;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use repdata_common::{RepDataError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

// --- CSV export of displayed rows ---

/// Projects `ids` onto `columns`; numeric columns stay integers.
pub fn to_record_batch(store: &DatasetStore, ids: &[RecordId], columns: &[Column]) -> Result<RecordBatch> {
    if columns.is_empty() {
        return Err(RepDataError::Other("at least one column must be exported".into()));
    }
    let rows: Vec<_> = ids.iter().filter_map(|&id| store.get(id)).collect();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
    for &col in columns {
        if col.is_numeric() {
            fields.push(Field::new(col.label(), DataType::Int64, col != Column::Id));
            let values: Int64Array = rows
                .iter()
                .map(|r| match col {
                    Column::Id => Some(r.id as i64),
                    _ => r.pub_date.map(i64::from),
                })
                .collect();
            arrays.push(Arc::new(values));
        } else {
            fields.push(Field::new(col.label(), DataType::Utf8, true));
            let values: StringArray = rows
                .iter()
                .map(|r| col.text(r).map(|v| v.into_owned()))
                .collect();
            arrays.push(Arc::new(values));
        }
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Header-included CSV of the given rows and columns. Nulls are written as empty fields.
pub fn export_csv(store: &DatasetStore, ids: &[RecordId], columns: &[Column]) -> Result<Vec<u8>> {
    let batch = to_record_batch(store, ids, columns)?;
    let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
    writer.write(&batch)?;
    let bytes = writer.into_inner();
    debug!(rows = ids.len(), bytes = bytes.len(), "csv export rendered");
    Ok(bytes)
}

pub fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

// --- headless summary output ---

pub fn print_summary(overview: &Overview, predicate: &RowPredicate, total_rows: usize) {
    println!("{:<16} {}", "Filter:", predicate);
    println!("{:<16} {} of {}", "Resources:", overview.row_count, total_rows);
    print_breakdown("Resource types:", &overview.top_resource_types);
    print_breakdown("Regions:", &overview.top_regions);
}

fn print_breakdown(title: &str, freq: &FrequencyResult) {
    println!("{title}");
    if freq.top_values.is_empty() {
        println!("  (none)");
    }
    for e in &freq.top_values {
        println!("  {:<40} {:6}  {:.1}%", e.value, e.count, e.percentage);
    }
}

pub fn summary_json(overview: &Overview, criteria: &FilterCriteria, predicate: &RowPredicate) -> serde_json::Value {
    serde_json::json!({
        "criteria": criteria,
        "predicate": predicate.to_string(),
        "overview": overview,
    })
}

pub fn export_summary_json(
    path: &Path,
    overview: &Overview,
    criteria: &FilterCriteria,
    predicate: &RowPredicate,
) -> Result<()> {
    let doc = summary_json(overview, criteria, predicate);
    let mut file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, &doc)
        .map_err(|e| RepDataError::Other(e.to_string()))?;
    Ok(())
}
