use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use repdata_common::{DataConfig, FilterConfig};
use repdata_core::{
    export_csv, load_dataset, Column, Dataset, ExplorerSession, FilterCriteria, FilteredView, ALL,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const CSV: &str = "\
Title,ResourceType,Themes,GeographicRegion,Language,PubDate,Country
General Social Survey,Survey,Gender;Identity,North America,English,2004,United States
\"Census, long form\",Survey,Gender,Europe,French,2011.0,France
Trans Health Index,Dataset,Health,Europe,English,,Germany
Youth Panel,Panel,Identity;Health,,English,1998,Canada
";

fn write_csv_fixture() -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    tmp.write_all(CSV.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn write_parquet_fixture() -> NamedTempFile {
    let tmp = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let schema = Arc::new(Schema::new(vec![
        Field::new("Title", DataType::Utf8, true),
        Field::new("ResourceType", DataType::Utf8, true),
        Field::new("GeographicRegion", DataType::Utf8, true),
        Field::new("PubDate", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec![Some("A"), Some("B"), Some("C")])),
            Arc::new(StringArray::from(vec![Some("Survey"), Some("Survey"), Some("Dataset")])),
            Arc::new(StringArray::from(vec![Some("Africa"), None, Some("Africa")])),
            Arc::new(Float64Array::from(vec![Some(2004.0), None, Some(2019.0)])),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(tmp.as_file(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    tmp
}

#[test]
fn csv_loads_with_ids_and_years() {
    let tmp = write_csv_fixture();
    let store = load_dataset(tmp.path()).unwrap();
    assert_eq!(store.len(), 4);
    let second = store.get(2).unwrap();
    assert_eq!(second.title.as_deref(), Some("Census, long form"));
    assert_eq!(second.pub_date, Some(2011));
    assert_eq!(store.get(3).unwrap().pub_date, None);
    assert_eq!(store.get(4).unwrap().geographic_region, None);
    // columns absent from the file are null
    assert_eq!(store.get(1).unwrap().notes, None);
}

#[test]
fn parquet_loads_through_the_same_path() {
    let tmp = write_parquet_fixture();
    let store = load_dataset(tmp.path()).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(1).unwrap().pub_date, Some(2004));
    assert_eq!(store.get(2).unwrap().geographic_region, None);

    let mut session = ExplorerSession::new(Arc::new(store), &FilterConfig::default());
    session.set_regions(["Africa"]);
    assert_eq!(session.row_count(), 2);
    assert_eq!(session.top_resource_types().pairs(), vec![("Survey", 1), ("Dataset", 1)]);
}

#[test]
fn vocabulary_is_derived_when_no_file_is_given() {
    let tmp = write_csv_fixture();
    let data = Dataset::open(tmp.path(), None, &DataConfig::default()).unwrap();
    assert_eq!(data.vocabulary.choices(Column::Themes), vec![ALL, "Gender", "Health", "Identity"]);
    assert_eq!(data.vocabulary.choices(Column::GeographicRegion), vec![ALL, "Europe", "North America"]);
}

#[test]
fn curated_vocabulary_file_wins_over_derived_lists() {
    let tmp = write_csv_fixture();
    let mut vocab = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    vocab.write_all(b"resource_type = [\"Survey\", \"Dataset\", \"Archive\"]\n").unwrap();
    vocab.flush().unwrap();
    let data = Dataset::open(tmp.path(), Some(vocab.path()), &DataConfig::default()).unwrap();
    assert_eq!(data.vocabulary.choices(Column::ResourceType), vec![ALL, "Survey", "Dataset", "Archive"]);
    assert_eq!(data.vocabulary.choices(Column::Language), vec![ALL, "English", "French"]);
}

#[test]
fn filter_aggregate_and_detail_flow() {
    let tmp = write_csv_fixture();
    let data = Dataset::open(tmp.path(), None, &DataConfig::default()).unwrap();
    let mut session = ExplorerSession::new(Arc::clone(&data.store), &FilterConfig::default());

    // unrestricted view is the whole store in order
    assert_eq!(session.view().ids(), &[1, 2, 3, 4]);

    session.set_theme("Identity");
    assert_eq!(session.view().ids(), &[1, 4]);

    session.set_theme(ALL);
    session.set_pub_years(2000, 2010);
    // the undated row stays in
    assert_eq!(session.view().ids(), &[1, 3]);

    session.set_pub_years(1990, 2020);
    session.set_free_text("Enter text...");
    assert_eq!(session.row_count(), 4);

    assert_eq!(session.select_row(2), Some(2));
    assert_eq!(session.detail().unwrap().group("Geography").unwrap().fields[0].value.as_deref(), Some("France"));
    session.set_languages(["English"]);
    assert!(session.detail().is_none());
}

#[test]
fn export_then_reparse_round_trips() {
    let tmp = write_csv_fixture();
    let store = load_dataset(tmp.path()).unwrap();
    let mut criteria = FilterCriteria::for_store(&store);
    criteria.set_languages(["English"]);
    let view = FilteredView::compute(&store, &criteria);
    assert_eq!(view.len(), 3);

    let bytes = export_csv(&store, view.ids(), &Column::ALL).unwrap();
    let mut out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    out.write_all(&bytes).unwrap();
    out.flush().unwrap();

    let reloaded = load_dataset(out.path()).unwrap();
    assert_eq!(reloaded.len(), view.len());
    for (before, after) in view.records(&store).zip(reloaded.records()) {
        for col in Column::ALL.into_iter().filter(|c| *c != Column::Id) {
            assert_eq!(col.text(before), col.text(after), "column {col}");
        }
    }
}
