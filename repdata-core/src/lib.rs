pub mod aggregate;
pub mod criteria;
pub mod detail;
pub mod export;
pub mod grid;
pub mod loader;
pub mod predicate;
pub mod record;
pub mod session;
pub mod store;
pub mod view;

pub use aggregate::{FrequencyCounter, FrequencyEntry, FrequencyResult, Overview};
pub use criteria::{Choice, FilterCriteria, MultiChoice, TextQuery, YearRange, ALL};
pub use detail::{DetailField, DetailResolver, FieldGroup, RecordDetail};
pub use export::{export_csv, export_summary_json, print_summary, summary_json, to_record_batch, write_export};
pub use grid::GridState;
pub use loader::{load_dataset, load_vocabulary, parse_year, Dataset, DatasetFormat};
pub use predicate::{Clause, RowPredicate};
pub use record::{Column, RecordId, RecordSummary, Resource};
pub use repdata_common::{RepDataError, Result};
pub use session::ExplorerSession;
pub use store::{DatasetStore, Vocabulary};
pub use view::{FilteredView, ViewCache};
