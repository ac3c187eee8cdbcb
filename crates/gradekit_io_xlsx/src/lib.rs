//! `gradekit_io_xlsx` v1:
//! Evaluation-grading export engine.
//!
//! Payload in, grid document out, XLSX bytes last:
//! - `conf`     : constants and default presets
//! - `spec`     : grid document, render options, report and error types
//! - `payload`  : serde model of the evaluation payload
//! - `util`     : pure helper functions
//! - `style`    : style key to cell format registry
//! - `flatten`  : schema to leaf columns and blocks
//! - `header`   : four-row merged table header
//! - `rows`     : record rows
//! - `sheet`    : evaluator pages with letterhead, notes and signature
//! - `summary`  : cross-evaluator summary page
//! - `document` : orchestration over all pages
//! - `writer`   : XLSX sink
pub mod conf;
pub mod document;
pub mod flatten;
pub mod header;
pub mod payload;
pub mod rows;
pub mod sheet;
pub mod spec;
pub mod style;
pub mod summary;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use document::{
    build_evaluation_document, parse_payload, parse_render_options, render_evaluation_workbook,
};
pub use flatten::{SpecBlock, SpecLeafColumn, count_leaf_columns, flatten_schema};
pub use header::build_table_header;
pub use payload::{
    SpecCriterion, SpecEvaluationPayload, SpecEvaluator, SpecGroup, SpecRecord, SpecRecordResult,
    SpecSchema, SpecScore,
};
pub use rows::populate_records;
pub use sheet::{build_empty_sheet, build_evaluator_sheet, plan_front_matter_columns};
pub use spec::{
    EnumCellValue, EnumStyleKey, ExportError, SpecCellFormat, SpecExportReport, SpecFrontMatter,
    SpecGridCell, SpecGridDocument, SpecGridSheet, SpecMergeRange, SpecRenderOptions,
    SpecStyleOptions, SpecTableLabels,
};
pub use summary::{SpecSummaryEntry, aggregate_summary_entries, build_summary_sheet};
pub use util::sanitize_sheet_name;
pub use writer::{DocumentSink, XlsxWriter, suggested_file_name};
