//! Cross-evaluator summary: one row per distinct subject, one score column
//! per evaluator, their average and the labeled remarks.

use std::collections::HashMap;

use crate::conf::{N_COLS_LEADING, N_ROWS_TABLE_HEADER};
use crate::header::{write_full_height_header, write_leading_header};
use crate::payload::{SpecEvaluator, SpecRecord};
use crate::rows::write_identity_cells;
use crate::sheet::apply_column_widths;
use crate::spec::{EnumStyleKey, SpecGridSheet, SpecRenderOptions};
use crate::util::{calculate_average, derive_remark_style, derive_text_or_empty, label_remark};

/// Aggregated row of one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSummaryEntry {
    pub subject_id: String,
    pub subject_name: String,
    pub class_name: String,
    /// One slot per evaluator, aligned with evaluator order.
    pub scores: Vec<Option<f64>>,
    /// Labeled remarks in evaluator-then-record order.
    pub remarks: Vec<String>,
}

impl SpecSummaryEntry {
    fn new(key: &SpecSummaryKey, n_evaluators: usize) -> Self {
        Self {
            subject_id: key.0.clone(),
            subject_name: key.2.clone(),
            class_name: key.1.clone(),
            scores: vec![None; n_evaluators],
            remarks: Vec::new(),
        }
    }

    /// Mean of the present slots; `None` when every slot is empty.
    pub fn average(&self) -> Option<f64> {
        calculate_average(&self.scores)
    }

    /// Remarks joined by newlines, trailing whitespace trimmed.
    pub fn remark_text(&self) -> String {
        self.remarks.join("\n").trim_end().to_string()
    }
}

/// `(subject id, class, name)`, absent parts as empty strings.
pub type SpecSummaryKey = (String, String, String);

/// Build the exact-match key of a record.
pub fn derive_summary_key(record: &SpecRecord) -> SpecSummaryKey {
    (
        derive_text_or_empty(record.subject_id.as_ref()).to_string(),
        derive_text_or_empty(record.class_name.as_ref()).to_string(),
        derive_text_or_empty(record.subject_name.as_ref()).to_string(),
    )
}

/// Collapse every evaluator's records into summary entries.
///
/// Entries keep first-appearance order (evaluators in input order, then
/// records in input order). A later record only fills name or class when the
/// stored value is empty. When one evaluator lists the same subject twice,
/// a later total replaces the slot only if present.
pub fn aggregate_summary_entries(evaluators: &[SpecEvaluator]) -> Vec<SpecSummaryEntry> {
    let n_evaluators = evaluators.len();
    let mut l_entries: Vec<SpecSummaryEntry> = Vec::new();
    let mut dict_idx_by_key: HashMap<SpecSummaryKey, usize> = HashMap::new();

    for (idx_evaluator, evaluator) in evaluators.iter().enumerate() {
        for record in &evaluator.records {
            let key = derive_summary_key(record);
            let idx_entry = *dict_idx_by_key.entry(key).or_insert_with_key(|k| {
                l_entries.push(SpecSummaryEntry::new(k, n_evaluators));
                l_entries.len() - 1
            });
            let entry = &mut l_entries[idx_entry];

            let c_name = derive_text_or_empty(record.subject_name.as_ref());
            if entry.subject_name.is_empty() && !c_name.is_empty() {
                entry.subject_name = c_name.to_string();
            }
            let c_class = derive_text_or_empty(record.class_name.as_ref());
            if entry.class_name.is_empty() && !c_class.is_empty() {
                entry.class_name = c_class.to_string();
            }

            if let Some(total) = record.total_score() {
                entry.scores[idx_evaluator] = Some(total);
            }

            let c_remark = label_remark(evaluator.name.as_deref(), record.remark.as_deref());
            if !c_remark.is_empty() {
                entry.remarks.push(c_remark);
            }
        }
    }

    l_entries
}

/// Write the summary header (identity columns, one score column per
/// evaluator, average, remarks); returns the first body row.
pub fn build_summary_header(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    evaluators: &[SpecEvaluator],
    options: &SpecRenderOptions,
) -> usize {
    let labels = &options.labels;
    let n_evaluators = evaluators.len();
    write_leading_header(sheet, row_start, labels);

    if n_evaluators > 0 {
        let col_end = N_COLS_LEADING + n_evaluators - 1;
        sheet.set_merged_text(
            row_start,
            N_COLS_LEADING,
            row_start,
            col_end,
            &labels.summary_score_title,
            EnumStyleKey::Header,
        );
        for (idx_evaluator, evaluator) in evaluators.iter().enumerate() {
            let col = N_COLS_LEADING + idx_evaluator;
            sheet.set_text(
                row_start + 1,
                col,
                derive_text_or_empty(evaluator.name.as_ref()),
                EnumStyleKey::Header,
            );
            sheet.set_text(
                row_start + 2,
                col,
                format!("{}{}", labels.summary_score_prefix, idx_evaluator + 1),
                EnumStyleKey::Header,
            );
            sheet.set_blank(row_start + 3, col, EnumStyleKey::Header);
        }
    }

    let col_average = N_COLS_LEADING + n_evaluators;
    write_full_height_header(
        sheet,
        row_start,
        col_average,
        col_average,
        &labels.summary_average,
        EnumStyleKey::SummaryAverageHeader,
    );
    write_full_height_header(
        sheet,
        row_start,
        col_average + 1,
        col_average + 1,
        &labels.remark,
        EnumStyleKey::Header,
    );

    row_start + N_ROWS_TABLE_HEADER
}

/// Write one row per entry; returns the first row after them.
pub fn populate_summary_rows(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    entries: &[SpecSummaryEntry],
) -> usize {
    for (idx_entry, entry) in entries.iter().enumerate() {
        let row = row_start + idx_entry;
        write_identity_cells(
            sheet,
            row,
            idx_entry + 1,
            &entry.subject_id,
            Some(entry.subject_name.as_str()),
            &entry.class_name,
        );

        let mut n_col = N_COLS_LEADING;
        for score in &entry.scores {
            sheet.set_number(row, n_col, *score, EnumStyleKey::CellCenter);
            n_col += 1;
        }
        sheet.set_number(row, n_col, entry.average(), EnumStyleKey::SummaryAverageCell);
        n_col += 1;

        let c_remarks = entry.remark_text();
        let style_remark = derive_remark_style(&c_remarks);
        sheet.set_text(row, n_col, c_remarks, style_remark);
    }
    row_start + entries.len()
}

/// Assemble the summary page; returns it with its entry count.
pub fn build_summary_sheet(
    name: &str,
    evaluators: &[SpecEvaluator],
    options: &SpecRenderOptions,
) -> (SpecGridSheet, usize) {
    let mut sheet = SpecGridSheet::new(name);
    apply_column_widths(&mut sheet, evaluators.len());

    let l_entries = aggregate_summary_entries(evaluators);
    let row_body = build_summary_header(&mut sheet, 0, evaluators, options);
    populate_summary_rows(&mut sheet, row_body, &l_entries);
    sheet.freeze = Some((row_body, N_COLS_LEADING));

    tracing::debug!(
        sheet = name,
        n_entries = l_entries.len(),
        n_evaluators = evaluators.len(),
        "summary sheet assembled"
    );
    (sheet, l_entries.len())
}
