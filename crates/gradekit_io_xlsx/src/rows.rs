//! Record rows: identity cells, one score per leaf, total and remark.

use std::collections::HashMap;

use crate::flatten::{SpecBlock, derive_nonempty_id};
use crate::payload::SpecRecord;
use crate::spec::{EnumStyleKey, SpecGridSheet};
use crate::util::{derive_remark_style, derive_text_or_empty, split_subject_name};

/// Index a record's scores by criterion id.
///
/// The first entry for an id wins. Entries without an id or a value are
/// skipped.
pub fn derive_score_map(record: &SpecRecord) -> HashMap<&str, f64> {
    let mut dict_scores = HashMap::new();
    for score in record.scores() {
        if let (Some(c_id), Some(val)) = (score.criterion_id.as_deref(), score.value) {
            dict_scores.entry(c_id).or_insert(val);
        }
    }
    dict_scores
}

/// Write the order, id, split name and class cells of one row.
pub fn write_identity_cells(
    sheet: &mut SpecGridSheet,
    row: usize,
    order: usize,
    subject_id: &str,
    subject_name: Option<&str>,
    class_name: &str,
) {
    let (c_family, c_given) = split_subject_name(subject_name);
    sheet.set_number(row, 0, Some(order as f64), EnumStyleKey::CellCenter);
    sheet.set_text(row, 1, subject_id, EnumStyleKey::CellCenter);
    sheet.set_text(row, 2, c_family, EnumStyleKey::CellLeft);
    sheet.set_text(row, 3, c_given, EnumStyleKey::CellLeft);
    sheet.set_text(row, 4, class_name, EnumStyleKey::CellCenter);
}

/// Write one record row. `order` is the 1-based row number.
///
/// Scores whose criterion id matches no leaf contribute to no column. A
/// result tagged with an evaluation id only fills blocks of that form.
pub fn write_record_row(
    sheet: &mut SpecGridSheet,
    row: usize,
    col_start: usize,
    order: usize,
    record: &SpecRecord,
    blocks: &[SpecBlock],
) -> usize {
    write_identity_cells(
        sheet,
        row,
        order,
        derive_text_or_empty(record.subject_id.as_ref()),
        record.subject_name.as_deref(),
        derive_text_or_empty(record.class_name.as_ref()),
    );

    let dict_scores = derive_score_map(record);
    let c_result_id = derive_nonempty_id(
        record
            .result
            .as_ref()
            .and_then(|r| r.evaluation_id.as_deref()),
    );
    let mut n_col = col_start;
    for block in blocks {
        let style_cell = EnumStyleKey::BlockCell(block.palette_slot);
        let if_accepts = block.accepts_result(c_result_id);
        for leaf in &block.leaves {
            let value = leaf
                .criterion_id
                .as_deref()
                .filter(|_| if_accepts)
                .and_then(|c_id| dict_scores.get(c_id).copied());
            sheet.set_number(row, n_col, value, style_cell);
            n_col += 1;
        }
    }

    sheet.set_number(row, n_col, record.total_score(), EnumStyleKey::CellCenter);
    n_col += 1;

    let c_remark = derive_text_or_empty(record.remark.as_ref());
    sheet.set_text(row, n_col, c_remark, derive_remark_style(c_remark));
    n_col
}

/// Write every record from `row_start`; returns the first row after them.
pub fn populate_records(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    col_start: usize,
    records: &[SpecRecord],
    blocks: &[SpecBlock],
) -> usize {
    for (idx_record, record) in records.iter().enumerate() {
        write_record_row(sheet, row_start + idx_record, col_start, idx_record + 1, record, blocks);
    }
    row_start + records.len()
}
