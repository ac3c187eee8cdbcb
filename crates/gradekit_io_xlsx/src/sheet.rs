//! Per-evaluator page assembly: letterhead, info block, table, notes and
//! signature.

use crate::conf::{
    N_COL_FRONT_LEFT_END_MAX, N_COLS_LEADING, N_COLS_TRAILING, N_GAP_FRONT_MIN,
    N_SPAN_FRONT_RIGHT_MIN, N_WIDTH_LEAF, N_WIDTH_REMARK, N_WIDTH_TOTAL, TUP_WIDTH_LEADING,
};
use crate::flatten::SpecBlock;
use crate::header::{build_table_header, derive_page_width};
use crate::payload::{SpecEvaluator, SpecSchema};
use crate::rows::populate_records;
use crate::spec::{EnumStyleKey, SpecFrontMatter, SpecGridSheet, SpecRenderOptions};
use crate::util::derive_text_or_empty;

////////////////////////////////////////////////////////////////////////////////
// #region FrontMatterColumns

/// Column plan of the letterhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFrontMatterColumns {
    /// Last column of the left block (it always starts at 0).
    pub col_left_end: usize,
    /// First column of the right block; `None` when the page is too narrow.
    pub col_right_start: Option<usize>,
    /// Last grid column of the page.
    pub col_last: usize,
}

/// Plan letterhead columns for a page whose last column is `col_last`.
///
/// The right block needs a span of at least 4 columns and a gap of at least
/// 2 columns after the left block. It is omitted, never shrunk, when the
/// page cannot hold both.
pub fn plan_front_matter_columns(col_last: usize) -> SpecFrontMatterColumns {
    let col_left_end = usize::min(N_COL_FRONT_LEFT_END_MAX, col_last);
    let n_cols_available = col_last - col_left_end;

    let col_right_start = if n_cols_available >= N_SPAN_FRONT_RIGHT_MIN + N_GAP_FRONT_MIN {
        let col_candidate = col_last + 1 - N_SPAN_FRONT_RIGHT_MIN;
        Some(usize::max(col_candidate, col_left_end + N_GAP_FRONT_MIN))
    } else {
        None
    };

    SpecFrontMatterColumns {
        col_left_end,
        col_right_start,
        col_last,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FrontMatter

fn write_left_line(
    sheet: &mut SpecGridSheet,
    row: usize,
    columns: &SpecFrontMatterColumns,
    text: &str,
    style: EnumStyleKey,
) {
    sheet.set_merged_text(row, 0, row, columns.col_left_end, text, style);
}

fn write_right_line(
    sheet: &mut SpecGridSheet,
    row: usize,
    columns: &SpecFrontMatterColumns,
    text: &str,
    style: EnumStyleKey,
) {
    if let Some(col_start) = columns.col_right_start {
        sheet.set_merged_text(row, col_start, row, columns.col_last, text, style);
    }
}

fn write_full_line(
    sheet: &mut SpecGridSheet,
    row: usize,
    col_last: usize,
    text: &str,
    style: EnumStyleKey,
) {
    sheet.set_merged_text(row, 0, row, col_last, text, style);
}

/// Write one `label value | label value` info row.
///
/// The left label spans the left block, its value the next three columns.
/// The right label spans two columns and its value the rest of the row; a
/// right label without value spans the rest of the row on its own.
pub fn write_info_row(
    sheet: &mut SpecGridSheet,
    row: usize,
    col_last: usize,
    left: (&str, &str),
    right: Option<(&str, &str)>,
) {
    let (c_left_label, c_left_value) = left;
    let mut n_col_next = 0;

    if !c_left_label.is_empty() {
        let col_label_end = usize::min(N_COL_FRONT_LEFT_END_MAX, col_last);
        sheet.set_merged_text(row, 0, row, col_label_end, c_left_label, EnumStyleKey::PlainLeft);
        n_col_next = col_label_end + 1;

        if !c_left_value.is_empty() && n_col_next <= col_last {
            let col_value_end = usize::min(n_col_next + 2, col_last);
            sheet.set_merged_text(
                row,
                n_col_next,
                row,
                col_value_end,
                c_left_value,
                EnumStyleKey::BoldLeft,
            );
            n_col_next = col_value_end + 1;
        }
    }

    let Some((c_right_label, c_right_value)) = right else {
        return;
    };
    if c_right_label.is_empty() || n_col_next > col_last {
        return;
    }

    if c_right_value.is_empty() {
        sheet.set_merged_text(row, n_col_next, row, col_last, c_right_label, EnumStyleKey::PlainLeft);
        return;
    }

    let col_label_end = usize::min(n_col_next + 1, col_last);
    sheet.set_merged_text(row, n_col_next, row, col_label_end, c_right_label, EnumStyleKey::PlainLeft);
    if col_label_end < col_last {
        sheet.set_merged_text(
            row,
            col_label_end + 1,
            row,
            col_last,
            c_right_value,
            EnumStyleKey::BoldLeft,
        );
    }
}

fn join_label(label: &str, value: &str) -> String {
    if value.is_empty() {
        label.to_string()
    } else {
        format!("{label} {value}")
    }
}

/// Write the letterhead and the general-information block; returns the
/// first row after it (where the table header starts).
pub fn build_front_matter(
    sheet: &mut SpecGridSheet,
    col_last: usize,
    schema: Option<&SpecSchema>,
    evaluator: &SpecEvaluator,
    front_matter: &SpecFrontMatter,
) -> usize {
    let columns = plan_front_matter_columns(col_last);
    let mut n_row = 0;

    write_left_line(sheet, n_row, &columns, &front_matter.form_code, EnumStyleKey::ItalicLeft);
    n_row += 1;

    write_left_line(
        sheet,
        n_row,
        &columns,
        &front_matter.organisation_primary,
        EnumStyleKey::BoldLeft,
    );
    write_right_line(sheet, n_row, &columns, &front_matter.national_heading, EnumStyleKey::BoldCenter);
    n_row += 1;

    write_left_line(
        sheet,
        n_row,
        &columns,
        &front_matter.organisation_secondary,
        EnumStyleKey::BoldLeft,
    );
    write_right_line(
        sheet,
        n_row,
        &columns,
        &front_matter.motto,
        EnumStyleKey::BoldUnderlineCenter,
    );
    n_row += 1;

    write_right_line(sheet, n_row, &columns, &front_matter.date_line, EnumStyleKey::ItalicCenter);
    n_row += 2;

    let c_title = schema
        .and_then(|s| s.title.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(front_matter.title_default.as_str());
    write_full_line(sheet, n_row, col_last, &c_title.to_uppercase(), EnumStyleKey::Title);
    n_row += 1;
    write_full_line(sheet, n_row, col_last, &front_matter.subtitle, EnumStyleKey::PlainCenter);
    n_row += 2;

    sheet.set_text(n_row, 0, &front_matter.section_general, EnumStyleKey::BoldLeft);
    n_row += 1;

    let c_academic_year = schema.map_or("", |s| derive_text_or_empty(s.academic_year.as_ref()));
    write_info_row(
        sheet,
        n_row,
        col_last,
        (front_matter.program_label.as_str(), ""),
        Some((front_matter.academic_year_label.as_str(), c_academic_year)),
    );
    n_row += 1;

    write_info_row(sheet, n_row, col_last, (front_matter.council_label.as_str(), ""), None);
    n_row += 1;

    let c_evaluator = join_label(
        &front_matter.evaluator_label,
        derive_text_or_empty(evaluator.name.as_ref()),
    );
    let c_role = join_label(
        &front_matter.role_label,
        derive_text_or_empty(evaluator.role.as_ref()),
    );
    write_info_row(sheet, n_row, col_last, (c_evaluator.as_str(), ""), Some((c_role.as_str(), "")));
    n_row += 1;

    let c_department = join_label(
        &front_matter.department_label,
        derive_text_or_empty(evaluator.department.as_ref()),
    );
    write_full_line(sheet, n_row, col_last, &c_department, EnumStyleKey::PlainLeft);
    n_row += 2;

    sheet.set_text(n_row, 0, &front_matter.section_results, EnumStyleKey::BoldLeft);
    n_row += 1;
    write_full_line(sheet, n_row, col_last, &front_matter.scoring_note, EnumStyleKey::Note);
    n_row += 2;

    n_row
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Footer

/// Write the notes section (heading plus one merged line per note) after one
/// blank row; returns the first row after it. Nothing is written when
/// `notes` is empty.
pub fn build_notes(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    col_last: usize,
    heading: &str,
    notes: &[String],
) -> usize {
    if notes.is_empty() {
        return row_start;
    }

    let mut n_row = row_start + 1;
    write_full_line(sheet, n_row, col_last, heading, EnumStyleKey::NoteHeading);
    n_row += 1;
    for c_note in notes {
        write_full_line(sheet, n_row, col_last, c_note, EnumStyleKey::NoteEmphasis);
        n_row += 1;
    }
    n_row
}

/// Write the signature block after one blank row; returns the first row
/// after it.
pub fn build_signature(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    col_last: usize,
    title: &str,
    evaluator_name: &str,
) -> usize {
    let col_start = usize::min(1, col_last);
    let col_end = usize::max(col_start, usize::min(col_start + 3, col_last));

    let mut n_row = row_start + 1;
    sheet.set_merged_text(n_row, col_start, n_row, col_end, title, EnumStyleKey::BoldLeft);
    n_row += 1;
    for _ in 0..2 {
        sheet.set_merged_text(n_row, col_start, n_row, col_end, "", EnumStyleKey::PlainLeft);
        n_row += 1;
    }
    sheet.set_merged_text(
        n_row,
        col_start,
        n_row,
        col_end,
        evaluator_name.to_uppercase(),
        EnumStyleKey::BoldLeft,
    );
    n_row + 1
}

/// Apply fixed widths: identity columns, `n_cols_middle` score columns, then
/// the total and remark columns.
pub fn apply_column_widths(sheet: &mut SpecGridSheet, n_cols_middle: usize) {
    for (col, width) in TUP_WIDTH_LEADING.iter().enumerate() {
        sheet.set_column_width(col, *width);
    }
    for col in N_COLS_LEADING..N_COLS_LEADING + n_cols_middle {
        sheet.set_column_width(col, N_WIDTH_LEAF);
    }
    let col_total = N_COLS_LEADING + n_cols_middle;
    sheet.set_column_width(col_total, N_WIDTH_TOTAL);
    sheet.set_column_width(col_total + 1, N_WIDTH_REMARK);
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetAssembly

/// Assemble the page of one evaluator.
///
/// `schema` drives the title and academic year of the letterhead; `blocks`
/// drive the table; `notes` feed the notes section.
pub fn build_evaluator_sheet(
    name: &str,
    evaluator: &SpecEvaluator,
    schema: Option<&SpecSchema>,
    blocks: &[SpecBlock],
    notes: &[String],
    options: &SpecRenderOptions,
) -> SpecGridSheet {
    let mut sheet = SpecGridSheet::new(name);
    let n_cols_total = derive_page_width(blocks);
    let col_last = n_cols_total - 1;

    apply_column_widths(&mut sheet, n_cols_total - N_COLS_LEADING - N_COLS_TRAILING);

    let mut n_row = build_front_matter(&mut sheet, col_last, schema, evaluator, &options.front_matter);
    n_row = build_table_header(&mut sheet, n_row, blocks, &options.labels);
    n_row = populate_records(&mut sheet, n_row, N_COLS_LEADING, &evaluator.records, blocks);

    if options.include_notes {
        n_row = build_notes(
            &mut sheet,
            n_row,
            col_last,
            &options.front_matter.notes_heading,
            notes,
        );
    }
    build_signature(
        &mut sheet,
        n_row,
        col_last,
        &options.front_matter.signature_title,
        derive_text_or_empty(evaluator.name.as_ref()),
    );

    tracing::debug!(
        sheet = name,
        n_records = evaluator.records.len(),
        n_cols = n_cols_total,
        "evaluator sheet assembled"
    );
    sheet
}

/// Placeholder page used when there is no evaluator.
pub fn build_empty_sheet(name: &str, options: &SpecRenderOptions) -> SpecGridSheet {
    let mut sheet = SpecGridSheet::new(name);
    sheet.set_text(0, 0, &options.labels.no_data, EnumStyleKey::PlainLeft);
    sheet.set_column_width(0, options.labels.no_data.chars().count().max(8) as f64 + 2.0);
    sheet
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
