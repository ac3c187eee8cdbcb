//! Four-row merged table header.
//!
//! Layout, left to right: the identity columns (order, id, name over two
//! columns, class), one block per schema, then total score and remarks.
//! Identity and trailing columns are merged over all header rows. Inside a
//! block, row 0 carries the block title, row 1 the group label merged over
//! contiguous runs, row 2 the criterion label and row 3 the weight.

use crate::conf::{N_COLS_LEADING, N_COLS_TRAILING, N_ROWS_TABLE_HEADER};
use crate::flatten::SpecBlock;
use crate::spec::{EnumStyleKey, SpecGridSheet, SpecTableLabels};
use crate::util::derive_label_runs;

/// Column positions of one assembled table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableColumns {
    /// `(first, last)` grid column of every block, inclusive.
    pub block_ranges: Vec<(usize, usize)>,
    /// Total score column.
    pub col_total: usize,
    /// Remarks column.
    pub col_remark: usize,
}

impl SpecTableColumns {
    /// Total grid width.
    pub fn width(&self) -> usize {
        self.col_remark + 1
    }

    /// Last grid column.
    pub fn col_last(&self) -> usize {
        self.col_remark
    }
}

/// Lay out block ranges and trailing columns for `blocks`.
pub fn plan_table_columns(blocks: &[SpecBlock]) -> SpecTableColumns {
    let mut n_col_cursor = N_COLS_LEADING;
    let mut l_ranges = Vec::with_capacity(blocks.len());
    for block in blocks {
        if block.span() == 0 {
            continue;
        }
        l_ranges.push((n_col_cursor, n_col_cursor + block.span() - 1));
        n_col_cursor += block.span();
    }

    SpecTableColumns {
        block_ranges: l_ranges,
        col_total: n_col_cursor,
        col_remark: n_col_cursor + N_COLS_TRAILING - 1,
    }
}

/// Grid width of a page carrying `blocks`.
pub fn derive_page_width(blocks: &[SpecBlock]) -> usize {
    N_COLS_LEADING + blocks.iter().map(SpecBlock::span).sum::<usize>() + N_COLS_TRAILING
}

/// Write one column header merged over every header row.
pub fn write_full_height_header(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    col_start: usize,
    col_end: usize,
    text: &str,
    style: EnumStyleKey,
) {
    sheet.set_merged_text(
        row_start,
        col_start,
        row_start + N_ROWS_TABLE_HEADER - 1,
        col_end,
        text,
        style,
    );
}

/// Write the identity column headers (order, id, name, class).
pub fn write_leading_header(sheet: &mut SpecGridSheet, row_start: usize, labels: &SpecTableLabels) {
    write_full_height_header(sheet, row_start, 0, 0, &labels.order, EnumStyleKey::Header);
    write_full_height_header(sheet, row_start, 1, 1, &labels.subject_id, EnumStyleKey::Header);
    write_full_height_header(sheet, row_start, 2, 3, &labels.subject_name, EnumStyleKey::Header);
    write_full_height_header(sheet, row_start, 4, 4, &labels.class_name, EnumStyleKey::Header);
}

/// Write the header rows of one block starting at `col_start`.
pub fn write_block_header(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    col_start: usize,
    block: &SpecBlock,
) {
    if block.span() == 0 {
        return;
    }
    let style_header = EnumStyleKey::BlockHeader(block.palette_slot);
    let style_weight = EnumStyleKey::BlockWeight(block.palette_slot);
    let col_end = col_start + block.span() - 1;

    sheet.set_merged_text(row_start, col_start, row_start, col_end, &block.title, style_header);

    let l_group_labels: Vec<&str> = block.leaves.iter().map(|l| l.group_label.as_str()).collect();
    for (idx_run_start, idx_run_end) in derive_label_runs(&l_group_labels) {
        sheet.set_merged_text(
            row_start + 1,
            col_start + idx_run_start,
            row_start + 1,
            col_start + idx_run_end,
            l_group_labels[idx_run_start],
            style_header,
        );
    }

    for (idx_leaf, leaf) in block.leaves.iter().enumerate() {
        let col = col_start + idx_leaf;
        sheet.set_text(row_start + 2, col, &leaf.label, style_header);
        sheet.set_text(row_start + 3, col, &leaf.weight_text, style_weight);
    }
}

/// Write the full table header at `row_start`; returns the first body row.
pub fn build_table_header(
    sheet: &mut SpecGridSheet,
    row_start: usize,
    blocks: &[SpecBlock],
    labels: &SpecTableLabels,
) -> usize {
    let table_columns = plan_table_columns(blocks);

    write_leading_header(sheet, row_start, labels);

    let l_nonempty = blocks.iter().filter(|b| b.span() > 0);
    for (block, (col_start, _)) in l_nonempty.zip(&table_columns.block_ranges) {
        write_block_header(sheet, row_start, *col_start, block);
    }

    write_full_height_header(
        sheet,
        row_start,
        table_columns.col_total,
        table_columns.col_total,
        &labels.total_score,
        EnumStyleKey::Header,
    );
    write_full_height_header(
        sheet,
        row_start,
        table_columns.col_remark,
        table_columns.col_remark,
        &labels.remark,
        EnumStyleKey::Header,
    );

    row_start + N_ROWS_TABLE_HEADER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::SpecLeafColumn;

    fn leaf(id: &str, group_label: &str) -> SpecLeafColumn {
        SpecLeafColumn {
            criterion_id: Some(id.to_string()),
            label: id.to_string(),
            group_label: group_label.to_string(),
            weight_text: "25%".to_string(),
        }
    }

    fn block(title: &str, slot: usize, leaves: Vec<SpecLeafColumn>) -> SpecBlock {
        SpecBlock {
            title: title.to_string(),
            leaves,
            palette_slot: slot,
            evaluation_id: None,
        }
    }

    #[test]
    fn test_empty_block_list_still_has_identity_and_trailing_columns() {
        let mut sheet = SpecGridSheet::new("S");
        let row_next = build_table_header(&mut sheet, 0, &[], &SpecTableLabels::default());

        assert_eq!(row_next, 4);
        assert_eq!(sheet.width(), 7);
        assert_eq!(derive_page_width(&[]), 7);
        assert_eq!(sheet.text_at(0, 5), Some(SpecTableLabels::default().total_score.as_str()));
        assert_eq!(sheet.merge_at(0, 2).map(|m| (m.row_end, m.col_end)), Some((3, 3)));
        assert_eq!(sheet.merge_at(0, 6).map(|m| m.row_end), Some(3));
    }

    #[test]
    fn test_width_invariant_over_blocks() {
        let l_blocks = vec![
            block("F1", 0, vec![leaf("C1", "A"), leaf("C2", "A"), leaf("C3", "B")]),
            block("F2", 1, vec![leaf("D1", "X")]),
        ];
        let mut sheet = SpecGridSheet::new("S");
        build_table_header(&mut sheet, 2, &l_blocks, &SpecTableLabels::default());

        let table_columns = plan_table_columns(&l_blocks);
        assert_eq!(table_columns.block_ranges, vec![(5, 7), (8, 8)]);
        assert_eq!(table_columns.width(), 5 + 3 + 1 + 2);
        assert_eq!(derive_page_width(&l_blocks), table_columns.width());
        assert_eq!(sheet.width(), table_columns.width());

        assert_eq!(sheet.text_at(2, 5), Some("F1"));
        assert_eq!(sheet.merge_at(2, 5).map(|m| m.col_end), Some(7));
        assert_eq!(sheet.text_at(2, 8), Some("F2"));
        assert!(sheet.merge_at(2, 8).is_none());
        assert_eq!(sheet.cell(5, 8).map(|c| c.style), Some(EnumStyleKey::BlockWeight(1)));
    }

    #[test]
    fn test_group_row_merges_contiguous_runs_only() {
        let l_blocks = vec![block(
            "F",
            0,
            vec![leaf("C1", "A"), leaf("C2", "A"), leaf("C3", "B"), leaf("C4", "A")],
        )];
        let mut sheet = SpecGridSheet::new("S");
        build_table_header(&mut sheet, 0, &l_blocks, &SpecTableLabels::default());

        assert_eq!(sheet.merge_at(1, 5).map(|m| m.col_end), Some(6));
        assert!(sheet.merge_at(1, 7).is_none());
        assert!(sheet.merge_at(1, 8).is_none());
        assert_eq!(sheet.text_at(1, 8), Some("A"));
        assert_eq!(sheet.text_at(2, 7), Some("C3"));
        assert_eq!(sheet.text_at(3, 8), Some("25%"));
    }

    #[test]
    fn test_same_label_in_adjacent_blocks_is_not_merged_across_blocks() {
        let l_blocks = vec![
            block("F1", 0, vec![leaf("C1", "A")]),
            block("F2", 1, vec![leaf("C2", "A")]),
        ];
        let mut sheet = SpecGridSheet::new("S");
        build_table_header(&mut sheet, 0, &l_blocks, &SpecTableLabels::default());

        assert!(sheet.merge_at(1, 5).is_none());
        assert_eq!(sheet.cell(1, 6).map(|c| c.style), Some(EnumStyleKey::BlockHeader(1)));
    }
}
