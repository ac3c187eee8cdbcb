//! Shared grid-document models, render options and error types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::conf::{
    derive_default_front_matter, derive_default_render_options, derive_default_style_options,
    derive_default_table_labels,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification resolved from a style key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,
    /// Single underline.
    pub underline: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            underline: other.underline.or(self.underline),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Style identity attached to every grid cell.
///
/// Block variants carry the palette slot of the block they belong to, so two
/// blocks at the same position always resolve to the same fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumStyleKey {
    /// Plain text, left aligned, no border.
    PlainLeft,
    /// Plain text, centered, no border.
    PlainCenter,
    /// Bold text, left aligned.
    BoldLeft,
    /// Bold text, centered.
    BoldCenter,
    /// Bold underlined text, centered.
    BoldUnderlineCenter,
    /// Italic text, left aligned.
    ItalicLeft,
    /// Italic text, centered.
    ItalicCenter,
    /// Page title.
    Title,
    /// Italic explanatory note.
    Note,
    /// Heading line of the notes section.
    NoteHeading,
    /// Body line of the notes section.
    NoteEmphasis,
    /// Bordered table header cell.
    Header,
    /// Bordered table header cell carrying a weight annotation.
    HeaderWeight,
    /// Bordered body cell, centered.
    CellCenter,
    /// Bordered body cell, left aligned.
    CellLeft,
    /// Bordered body cell, left aligned with wrapping.
    CellLeftWrap,
    /// Summary average header cell.
    SummaryAverageHeader,
    /// Summary average body cell.
    SummaryAverageCell,
    /// Block header cell filled with the block's palette color.
    BlockHeader(usize),
    /// Block weight annotation filled with the block's palette color.
    BlockWeight(usize),
    /// Block body cell filled with the block's palette color.
    BlockCell(usize),
}

/// Normalized cell value in the grid document.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Text payload when the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(val) => Some(val.as_str()),
            _ => None,
        }
    }

    /// Numeric payload when the value is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(val) => Some(*val),
            _ => None,
        }
    }
}

impl From<Option<f64>> for EnumCellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::None, Self::Number)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridDocumentSpecification

/// One populated grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecGridCell {
    /// Cell content.
    pub value: EnumCellValue,
    /// Style identity.
    pub style: EnumStyleKey,
}

/// Inclusive merged rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecMergeRange {
    /// First row (inclusive).
    pub row_start: usize,
    /// First column (inclusive).
    pub col_start: usize,
    /// Last row (inclusive).
    pub row_end: usize,
    /// Last column (inclusive).
    pub col_end: usize,
}

impl SpecMergeRange {
    /// Whether `(row, col)` lies inside the rectangle.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..=self.row_end).contains(&row)
            && (self.col_start..=self.col_end).contains(&col)
    }

    /// Whether two rectangles share at least one cell.
    pub fn overlaps(&self, other: &SpecMergeRange) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// One page of the grid document, described purely in grid terms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecGridSheet {
    /// Final (sanitized, unique) sheet name.
    pub name: String,
    /// Cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecGridCell>,
    /// Non-degenerate, non-overlapping merged rectangles.
    pub merges: Vec<SpecMergeRange>,
    /// Column widths in character units.
    pub col_widths: BTreeMap<usize, f64>,
    /// Freeze pane anchor `(row, col)`.
    pub freeze: Option<(usize, usize)>,
}

impl SpecGridSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Write (or overwrite) one cell.
    pub fn set_cell(&mut self, row: usize, col: usize, value: EnumCellValue, style: EnumStyleKey) {
        self.cells.insert((row, col), SpecGridCell { value, style });
    }

    /// Write a text cell.
    pub fn set_text(&mut self, row: usize, col: usize, text: impl Into<String>, style: EnumStyleKey) {
        self.set_cell(row, col, EnumCellValue::String(text.into()), style);
    }

    /// Write a numeric cell, or a styled blank when `value` is `None`.
    pub fn set_number(&mut self, row: usize, col: usize, value: Option<f64>, style: EnumStyleKey) {
        self.set_cell(row, col, EnumCellValue::from(value), style);
    }

    /// Write a styled blank cell.
    pub fn set_blank(&mut self, row: usize, col: usize, style: EnumStyleKey) {
        self.set_cell(row, col, EnumCellValue::None, style);
    }

    /// Register a merged rectangle.
    ///
    /// Inverted and single-cell ranges are ignored, as are ranges overlapping
    /// an existing merge. Returns whether the range was registered.
    pub fn merge(&mut self, row_start: usize, col_start: usize, row_end: usize, col_end: usize) -> bool {
        if row_start > row_end || col_start > col_end {
            return false;
        }
        if row_start == row_end && col_start == col_end {
            return false;
        }

        let merge_new = SpecMergeRange {
            row_start,
            col_start,
            row_end,
            col_end,
        };
        if self.merges.iter().any(|m| m.overlaps(&merge_new)) {
            tracing::debug!(
                sheet = %self.name,
                ?merge_new,
                "skip merge overlapping an existing range"
            );
            return false;
        }
        self.merges.push(merge_new);
        true
    }

    /// Write `text` at the anchor, fill the rest of the rectangle with styled
    /// blanks and merge it.
    pub fn set_merged_text(
        &mut self,
        row_start: usize,
        col_start: usize,
        row_end: usize,
        col_end: usize,
        text: impl Into<String>,
        style: EnumStyleKey,
    ) {
        for row in row_start..=row_end {
            for col in col_start..=col_end {
                self.set_blank(row, col, style);
            }
        }
        self.set_text(row_start, col_start, text, style);
        self.merge(row_start, col_start, row_end, col_end);
    }

    /// Look up one cell.
    pub fn cell(&self, row: usize, col: usize) -> Option<&SpecGridCell> {
        self.cells.get(&(row, col))
    }

    /// Text at `(row, col)` when the cell holds a string.
    pub fn text_at(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).and_then(|c| c.value.as_str())
    }

    /// Number at `(row, col)` when the cell holds a number.
    pub fn number_at(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).and_then(|c| c.value.as_f64())
    }

    /// Find the merge anchored at `(row, col)`.
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&SpecMergeRange> {
        self.merges
            .iter()
            .find(|m| m.row_start == row && m.col_start == col)
    }

    /// Number of columns spanned by written cells and merges.
    pub fn width(&self) -> usize {
        let n_col_cells = self.cells.keys().map(|(_, c)| c + 1).max().unwrap_or(0);
        let n_col_merges = self.merges.iter().map(|m| m.col_end + 1).max().unwrap_or(0);
        usize::max(n_col_cells, n_col_merges)
    }

    /// Set a column width in character units.
    pub fn set_column_width(&mut self, col: usize, width: f64) {
        self.col_widths.insert(col, width);
    }
}

/// Complete grid document: ordered sheets plus build report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecGridDocument {
    /// Sheets in output order.
    pub sheets: Vec<SpecGridSheet>,
    /// Build diagnostics.
    pub report: SpecExportReport,
}

impl SpecGridDocument {
    /// Sheet names in output order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Look up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&SpecGridSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RenderOptions

/// Captions used by table headers and placeholder pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTableLabels {
    /// Order (index) column.
    pub order: String,
    /// Subject id column.
    pub subject_id: String,
    /// Subject name column (spans two grid columns).
    pub subject_name: String,
    /// Class column.
    pub class_name: String,
    /// Trailing total score column.
    pub total_score: String,
    /// Trailing remarks column.
    pub remark: String,
    /// Block title used when a schema has no title.
    pub block_title_default: String,
    /// Summary score block title.
    pub summary_score_title: String,
    /// Prefix of the per-evaluator summary column tag (`Score1`, `Score2`, ...).
    pub summary_score_prefix: String,
    /// Summary average column.
    pub summary_average: String,
    /// Placeholder text when no evaluator is present.
    pub no_data: String,
}

impl Default for SpecTableLabels {
    fn default() -> Self {
        derive_default_table_labels()
    }
}

/// Letterhead and general-information texts of evaluator pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecFrontMatter {
    /// Form code line (top left).
    pub form_code: String,
    /// First organisation line (left).
    pub organisation_primary: String,
    /// Second organisation line (left).
    pub organisation_secondary: String,
    /// National heading (right).
    pub national_heading: String,
    /// Motto (right, underlined).
    pub motto: String,
    /// Place and date line (right).
    pub date_line: String,
    /// Page title used when the schema has no title.
    pub title_default: String,
    /// Subtitle under the page title.
    pub subtitle: String,
    /// General-information section heading.
    pub section_general: String,
    /// Program label.
    pub program_label: String,
    /// Academic year label.
    pub academic_year_label: String,
    /// Council number label.
    pub council_label: String,
    /// Evaluator name label.
    pub evaluator_label: String,
    /// Evaluator role label.
    pub role_label: String,
    /// Department label.
    pub department_label: String,
    /// Results section heading.
    pub section_results: String,
    /// Scoring note above the table.
    pub scoring_note: String,
    /// Notes section heading.
    pub notes_heading: String,
    /// Signature block title.
    pub signature_title: String,
}

impl Default for SpecFrontMatter {
    fn default() -> Self {
        derive_default_front_matter()
    }
}

/// Font and color choices resolved by the style registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecStyleOptions {
    /// Font family for every cell.
    pub font_name: String,
    /// Body font size in points.
    pub font_size: i64,
    /// Title font size in points.
    pub font_size_title: i64,
    /// Block fill colors, assigned by block position modulo length.
    pub block_palette: Vec<String>,
    /// Font color of weight annotations.
    pub color_weight: String,
    /// Fill color of the summary average column.
    pub color_highlight: String,
}

impl Default for SpecStyleOptions {
    fn default() -> Self {
        derive_default_style_options()
    }
}

/// Document-wide render options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecRenderOptions {
    /// Header captions.
    pub labels: SpecTableLabels,
    /// Letterhead texts.
    pub front_matter: SpecFrontMatter,
    /// Fonts and colors.
    pub style: SpecStyleOptions,
    /// Summary sheet name.
    pub summary_sheet_name: String,
    /// Placeholder sheet name used when no evaluator is present.
    pub empty_sheet_name: String,
    /// Name used in sheet names when an evaluator has none.
    pub default_evaluator_name: String,
    /// Stem of the suggested output file name.
    pub file_name_stem: String,
    /// Emit the cross-evaluator summary sheet.
    pub include_summary: bool,
    /// Emit the criterion notes section under each evaluator table.
    pub include_notes: bool,
}

impl Default for SpecRenderOptions {
    fn default() -> Self {
        derive_default_render_options()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-build report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Number of evaluator pages.
    pub n_evaluator_sheets: usize,
    /// Number of summary rows.
    pub n_summary_entries: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecExportReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ErrorSpecification

/// Failures surfaced to the caller.
///
/// The layout engine itself never fails; these come from decoding input or
/// from the output sink.
#[derive(Debug)]
pub enum ExportError {
    /// Payload or options could not be decoded.
    InvalidPayload(String),
    /// A grid coordinate exceeds the sink's addressable range.
    IndexOverflow(String),
    /// The sink failed to encode the workbook.
    Xlsx(String),
    /// Writing the output file failed.
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPayload(msg) => write!(f, "Invalid payload: {msg}"),
            Self::IndexOverflow(msg) => write!(f, "{msg}"),
            Self::Xlsx(msg) => write!(f, "xlsx write error: {msg}"),
            Self::Io { path, message } => {
                write!(f, "Failed to write {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_skips_degenerate_and_overlapping_ranges() {
        let mut sheet = SpecGridSheet::new("S");

        assert!(!sheet.merge(0, 0, 0, 0));
        assert!(!sheet.merge(2, 0, 1, 0));
        assert!(sheet.merge(0, 0, 3, 0));
        assert!(!sheet.merge(1, 0, 1, 2));
        assert!(sheet.merge(0, 1, 0, 2));

        assert_eq!(sheet.merges.len(), 2);
        assert!(sheet.merges[0].contains(2, 0));
        assert!(!sheet.merges[0].contains(1, 1));
        assert!(sheet.merge_at(0, 1).is_some());
    }

    #[test]
    fn test_set_merged_text_fills_range_and_keeps_anchor_text() {
        let mut sheet = SpecGridSheet::new("S");
        sheet.set_merged_text(1, 2, 1, 4, "Title", EnumStyleKey::Title);

        assert_eq!(sheet.text_at(1, 2), Some("Title"));
        assert_eq!(sheet.cell(1, 4).map(|c| &c.value), Some(&EnumCellValue::None));
        assert_eq!(sheet.merge_at(1, 2).map(|m| m.col_end), Some(4));
        assert_eq!(sheet.width(), 5);
    }

    #[test]
    fn test_format_merge_prefers_right_side_values() {
        let base = SpecCellFormat {
            bold: Some(false),
            font_size: Some(12),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            bold: Some(true),
            underline: Some(true),
            ..Default::default()
        });

        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.underline, Some(true));
        assert_eq!(merged.font_size, Some(12));
    }

    #[test]
    fn test_render_options_accept_partial_json() {
        let options: SpecRenderOptions =
            serde_json::from_str(r##"{"include_summary": false, "labels": {"order": "#"}}"##)
                .expect("partial options should decode");

        assert!(!options.include_summary);
        assert_eq!(options.labels.order, "#");
        assert_eq!(options.labels.remark, SpecTableLabels::default().remark);
        assert_eq!(options.summary_sheet_name, "00-Summary");
    }
}
