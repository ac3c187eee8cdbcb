//! XLSX sink that encodes a grid document into workbook bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rust_xlsxwriter::{
    Format, FormatAlign, FormatBorder, FormatUnderline, Workbook, Worksheet, XlsxError,
};

use crate::conf::{C_CONTENT_TYPE_XLSX, C_FILE_EXTENSION_XLSX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, EnumStyleKey, ExportError, SpecCellFormat, SpecGridDocument, SpecGridSheet,
    SpecRenderOptions, SpecStyleOptions,
};
use crate::style::SpecStyleRegistry;

/// Output encoder for a finished grid document.
pub trait DocumentSink {
    /// Encode the whole document into bytes.
    fn serialize(&self, document: &SpecGridDocument) -> Result<Vec<u8>, ExportError>;

    /// MIME type of the encoded bytes.
    fn content_type(&self) -> &'static str;

    /// File extension without the leading dot.
    fn file_extension(&self) -> &'static str;
}

/// Suggested output file name, e.g. `evaluation_export.xlsx`.
pub fn suggested_file_name(options: &SpecRenderOptions) -> String {
    let c_stem = options.file_name_stem.trim();
    let c_stem = if c_stem.is_empty() {
        "export"
    } else {
        c_stem
    };
    format!("{c_stem}.{C_FILE_EXTENSION_XLSX}")
}

/// Workbook writer backed by `rust_xlsxwriter`.
pub struct XlsxWriter {
    registry: SpecStyleRegistry,
}

impl XlsxWriter {
    pub fn new(style_options: &SpecStyleOptions) -> Self {
        Self {
            registry: SpecStyleRegistry::new(style_options),
        }
    }

    /// Encode `document` and write it to `path_file_out`.
    pub fn save(&self, document: &SpecGridDocument, path_file_out: &Path) -> Result<(), ExportError> {
        let v_bytes = self.serialize(document)?;
        std::fs::write(path_file_out, v_bytes).map_err(|e| ExportError::Io {
            path: path_file_out.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::info!(path = %path_file_out.display(), "workbook saved");
        Ok(())
    }

    fn derive_workbook(&self, document: &SpecGridDocument) -> Result<Workbook, ExportError> {
        let mut workbook = Workbook::new();
        let mut dict_formats: BTreeMap<EnumStyleKey, Format> = BTreeMap::new();

        for sheet in &document.sheets {
            for cell in sheet.cells.values() {
                dict_formats
                    .entry(cell.style)
                    .or_insert_with(|| derive_rust_xlsx_format(&self.registry.resolve(cell.style)));
            }

            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(derive_xlsx_error_text)?;
            write_sheet(worksheet, sheet, &dict_formats)?;
            tracing::debug!(
                sheet = %sheet.name,
                n_cells = sheet.cells.len(),
                n_merges = sheet.merges.len(),
                "sheet written"
            );
        }
        Ok(workbook)
    }
}

impl DocumentSink for XlsxWriter {
    fn serialize(&self, document: &SpecGridDocument) -> Result<Vec<u8>, ExportError> {
        let mut workbook = self.derive_workbook(document)?;
        workbook.save_to_buffer().map_err(derive_xlsx_error_text)
    }

    fn content_type(&self) -> &'static str {
        C_CONTENT_TYPE_XLSX
    }

    fn file_extension(&self) -> &'static str {
        C_FILE_EXTENSION_XLSX
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SpecGridSheet,
    dict_formats: &BTreeMap<EnumStyleKey, Format>,
) -> Result<(), ExportError> {
    let fmt_default = Format::new();

    let mut set_cells_merged: BTreeSet<(usize, usize)> = BTreeSet::new();
    for merge in &sheet.merges {
        for row in merge.row_start..=merge.row_end {
            for col in merge.col_start..=merge.col_end {
                set_cells_merged.insert((row, col));
            }
        }
    }

    for (&(row_idx, col_idx), cell) in &sheet.cells {
        if set_cells_merged.contains(&(row_idx, col_idx)) {
            continue;
        }
        let format = dict_formats.get(&cell.style).unwrap_or(&fmt_default);
        write_cell_with_format(worksheet, row_idx, col_idx, &cell.value, format)?;
    }

    for merge in &sheet.merges {
        let cell_anchor = sheet.cell(merge.row_start, merge.col_start);
        let format = cell_anchor
            .and_then(|c| dict_formats.get(&c.style))
            .unwrap_or(&fmt_default);
        let c_text = cell_anchor.and_then(|c| c.value.as_str()).unwrap_or("");

        worksheet
            .merge_range(
                cast_row_num(merge.row_start)?,
                cast_col_num(merge.col_start)?,
                cast_row_num(merge.row_end)?,
                cast_col_num(merge.col_end)?,
                c_text,
                format,
            )
            .map_err(derive_xlsx_error_text)?;

        // merge_range only carries text; numbers go back onto the anchor.
        if let Some(cell) = cell_anchor
            && let EnumCellValue::Number(_) = cell.value
        {
            write_cell_with_format(worksheet, merge.row_start, merge.col_start, &cell.value, format)?;
        }
    }

    for (&col_idx, &width) in &sheet.col_widths {
        worksheet
            .set_column_width(cast_col_num(col_idx)?, width)
            .map_err(derive_xlsx_error_text)?;
    }

    if let Some((row_freeze, col_freeze)) = sheet.freeze {
        worksheet
            .set_freeze_panes(cast_row_num(row_freeze)?, cast_col_num(col_freeze)?)
            .map_err(derive_xlsx_error_text)?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), ExportError> {
    let (row_num, col_num) = (cast_row_num(row_idx)?, cast_col_num(col_idx)?);
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(row_num, col_num, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(row_num, col_num, val, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(row_num, col_num, *val, format)
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }
    if spec.underline.unwrap_or(false) {
        format = format.set_underline(FormatUnderline::Single);
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, ExportError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ExportError::IndexOverflow(format!(
            "row index overflow: {value} (max {})",
            N_NROWS_EXCEL_MAX - 1
        )));
    }
    u32::try_from(value).map_err(|_| ExportError::IndexOverflow(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, ExportError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ExportError::IndexOverflow(format!(
            "column index overflow: {value} (max {})",
            N_NCOLS_EXCEL_MAX - 1
        )));
    }
    u16::try_from(value)
        .map_err(|_| ExportError::IndexOverflow(format!("column index overflow: {value}")))
}

fn derive_xlsx_error_text(err: XlsxError) -> ExportError {
    ExportError::Xlsx(err.to_string())
}
