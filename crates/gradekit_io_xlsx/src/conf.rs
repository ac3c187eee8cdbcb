//! Layout constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{
    EnumStyleKey, SpecCellFormat, SpecFrontMatter, SpecRenderOptions, SpecStyleOptions,
    SpecTableLabels,
};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Sheet name used when sanitizing leaves nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";

/// MIME type of the XLSX container.
pub const C_CONTENT_TYPE_XLSX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// File extension of the XLSX container.
pub const C_FILE_EXTENSION_XLSX: &str = "xlsx";

/// Table header height in rows.
pub const N_ROWS_TABLE_HEADER: usize = 4;
/// Grid columns taken by the identity columns (order, id, family, given, class).
pub const N_COLS_LEADING: usize = 5;
/// Grid columns taken by total score and remarks.
pub const N_COLS_TRAILING: usize = 2;

/// Last column of the front-matter left block, when the page is wide enough.
pub const N_COL_FRONT_LEFT_END_MAX: usize = 4;
/// Minimum span of the front-matter right block.
pub const N_SPAN_FRONT_RIGHT_MIN: usize = 4;
/// Minimum gap between the front-matter left and right blocks.
pub const N_GAP_FRONT_MIN: usize = 2;

/// Widths of the leading identity columns.
pub const TUP_WIDTH_LEADING: [f64; N_COLS_LEADING] = [6.0, 18.0, 22.0, 14.0, 18.0];
/// Width of one leaf (or summary score) column.
pub const N_WIDTH_LEAF: f64 = 12.0;
/// Width of the total (or average) column.
pub const N_WIDTH_TOTAL: f64 = 14.0;
/// Width of the remarks column.
pub const N_WIDTH_REMARK: f64 = 28.0;

/// Default block fills: rose, light green, lavender, light cornflower blue.
pub const TUP_BLOCK_PALETTE_DEFAULT: [&str; 4] = ["#FF99CC", "#CCFFCC", "#CC99FF", "#CCCCFF"];

/// Build default header captions.
pub fn derive_default_table_labels() -> SpecTableLabels {
    SpecTableLabels {
        order: "No.".to_string(),
        subject_id: "Student ID".to_string(),
        subject_name: "Full name".to_string(),
        class_name: "Class".to_string(),
        total_score: "Total score".to_string(),
        remark: "Other remarks on the student".to_string(),
        block_title_default: "CLO and criteria results".to_string(),
        summary_score_title: "Overall score".to_string(),
        summary_score_prefix: "Score".to_string(),
        summary_average: "Average score".to_string(),
        no_data: "No data to export".to_string(),
    }
}

/// Build default letterhead texts.
pub fn derive_default_front_matter() -> SpecFrontMatter {
    SpecFrontMatter {
        form_code: "Form ATN.03A".to_string(),
        organisation_primary: "MINISTRY OF INFORMATION AND COMMUNICATIONS".to_string(),
        organisation_secondary: "POSTS AND TELECOMMUNICATIONS INSTITUTE OF TECHNOLOGY"
            .to_string(),
        national_heading: "SOCIALIST REPUBLIC OF VIETNAM".to_string(),
        motto: "Independence - Freedom - Happiness".to_string(),
        date_line: "Ha Noi, day .... month .... year ....".to_string(),
        title_default: "Evaluation form".to_string(),
        subtitle: "For graduation projects".to_string(),
        section_general: "I. GENERAL INFORMATION".to_string(),
        program_label: "Full-time undergraduate program:".to_string(),
        academic_year_label: "Academic year:".to_string(),
        council_label: "Specialist council no.:".to_string(),
        evaluator_label: "Evaluator:".to_string(),
        role_label: "Role in council:".to_string(),
        department_label: "Department:".to_string(),
        section_results: "II. EVALUATION RESULTS".to_string(),
        scoring_note:
            "Each criterion is scored on a 10-point scale, rounded to one decimal place."
                .to_string(),
        notes_heading: "Notes:".to_string(),
        signature_title: "EVALUATOR".to_string(),
    }
}

/// Build default fonts and colors.
pub fn derive_default_style_options() -> SpecStyleOptions {
    SpecStyleOptions {
        font_name: "Times New Roman".to_string(),
        font_size: 12,
        font_size_title: 14,
        block_palette: TUP_BLOCK_PALETTE_DEFAULT
            .iter()
            .map(|c| c.to_string())
            .collect(),
        color_weight: "#FF0000".to_string(),
        color_highlight: "#FFFF99".to_string(),
    }
}

/// Build default render options.
pub fn derive_default_render_options() -> SpecRenderOptions {
    SpecRenderOptions {
        labels: derive_default_table_labels(),
        front_matter: derive_default_front_matter(),
        style: derive_default_style_options(),
        summary_sheet_name: "00-Summary".to_string(),
        empty_sheet_name: "Export".to_string(),
        default_evaluator_name: "Evaluator".to_string(),
        file_name_stem: "evaluation_export".to_string(),
        include_summary: true,
        include_notes: true,
    }
}

/// Build the fixed (non-block) format presets keyed by style identity.
pub fn derive_default_cell_formats(
    style_options: &SpecStyleOptions,
) -> BTreeMap<EnumStyleKey, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some(style_options.font_name.clone()),
        font_size: Some(style_options.font_size),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_center = SpecCellFormat {
        align: Some("center".to_string()),
        ..Default::default()
    };
    let cfg_bordered = SpecCellFormat {
        border: Some(1),
        ..Default::default()
    };
    let cfg_header_fmt_spec = cfg_base_fmt_spec
        .merge(&cfg_center)
        .merge(&cfg_bordered)
        .with_(SpecCellFormat {
            bold: Some(true),
            text_wrap: Some(true),
            ..Default::default()
        });
    let cfg_cell_left = cfg_base_fmt_spec.merge(&cfg_bordered);
    let cfg_cell_center = cfg_cell_left.merge(&cfg_center);
    let cfg_highlight = SpecCellFormat {
        bg_color: Some(style_options.color_highlight.clone()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumStyleKey::PlainLeft, cfg_base_fmt_spec.clone());
    dict_fmt.insert(EnumStyleKey::PlainCenter, cfg_base_fmt_spec.merge(&cfg_center));
    dict_fmt.insert(
        EnumStyleKey::BoldLeft,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::BoldCenter,
        cfg_base_fmt_spec.merge(&cfg_center).with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::BoldUnderlineCenter,
        cfg_base_fmt_spec.merge(&cfg_center).with_(SpecCellFormat {
            bold: Some(true),
            underline: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::ItalicLeft,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            italic: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::ItalicCenter,
        cfg_base_fmt_spec.merge(&cfg_center).with_(SpecCellFormat {
            italic: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::Title,
        cfg_base_fmt_spec.merge(&cfg_center).with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(style_options.font_size_title),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::Note,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            italic: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::NoteHeading,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            italic: Some(true),
            text_wrap: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::NoteEmphasis,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            italic: Some(true),
            text_wrap: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumStyleKey::Header, cfg_header_fmt_spec.clone());
    dict_fmt.insert(
        EnumStyleKey::HeaderWeight,
        cfg_header_fmt_spec.with_(SpecCellFormat {
            font_color: Some(style_options.color_weight.clone()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumStyleKey::CellCenter, cfg_cell_center.clone());
    dict_fmt.insert(EnumStyleKey::CellLeft, cfg_cell_left.clone());
    dict_fmt.insert(
        EnumStyleKey::CellLeftWrap,
        cfg_cell_left.with_(SpecCellFormat {
            text_wrap: Some(true),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumStyleKey::SummaryAverageHeader,
        cfg_header_fmt_spec.merge(&cfg_highlight),
    );
    dict_fmt.insert(
        EnumStyleKey::SummaryAverageCell,
        cfg_cell_center.merge(&cfg_highlight).with_(SpecCellFormat {
            num_format: Some("0.00".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}
