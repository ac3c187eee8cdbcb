//! Payload to grid document orchestration.

use crate::flatten::{derive_blocks, derive_schema_notes};
use crate::payload::SpecEvaluationPayload;
use crate::sheet::{build_empty_sheet, build_evaluator_sheet};
use crate::spec::{ExportError, SpecExportReport, SpecGridDocument, SpecRenderOptions};
use crate::summary::build_summary_sheet;
use crate::util::{SpecSheetNameRegistry, create_sheet_identifier, sanitize_sheet_name};
use crate::writer::{DocumentSink, XlsxWriter};

/// Decode a JSON payload.
pub fn parse_payload(payload_json: &str) -> Result<SpecEvaluationPayload, ExportError> {
    serde_json::from_str(payload_json).map_err(|e| ExportError::InvalidPayload(e.to_string()))
}

/// Decode JSON render options; `None` or blank input yields the defaults.
pub fn parse_render_options(options_json: Option<&str>) -> Result<SpecRenderOptions, ExportError> {
    match options_json.map(str::trim) {
        None | Some("") => Ok(SpecRenderOptions::default()),
        Some(c_json) => serde_json::from_str(c_json)
            .map_err(|e| ExportError::InvalidPayload(format!("render options: {e}"))),
    }
}

/// Build the grid document: one page per evaluator, then the summary page.
///
/// Without evaluators the document holds a single placeholder page.
pub fn build_evaluation_document(
    payload: &SpecEvaluationPayload,
    options: &SpecRenderOptions,
) -> SpecGridDocument {
    let mut report = SpecExportReport::default();
    let mut registry = SpecSheetNameRegistry::new();

    if payload.evaluators.is_empty() {
        let c_name = registry.derive_unique_sheet_name(
            &sanitize_sheet_name(&options.empty_sheet_name, "_"),
            &mut report,
        );
        tracing::info!(sheet = %c_name, "no evaluator in payload, emitting placeholder sheet");
        return SpecGridDocument {
            sheets: vec![build_empty_sheet(&c_name, options)],
            report,
        };
    }

    let l_blocks = derive_blocks(payload.iter_schemas(), options);
    let l_notes: Vec<String> = payload.iter_schemas().flat_map(derive_schema_notes).collect();
    let schema_primary = payload.iter_schemas().next();

    let mut l_sheets = Vec::with_capacity(payload.evaluators.len() + 1);
    for (idx_evaluator, evaluator) in payload.evaluators.iter().enumerate() {
        let c_evaluator_name = evaluator
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(options.default_evaluator_name.as_str());
        let c_name = registry.derive_unique_sheet_name(
            &create_sheet_identifier(idx_evaluator + 1, c_evaluator_name),
            &mut report,
        );
        l_sheets.push(build_evaluator_sheet(
            &c_name,
            evaluator,
            schema_primary,
            &l_blocks,
            &l_notes,
            options,
        ));
    }
    report.n_evaluator_sheets = l_sheets.len();

    if options.include_summary {
        let c_name = registry.derive_unique_sheet_name(
            &sanitize_sheet_name(&options.summary_sheet_name, "_"),
            &mut report,
        );
        let (sheet_summary, n_entries) = build_summary_sheet(&c_name, &payload.evaluators, options);
        report.n_summary_entries = n_entries;
        l_sheets.push(sheet_summary);
    }

    tracing::info!(
        n_sheets = l_sheets.len(),
        n_blocks = l_blocks.len(),
        n_summary_entries = report.n_summary_entries,
        "evaluation document built"
    );
    SpecGridDocument {
        sheets: l_sheets,
        report,
    }
}

/// Build and serialize the workbook in one call.
pub fn render_evaluation_workbook(
    payload: &SpecEvaluationPayload,
    options: &SpecRenderOptions,
) -> Result<Vec<u8>, ExportError> {
    let document = build_evaluation_document(payload, options);
    XlsxWriter::new(&options.style).serialize(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::SpecEvaluator;

    fn evaluator(name: Option<&str>) -> SpecEvaluator {
        SpecEvaluator {
            name: name.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_evaluators_yields_placeholder_only() {
        let options = SpecRenderOptions::default();
        let document = build_evaluation_document(&SpecEvaluationPayload::default(), &options);

        assert_eq!(document.sheet_names(), vec!["Export"]);
        assert_eq!(
            document.sheets[0].text_at(0, 0),
            Some(options.labels.no_data.as_str())
        );
    }

    #[test]
    fn test_sheet_names_are_prefixed_sanitized_and_ordered() {
        let payload = SpecEvaluationPayload {
            evaluators: vec![
                evaluator(Some("Tran B")),
                evaluator(Some("Tran B")),
                evaluator(None),
                evaluator(Some("Le/C: [head]")),
                evaluator(Some("A very long evaluator name that overflows")),
            ],
            ..Default::default()
        };
        let document = build_evaluation_document(&payload, &SpecRenderOptions::default());
        let l_names = document.sheet_names();

        assert_eq!(
            l_names[..4],
            ["01-Tran B", "02-Tran B", "03-Evaluator", "04-Le_C_ _head_"]
        );
        assert_eq!(l_names[4].chars().count(), 31);
        assert!(l_names[4].starts_with("05-A very long"));
        assert_eq!(l_names[5], "00-Summary");
        assert_eq!(document.report.n_evaluator_sheets, 5);
        assert!(document.report.warnings.is_empty());
    }

    #[test]
    fn test_summary_name_collision_is_resolved() {
        let payload = SpecEvaluationPayload {
            evaluators: vec![evaluator(Some("Summary"))],
            ..Default::default()
        };
        let options = SpecRenderOptions {
            summary_sheet_name: "01-summary".to_string(),
            ..Default::default()
        };
        let document = build_evaluation_document(&payload, &options);

        assert_eq!(document.sheet_names(), vec!["01-Summary", "01-summary__2"]);
        assert_eq!(document.report.warnings.len(), 1);
    }

    #[test]
    fn test_summary_can_be_disabled() {
        let payload = SpecEvaluationPayload {
            evaluators: vec![evaluator(Some("A"))],
            ..Default::default()
        };
        let options = SpecRenderOptions {
            include_summary: false,
            ..Default::default()
        };
        let document = build_evaluation_document(&payload, &options);
        assert_eq!(document.sheet_names(), vec!["01-A"]);
    }

    #[test]
    fn test_parse_errors_are_reported_as_invalid_payload() {
        assert!(matches!(
            parse_payload("{not json"),
            Err(ExportError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_render_options(Some("42")),
            Err(ExportError::InvalidPayload(_))
        ));
        assert_eq!(
            parse_render_options(Some("  ")).ok(),
            Some(SpecRenderOptions::default())
        );
    }
}
