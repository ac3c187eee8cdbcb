//! Stateless helpers shared by the layout builders.

use std::collections::BTreeSet;

use crate::conf::{C_SHEET_NAME_FALLBACK, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumStyleKey, SpecExportReport};

////////////////////////////////////////////////////////////////////////////////
// #region TextNormalization

/// Borrow an optional string as `&str`, empty when absent.
pub fn derive_text_or_empty(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

/// Format a 0-1 weight fraction as a whole percentage (`0.25 -> "25%"`).
///
/// Halves round away from zero.
pub fn format_weight_percent(weight: Option<f64>) -> String {
    match weight {
        Some(w) if w.is_finite() => format!("{:.0}%", (w * 100.0).round()),
        _ => String::new(),
    }
}

/// Split a full name at its last whitespace run into `(family, given)`.
///
/// Whitespace is collapsed first; a single token becomes the given part.
pub fn split_subject_name(full_name: Option<&str>) -> (String, String) {
    let l_tokens: Vec<&str> = full_name.unwrap_or("").split_whitespace().collect();
    match l_tokens.split_last() {
        None => (String::new(), String::new()),
        Some((given, family)) => (family.join(" "), given.to_string()),
    }
}

/// Label a remark with its evaluator (`"<name>: <remark>"`).
///
/// Both parts are trimmed; an empty remark yields an empty string and an
/// empty name yields the bare remark.
pub fn label_remark(evaluator_name: Option<&str>, remark: Option<&str>) -> String {
    let c_remark = remark.unwrap_or("").trim();
    if c_remark.is_empty() {
        return String::new();
    }
    let c_name = evaluator_name.unwrap_or("").trim();
    if c_name.is_empty() {
        c_remark.to_string()
    } else {
        format!("{c_name}: {c_remark}")
    }
}

/// Arithmetic mean of the present values, `None` when nothing is present.
pub fn calculate_average(values: &[Option<f64>]) -> Option<f64> {
    let l_present: Vec<f64> = values.iter().flatten().copied().collect();
    if l_present.is_empty() {
        return None;
    }
    Some(l_present.iter().sum::<f64>() / l_present.len() as f64)
}

/// Pick the wrapping cell style for multi-line text.
pub fn derive_remark_style(text: &str) -> EnumStyleKey {
    if text.contains('\n') {
        EnumStyleKey::CellLeftWrap
    } else {
        EnumStyleKey::CellLeft
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let c_name_capped: String = trim_sheet_name_edges(&c_name)
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();

    // Capping can expose an apostrophe or a space at the new end.
    let c_name_final = trim_sheet_name_edges(&c_name_capped);
    if c_name_final.is_empty() {
        return C_SHEET_NAME_FALLBACK.to_string();
    }
    c_name_final.to_string()
}

fn trim_sheet_name_edges(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || c == '\'')
}

/// Build the `NN-<name>` identifier of an evaluator page (1-based index).
pub fn create_sheet_identifier(idx_1based: usize, name: &str) -> String {
    sanitize_sheet_name(&format!("{idx_1based:02}-{name}"), "_")
}

/// Registry of sheet names already emitted in one workbook.
///
/// Excel compares sheet names case-insensitively, so the registry does too.
#[derive(Debug, Clone, Default)]
pub struct SpecSheetNameRegistry {
    set_sheet_names_existing: BTreeSet<String>,
}

impl SpecSheetNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, suffixing `__2`, `__3`, ... when it is already taken.
    pub fn derive_unique_sheet_name(&mut self, name: &str, report: &mut SpecExportReport) -> String {
        if self.set_sheet_names_existing.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if self.set_sheet_names_existing.insert(candidate.to_lowercase()) {
                tracing::warn!(from = name, to = %candidate, "sheet name already used, renamed");
                report.warn(format!("Sheet name {name:?} already used; renamed to {candidate:?}."));
                return candidate;
            }
            n_idx += 1;
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderMergeUtils

/// Split a label row into maximal runs of adjacent equal labels.
///
/// Returns inclusive `(start, end)` index pairs covering every position.
/// Empty labels never join a run, and equal labels that are not adjacent
/// stay in separate runs.
pub fn derive_label_runs(labels: &[&str]) -> Vec<(usize, usize)> {
    let mut l_runs = Vec::new();
    let n_len = labels.len();
    let mut n_idx_start = 0;

    while n_idx_start < n_len {
        let c_label = labels[n_idx_start];
        let mut n_idx_end = n_idx_start;
        if !c_label.is_empty() {
            while n_idx_end + 1 < n_len && labels[n_idx_end + 1] == c_label {
                n_idx_end += 1;
            }
        }
        l_runs.push((n_idx_start, n_idx_end));
        n_idx_start = n_idx_end + 1;
    }

    l_runs
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_label_runs_merges_adjacent_only() {
        assert_eq!(
            derive_label_runs(&["A", "A", "B", "A"]),
            vec![(0, 1), (2, 2), (3, 3)]
        );
        assert_eq!(derive_label_runs(&["", ""]), vec![(0, 0), (1, 1)]);
        assert_eq!(derive_label_runs(&["X", "X", "X"]), vec![(0, 2)]);
        assert!(derive_label_runs(&[]).is_empty());
    }

    #[test]
    fn test_format_weight_percent() {
        assert_eq!(format_weight_percent(Some(0.25)), "25%");
        assert_eq!(format_weight_percent(Some(0.125)), "13%");
        assert_eq!(format_weight_percent(Some(1.0)), "100%");
        assert_eq!(format_weight_percent(Some(0.0)), "0%");
        assert_eq!(format_weight_percent(None), "");
        assert_eq!(format_weight_percent(Some(f64::NAN)), "");
    }

    #[test]
    fn test_split_subject_name() {
        assert_eq!(
            split_subject_name(Some("  Nguyen   Van  Anh ")),
            ("Nguyen Van".to_string(), "Anh".to_string())
        );
        assert_eq!(
            split_subject_name(Some("Anh")),
            (String::new(), "Anh".to_string())
        );
        assert_eq!(split_subject_name(None), (String::new(), String::new()));
        assert_eq!(split_subject_name(Some("   ")), (String::new(), String::new()));
    }

    #[test]
    fn test_label_remark() {
        assert_eq!(label_remark(Some(" A "), Some(" good ")), "A: good");
        assert_eq!(label_remark(Some(""), Some("good")), "good");
        assert_eq!(label_remark(None, Some("good")), "good");
        assert_eq!(label_remark(Some("A"), Some("   ")), "");
        assert_eq!(label_remark(Some("A"), None), "");
    }

    #[test]
    fn test_calculate_average() {
        assert_eq!(calculate_average(&[Some(8.0), Some(6.0)]), Some(7.0));
        assert_eq!(calculate_average(&[Some(10.0), Some(6.0), None]), Some(8.0));
        assert_eq!(calculate_average(&[None, None]), None);
        assert_eq!(calculate_average(&[]), None);
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("  ''  ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").chars().count(), 31);
        assert_eq!(create_sheet_identifier(3, "Tran [B]"), "03-Tran _B_");
    }

    #[test]
    fn test_sanitize_sheet_name_never_ends_with_apostrophe_after_cap() {
        let c_evaluator = format!("{}'Brien", "a".repeat(27));
        let c_name = create_sheet_identifier(1, &c_evaluator);

        assert_eq!(c_name, format!("01-{}", "a".repeat(27)));
        assert!(!c_name.ends_with('\''));
        assert_eq!(sanitize_sheet_name(&format!("{}' x", "b".repeat(30)), "_"), "b".repeat(30));
        assert_eq!(sanitize_sheet_name(" ' ", "_"), "Sheet");
    }

    #[test]
    fn test_registry_is_case_insensitive_and_suffixes() {
        let mut registry = SpecSheetNameRegistry::new();
        let mut report = SpecExportReport::default();

        assert_eq!(registry.derive_unique_sheet_name("Sheet", &mut report), "Sheet");
        assert_eq!(registry.derive_unique_sheet_name("SHEET", &mut report), "SHEET__2");
        assert_eq!(registry.derive_unique_sheet_name("sheet", &mut report), "sheet__3");
        assert_eq!(report.warnings.len(), 2);
    }
}
