//! Schema flattening: groups of criteria become an ordered list of leaf columns.

use crate::payload::{SpecCriterion, SpecGroup, SpecSchema};
use crate::spec::SpecRenderOptions;
use crate::style::derive_palette_slot;
use crate::util::{derive_text_or_empty, format_weight_percent};

/// One rendered grid column derived from a criterion or a group placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLeafColumn {
    /// Criterion id; `None` for the placeholder of a criteria-less group.
    pub criterion_id: Option<String>,
    /// Header text of the criterion row.
    pub label: String,
    /// Header text of the group row.
    pub group_label: String,
    /// Weight annotation (`"25%"`), empty when no weight is known.
    pub weight_text: String,
}

/// One rendered schema: a contiguous run of leaf columns under one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBlock {
    pub title: String,
    pub leaves: Vec<SpecLeafColumn>,
    /// Palette slot shared by every header and body cell of the block.
    pub palette_slot: usize,
    /// Form identity (`evaluationId`, else `formKey`) matched against the
    /// evaluation id of a record's result.
    pub evaluation_id: Option<String>,
}

impl SpecBlock {
    /// Number of grid columns taken by the block.
    pub fn span(&self) -> usize {
        self.leaves.len()
    }

    /// Whether a result tagged `result_evaluation_id` may fill this block.
    ///
    /// Only two known, different ids exclude each other.
    pub fn accepts_result(&self, result_evaluation_id: Option<&str>) -> bool {
        match (self.evaluation_id.as_deref(), result_evaluation_id) {
            (Some(c_block_id), Some(c_result_id)) => c_block_id == c_result_id,
            _ => true,
        }
    }
}

/// Trimmed, non-empty view of an optional id.
pub fn derive_nonempty_id(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Group header text: name, then id, then empty.
pub fn derive_group_label(group: &SpecGroup) -> String {
    [group.name.as_deref(), group.id.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Criterion header text: id, then name, then empty.
pub fn derive_criterion_label(criterion: &SpecCriterion) -> String {
    [criterion.id.as_deref(), criterion.name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Number of leaf columns a schema renders to.
pub fn count_leaf_columns(schema: Option<&SpecSchema>) -> usize {
    schema.map_or(0, |s| {
        s.groups
            .iter()
            .map(|g| usize::max(1, g.criteria.len()))
            .sum()
    })
}

/// Flatten a schema into leaf columns in declaration order.
///
/// A group without criteria contributes exactly one placeholder leaf with no
/// criterion id. A criterion without its own weight shows its group's weight.
pub fn flatten_schema(schema: Option<&SpecSchema>) -> Vec<SpecLeafColumn> {
    let Some(schema) = schema else {
        return vec![];
    };

    let mut l_leaves = Vec::with_capacity(count_leaf_columns(Some(schema)));
    for group in &schema.groups {
        let c_group_label = derive_group_label(group);

        if group.criteria.is_empty() {
            l_leaves.push(SpecLeafColumn {
                criterion_id: None,
                label: String::new(),
                group_label: c_group_label,
                weight_text: format_weight_percent(group.weight),
            });
            continue;
        }

        for criterion in &group.criteria {
            l_leaves.push(SpecLeafColumn {
                criterion_id: criterion.id.clone(),
                label: derive_criterion_label(criterion),
                group_label: c_group_label.clone(),
                weight_text: format_weight_percent(criterion.weight.or(group.weight)),
            });
        }
    }

    l_leaves
}

/// Build one block per schema, skipping schemas with no leaf columns.
///
/// Palette slots follow the position among the emitted blocks.
pub fn derive_blocks<'a>(
    schemas: impl IntoIterator<Item = &'a SpecSchema>,
    options: &SpecRenderOptions,
) -> Vec<SpecBlock> {
    let n_palette = options.style.block_palette.len();
    let mut l_blocks = Vec::new();

    for schema in schemas {
        let l_leaves = flatten_schema(Some(schema));
        if l_leaves.is_empty() {
            tracing::debug!(title = ?schema.title, "skip schema without groups");
            continue;
        }

        let c_title = derive_text_or_empty(schema.title.as_ref()).trim();
        let title = if c_title.is_empty() {
            options.labels.block_title_default.clone()
        } else {
            c_title.to_string()
        };

        let evaluation_id = derive_nonempty_id(schema.evaluation_id.as_deref())
            .or_else(|| derive_nonempty_id(schema.form_key.as_deref()))
            .map(str::to_string);

        l_blocks.push(SpecBlock {
            title,
            leaves: l_leaves,
            palette_slot: derive_palette_slot(l_blocks.len(), n_palette),
            evaluation_id,
        });
    }

    l_blocks
}

/// Collect note lines (`"<label>: <description>"`) from the schema, group
/// and criterion descriptions, in declaration order.
pub fn derive_schema_notes(schema: &SpecSchema) -> Vec<String> {
    let mut l_notes = Vec::new();

    let c_description = derive_text_or_empty(schema.description.as_ref()).trim();
    if !c_description.is_empty() {
        let c_title = derive_text_or_empty(schema.title.as_ref()).trim();
        l_notes.push(format_note(c_title, c_description));
    }

    for group in &schema.groups {
        let c_description = derive_text_or_empty(group.description.as_ref()).trim();
        if !c_description.is_empty() {
            l_notes.push(format_note(&derive_group_label(group), c_description));
        }
        for criterion in &group.criteria {
            let c_description = derive_text_or_empty(criterion.description.as_ref()).trim();
            if !c_description.is_empty() {
                l_notes.push(format_note(&derive_criterion_label(criterion), c_description));
            }
        }
    }

    l_notes
}

fn format_note(label: &str, description: &str) -> String {
    if label.is_empty() {
        description.to_string()
    } else {
        format!("{label}: {description}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, weight: Option<f64>, criteria: Vec<SpecCriterion>) -> SpecGroup {
        SpecGroup {
            id: Some(id.to_string()),
            name: Some(format!("{id} name")),
            weight,
            criteria,
            ..Default::default()
        }
    }

    fn criterion(id: &str, weight: Option<f64>) -> SpecCriterion {
        SpecCriterion {
            id: Some(id.to_string()),
            weight,
            ..Default::default()
        }
    }

    #[test]
    fn test_flatten_column_count_matches_groups() {
        let schema = SpecSchema {
            groups: vec![
                group("G1", None, vec![criterion("C1", None), criterion("C2", None)]),
                group("G2", None, vec![]),
                group("G3", None, vec![criterion("C3", None)]),
            ],
            ..Default::default()
        };

        let l_leaves = flatten_schema(Some(&schema));
        assert_eq!(l_leaves.len(), 4);
        assert_eq!(count_leaf_columns(Some(&schema)), 4);
        assert_eq!(l_leaves[2].criterion_id, None);
        assert_eq!(l_leaves[2].group_label, "G2 name");
        assert_eq!(l_leaves[2].label, "");
        assert_eq!(l_leaves[3].group_label, "G3 name");

        assert!(flatten_schema(None).is_empty());
        assert_eq!(count_leaf_columns(None), 0);
    }

    #[test]
    fn test_criterion_weight_falls_back_to_group_weight() {
        let schema = SpecSchema {
            groups: vec![
                group("G1", Some(0.4), vec![criterion("C1", Some(0.25)), criterion("C2", None)]),
                group("G2", None, vec![criterion("C3", None)]),
                group("G3", Some(0.1), vec![]),
            ],
            ..Default::default()
        };

        let l_weights: Vec<String> = flatten_schema(Some(&schema))
            .into_iter()
            .map(|l| l.weight_text)
            .collect();
        assert_eq!(l_weights, vec!["25%", "40%", "", "10%"]);
    }

    #[test]
    fn test_labels_fall_back_between_name_and_id() {
        let group_unnamed = SpecGroup {
            id: Some("CLO1".to_string()),
            ..Default::default()
        };
        assert_eq!(derive_group_label(&group_unnamed), "CLO1");

        let criterion_named = SpecCriterion {
            name: Some("Presentation".to_string()),
            ..Default::default()
        };
        assert_eq!(derive_criterion_label(&criterion_named), "Presentation");
        assert_eq!(derive_criterion_label(&SpecCriterion::default()), "");
    }

    #[test]
    fn test_derive_blocks_skips_empty_schemas_and_cycles_palette() {
        let options = SpecRenderOptions::default();
        let schema_full = SpecSchema {
            title: Some("Form".to_string()),
            groups: vec![group("G1", None, vec![])],
            ..Default::default()
        };
        let schema_empty = SpecSchema::default();
        let l_schemas: Vec<SpecSchema> = vec![
            schema_full.clone(),
            schema_empty,
            schema_full.clone(),
            schema_full.clone(),
            schema_full.clone(),
            SpecSchema {
                title: None,
                ..schema_full
            },
        ];

        let l_blocks = derive_blocks(&l_schemas, &options);
        assert_eq!(l_blocks.len(), 5);
        let l_slots: Vec<usize> = l_blocks.iter().map(|b| b.palette_slot).collect();
        assert_eq!(l_slots, vec![0, 1, 2, 3, 0]);
        assert_eq!(l_blocks[4].title, options.labels.block_title_default);
    }

    #[test]
    fn test_block_identity_prefers_evaluation_id_over_form_key() {
        let options = SpecRenderOptions::default();
        let l_schemas = vec![
            SpecSchema {
                evaluation_id: Some("W1".to_string()),
                form_key: Some("guider".to_string()),
                groups: vec![group("G1", None, vec![])],
                ..Default::default()
            },
            SpecSchema {
                evaluation_id: Some("  ".to_string()),
                form_key: Some("reviewer".to_string()),
                groups: vec![group("G2", None, vec![])],
                ..Default::default()
            },
            SpecSchema {
                groups: vec![group("G3", None, vec![])],
                ..Default::default()
            },
        ];

        let l_blocks = derive_blocks(&l_schemas, &options);
        let l_ids: Vec<Option<&str>> = l_blocks.iter().map(|b| b.evaluation_id.as_deref()).collect();
        assert_eq!(l_ids, vec![Some("W1"), Some("reviewer"), None]);

        assert!(l_blocks[0].accepts_result(Some("W1")));
        assert!(!l_blocks[0].accepts_result(Some("W2")));
        assert!(l_blocks[0].accepts_result(None));
        assert!(l_blocks[2].accepts_result(Some("W2")));
    }

    #[test]
    fn test_derive_schema_notes() {
        let schema = SpecSchema {
            title: Some("Council form".to_string()),
            description: Some("Scores range from 0 to 10".to_string()),
            groups: vec![SpecGroup {
                name: Some("CLO 3".to_string()),
                description: Some("Design hardware".to_string()),
                criteria: vec![
                    SpecCriterion {
                        id: Some("C3.3".to_string()),
                        description: Some(" Run experiments ".to_string()),
                        ..Default::default()
                    },
                    criterion("C3.4", None),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(
            derive_schema_notes(&schema),
            vec![
                "Council form: Scores range from 0 to 10",
                "CLO 3: Design hardware",
                "C3.3: Run experiments"
            ]
        );
    }
}
