//! Style registry: maps style keys to concrete cell formats.

use std::collections::BTreeMap;

use crate::conf::derive_default_cell_formats;
use crate::spec::{EnumStyleKey, SpecCellFormat, SpecStyleOptions};

/// Palette slot of the block at position `idx_block`.
pub fn derive_palette_slot(idx_block: usize, n_palette: usize) -> usize {
    if n_palette == 0 {
        return 0;
    }
    idx_block % n_palette
}

/// Resolves every [`EnumStyleKey`] of one build into a [`SpecCellFormat`].
#[derive(Debug, Clone)]
pub struct SpecStyleRegistry {
    dict_fmt_base: BTreeMap<EnumStyleKey, SpecCellFormat>,
    l_palette: Vec<String>,
}

impl SpecStyleRegistry {
    pub fn new(style_options: &SpecStyleOptions) -> Self {
        Self {
            dict_fmt_base: derive_default_cell_formats(style_options),
            l_palette: style_options.block_palette.clone(),
        }
    }

    /// Resolve a style key. Block keys overlay their palette fill on the
    /// matching base format; an empty palette leaves them unfilled.
    pub fn resolve(&self, key: EnumStyleKey) -> SpecCellFormat {
        let (key_base, slot) = match key {
            EnumStyleKey::BlockHeader(slot) => (EnumStyleKey::Header, Some(slot)),
            EnumStyleKey::BlockWeight(slot) => (EnumStyleKey::HeaderWeight, Some(slot)),
            EnumStyleKey::BlockCell(slot) => (EnumStyleKey::CellCenter, Some(slot)),
            other => (other, None),
        };

        let fmt_base = self
            .dict_fmt_base
            .get(&key_base)
            .cloned()
            .unwrap_or_default();

        match slot.and_then(|n| self.derive_palette_color(n)) {
            Some(c_color) => fmt_base.with_(SpecCellFormat {
                bg_color: Some(c_color.to_string()),
                ..Default::default()
            }),
            None => fmt_base,
        }
    }

    fn derive_palette_color(&self, slot: usize) -> Option<&str> {
        if self.l_palette.is_empty() {
            return None;
        }
        self.l_palette
            .get(derive_palette_slot(slot, self.l_palette.len()))
            .map(String::as_str)
    }
}
