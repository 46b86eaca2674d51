//! Named preset catalogue.

use crate::voice::{VoiceSet, SILENT_SET};

/// Name of the built-in all-off preset.
pub const SILENCE: &str = "silence";

/// A named, immutable voice set.
#[derive(Debug, Clone, PartialEq)]
pub struct NameDef {
    /// Preset name (alphanumerics, `-` and `_`).
    pub name: String,
    /// One voice per channel slot.
    pub voices: VoiceSet,
}

/// Preset catalogue, seeded with `silence`.
///
/// Later definitions shadow earlier ones with the same name.
#[derive(Debug, Clone)]
pub struct NameTable {
    defs: Vec<NameDef>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTable {
    /// Creates a table holding only the built-in presets.
    pub fn new() -> Self {
        Self {
            defs: vec![NameDef {
                name: SILENCE.to_string(),
                voices: SILENT_SET,
            }],
        }
    }

    /// Adds a definition.
    pub fn insert(&mut self, def: NameDef) {
        self.defs.push(def);
    }

    /// Looks up the most recent definition with this name.
    pub fn get(&self, name: &str) -> Option<&NameDef> {
        self.defs.iter().rev().find(|d| d.name == name)
    }

    /// Number of definitions, including built-ins and shadowed entries.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Always false; the built-in preset is present.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Returns true if `name` is a valid preset name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
