//! Per-user import preferences

use serde::{Deserialize, Serialize};

/// Flags read once at the start of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPreferences {
    /// User plays on a Steam Deck; enables compatibility lookups
    pub check_deck_compatibility: bool,

    /// Replace the whole PC library on import instead of adding new titles
    pub replace_on_import: bool,
}
