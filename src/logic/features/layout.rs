//! Feature Layout
//!
//! Column order of the model input. Both artifacts record the version
//! and a CRC32 of this layout; a stored model trained on another layout
//! is refused on load.
//!
//! Any change to `FEATURE_LAYOUT` (new column, reordering, removal)
//! must bump `FEATURE_VERSION`.

use crc32fast::Hasher;
use thiserror::Error;

pub const FEATURE_VERSION: u8 = 1;

/// Column names, in vector order
pub const FEATURE_LAYOUT: &[&str] = &["tension", "courant", "puissance"];

pub const FEATURE_COUNT: usize = 3;

pub const VOLTAGE_INDEX: usize = 0;
pub const CURRENT_INDEX: usize = 1;
pub const POWER_INDEX: usize = 2;

/// CRC32 over the version byte and the NUL-separated column names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Artifact built for feature layout v{found_version} ({found_hash:08x}), \
     pipeline uses v{current_version} ({current_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub current_version: u8,
    pub current_hash: u32,
    pub found_version: u8,
    pub found_hash: u32,
}

/// Check stored layout metadata against the compiled-in layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();
    if version == FEATURE_VERSION && hash == current_hash {
        return Ok(());
    }
    Err(LayoutMismatchError {
        current_version: FEATURE_VERSION,
        current_hash,
        found_version: version,
        found_hash: hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_names() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_LAYOUT[VOLTAGE_INDEX], "tension");
        assert_eq!(FEATURE_LAYOUT[CURRENT_INDEX], "courant");
        assert_eq!(FEATURE_LAYOUT[POWER_INDEX], "puissance");
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());

        let err = validate_layout(FEATURE_VERSION + 1, layout_hash()).unwrap_err();
        assert_eq!(err.current_version, FEATURE_VERSION);
        assert_eq!(err.found_version, FEATURE_VERSION + 1);

        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }
}
