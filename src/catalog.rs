use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use midi_to_datapack::config::DEFAULT_INSTRUMENT;

/// List of sound event names the user can pick an instrument from,
/// read from a JSON array such as `["block.note_block.harp", ...]`.
#[derive(Debug, Clone, Default)]
pub struct SoundCatalog {
    pub sounds: Vec<String>,
}

impl SoundCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sound list: {}", path.display()))?;
        let sounds: Vec<String> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse sound list: {}", path.display()))?;
        debug!(count = sounds.len(), path = %path.display(), "sound catalog loaded");
        Ok(SoundCatalog { sounds })
    }

    /// The harp if the catalog has it, otherwise the first entry
    pub fn default_instrument(&self) -> &str {
        if self.sounds.iter().any(|s| s == DEFAULT_INSTRUMENT) {
            DEFAULT_INSTRUMENT
        } else {
            self.sounds.first().map(String::as_str).unwrap_or(DEFAULT_INSTRUMENT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefers_harp() {
        let catalog = SoundCatalog {
            sounds: vec!["block.note_block.bass".into(), "block.note_block.harp".into()],
        };
        assert_eq!(catalog.default_instrument(), "block.note_block.harp");
    }

    #[test]
    fn test_default_falls_back_to_first() {
        let catalog = SoundCatalog {
            sounds: vec!["block.note_block.bell".into()],
        };
        assert_eq!(catalog.default_instrument(), "block.note_block.bell");
        assert_eq!(SoundCatalog::default().default_instrument(), DEFAULT_INSTRUMENT);
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soundlist.json");
        std::fs::write(&path, r#"["a.b", "c.d"]"#).unwrap();
        let catalog = SoundCatalog::load(&path).unwrap();
        assert_eq!(catalog.sounds, vec!["a.b", "c.d"]);

        std::fs::write(&path, "{}").unwrap();
        assert!(SoundCatalog::load(&path).is_err());
    }
}
