// Preset stores - Key/value collaborators for saving and loading presets

use crate::preset::PresetError;
use crate::preset::serialization::{deserialize_from_ron, serialize_to_ron};
use crate::preset::types::SequencerPreset;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension used by FilePresetStore
pub const PRESET_EXTENSION: &str = "ron";

/// Opaque save/load collaborator for presets
pub trait PresetStore {
    /// Save under `key`, replacing any existing preset
    fn save(&mut self, key: &str, preset: &SequencerPreset) -> Result<(), PresetError>;

    fn load(&self, key: &str) -> Result<SequencerPreset, PresetError>;

    /// Stored keys in sorted order
    fn list(&self) -> Result<Vec<String>, PresetError>;

    fn delete(&mut self, key: &str) -> Result<(), PresetError>;
}

/// Keys become file names, so only a conservative character set is accepted
fn validate_key(key: &str) -> Result<(), PresetError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
        && key.trim() == key;
    if valid {
        Ok(())
    } else {
        Err(PresetError::InvalidKey(key.to_string()))
    }
}

/// In-memory store (tests, scratch presets)
#[derive(Debug, Default)]
pub struct MemoryPresetStore {
    presets: BTreeMap<String, SequencerPreset>,
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStore for MemoryPresetStore {
    fn save(&mut self, key: &str, preset: &SequencerPreset) -> Result<(), PresetError> {
        validate_key(key)?;
        preset.validate()?;
        self.presets.insert(key.to_string(), preset.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<SequencerPreset, PresetError> {
        self.presets
            .get(key)
            .cloned()
            .ok_or_else(|| PresetError::NotFound(key.to_string()))
    }

    fn list(&self) -> Result<Vec<String>, PresetError> {
        Ok(self.presets.keys().cloned().collect())
    }

    fn delete(&mut self, key: &str) -> Result<(), PresetError> {
        self.presets
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| PresetError::NotFound(key.to_string()))
    }
}

/// Directory of RON files, one per key
#[derive(Debug, Clone)]
pub struct FilePresetStore {
    dir: PathBuf,
}

impl FilePresetStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the user data directory, if the platform has one
    pub fn in_user_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("mymusic_stepseq").join("presets")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PresetError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, PRESET_EXTENSION)))
    }
}

impl PresetStore for FilePresetStore {
    fn save(&mut self, key: &str, preset: &SequencerPreset) -> Result<(), PresetError> {
        let path = self.path_for(key)?;
        preset.validate()?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serialize_to_ron(preset)?)?;
        log::info!("Preset '{}' saved to {}", preset.name, path.display());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<SequencerPreset, PresetError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Err(PresetError::NotFound(key.to_string()));
        }
        let text = fs::read_to_string(&path)?;
        let preset = deserialize_from_ron(&text).inspect_err(|e| {
            log::error!("Failed to load preset {}: {}", path.display(), e);
        })?;
        Ok(preset)
    }

    fn list(&self) -> Result<Vec<String>, PresetError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PRESET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(stem).is_ok() {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn delete(&mut self, key: &str) -> Result<(), PresetError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Err(PresetError::NotFound(key.to_string()));
        }
        fs::remove_file(&path)?;
        log::info!("Preset '{}' deleted", key);
        Ok(())
    }
}
