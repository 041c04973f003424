// Serialization utilities for presets
// RON is the on-disk format, pretty JSON is the export format

use crate::preset::PresetError;
use crate::preset::types::SequencerPreset;
use ron::ser::PrettyConfig;

/// Serialize a preset to RON format
pub fn serialize_to_ron(preset: &SequencerPreset) -> Result<String, PresetError> {
    Ok(ron::ser::to_string_pretty(preset, PrettyConfig::default())?)
}

/// Deserialize and validate a preset from RON format
pub fn deserialize_from_ron(ron_data: &str) -> Result<SequencerPreset, PresetError> {
    let preset: SequencerPreset = ron::from_str(ron_data).map_err(|e| {
        PresetError::SerializationError(format!("Failed to deserialize from RON: {}", e))
    })?;
    preset.validate()?;
    Ok(preset)
}

/// Export a preset as pretty JSON for sharing
pub fn export_json(preset: &SequencerPreset) -> Result<String, PresetError> {
    Ok(serde_json::to_string_pretty(preset)?)
}

/// Import and validate a preset exported with `export_json`
pub fn import_json(json_data: &str) -> Result<SequencerPreset, PresetError> {
    let preset: SequencerPreset = serde_json::from_str(json_data)?;
    preset.validate()?;
    Ok(preset)
}
