//! Model store: reading and writing serialized networks

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// On-disk encoding of a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Compact binary encoding
    Bincode,
    /// Human-readable JSON
    Json,
}

impl ModelFormat {
    /// `.json` files are JSON, everything else bincode
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Bincode,
        }
    }
}

/// Load a model. Any failure is reported as [`Error::ModelLoad`].
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let fail = |reason: String| Error::ModelLoad {
        path: path.display().to_string(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| fail(e.to_string()))?;

    match ModelFormat::from_path(path) {
        ModelFormat::Json => serde_json::from_slice(&bytes).map_err(|e| fail(e.to_string())),
        ModelFormat::Bincode => bincode::deserialize(&bytes).map_err(|e| fail(e.to_string())),
    }
}

/// Save a model in the given format
pub fn save<T: Serialize>(model: &T, path: &Path, format: ModelFormat) -> Result<()> {
    let bytes = match format {
        ModelFormat::Json => serde_json::to_vec_pretty(model)?,
        ModelFormat::Bincode => bincode::serialize(model)?,
    };
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ModelFormat::from_path(Path::new("m.json")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("m.JSON")), ModelFormat::Json);
        assert_eq!(ModelFormat::from_path(Path::new("m.bin")), ModelFormat::Bincode);
        assert_eq!(ModelFormat::from_path(Path::new("model")), ModelFormat::Bincode);
    }

    #[test]
    fn test_malformed_file_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: Result<Vec<f64>> = load(&path);
        assert!(matches!(result, Err(Error::ModelLoad { .. })));
    }
}
