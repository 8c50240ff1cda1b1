use crate::SerializeResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Per-call serialization options.
///
/// Can be read from a TOML file so an application keeps its defaults next
/// to the rest of its configuration:
///
/// ```toml
/// useAliases = true
/// force = false
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializationSettings {
    /// Emit each property under its registered alias, when it has one.
    pub use_aliases: bool,
    /// Skip converters that answer `Ignore` and try the next candidate,
    /// falling back to the default converter.
    pub force: bool,
}

impl SerializationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(mut self) -> Self {
        self.use_aliases = true;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Parses settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> SerializeResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads settings from a TOML file.
    /// Falls back to defaults with a warning when the file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No serializer settings at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(settings) => {
                    info!("Loaded serializer settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse serializer settings {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read serializer settings {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
