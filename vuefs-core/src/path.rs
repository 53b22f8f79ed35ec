//! Virtual path translation.
//!
//! A component `App.vue` is exposed to the language service as `App.vue.ts`.
//! The pair of transforms is a bijection on paths ending in the component
//! extension and the identity on every other path.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Extension of component documents.
pub const COMPONENT_EXTENSION: &str = ".vue";

/// Extension appended to a component path to form its virtual script path.
pub const SCRIPT_EXTENSION: &str = ".ts";

/// Extension pair that defines which paths are virtual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathMapping {
    pub component_extension: String,
    pub script_extension: String,
}

impl Default for PathMapping {
    fn default() -> Self {
        Self {
            component_extension: COMPONENT_EXTENSION.to_string(),
            script_extension: SCRIPT_EXTENSION.to_string(),
        }
    }
}

impl PathMapping {
    pub fn new(component_extension: impl Into<String>, script_extension: impl Into<String>) -> Self {
        Self {
            component_extension: component_extension.into(),
            script_extension: script_extension.into(),
        }
    }

    /// Parse a mapping from JSON, e.g. `{"componentExtension": ".vue"}`.
    /// Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> FsResult<Self> {
        let mapping: PathMapping = serde_json::from_str(json)?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Load a mapping from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> FsResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| FsError::from_io_file(&path.display().to_string(), e))?;
        Self::from_json_str(&json)
    }

    /// Both extensions must look like `.ext` and must not contain separators.
    pub fn validate(&self) -> FsResult<()> {
        for ext in [&self.component_extension, &self.script_extension] {
            if ext.len() < 2 || !ext.starts_with('.') {
                return Err(FsError::InvalidConfig(format!(
                    "extension must start with '.': {:?}",
                    ext
                )));
            }
            if ext.contains(['/', '\\']) {
                return Err(FsError::InvalidConfig(format!(
                    "extension must not contain a path separator: {:?}",
                    ext
                )));
            }
        }
        Ok(())
    }

    /// Full suffix of a virtual path, e.g. `.vue.ts`.
    pub fn virtual_suffix(&self) -> String {
        format!("{}{}", self.component_extension, self.script_extension)
    }

    /// True if `path` names the script block of a component.
    pub fn is_virtual(&self, path: &str) -> bool {
        is_virtual_with(path, &self.component_extension, &self.script_extension)
    }

    /// `App.vue` -> `App.vue.ts`; anything else is returned unchanged.
    pub fn to_virtual(&self, path: &str) -> String {
        to_virtual_with(path, &self.component_extension, &self.script_extension)
    }

    /// `App.vue.ts` -> `App.vue`; anything else is returned unchanged.
    pub fn from_virtual(&self, path: &str) -> String {
        from_virtual_with(path, &self.component_extension, &self.script_extension)
    }
}

fn is_virtual_with(path: &str, component: &str, script: &str) -> bool {
    path.strip_suffix(script)
        .is_some_and(|real| real.ends_with(component))
}

fn to_virtual_with(path: &str, component: &str, script: &str) -> String {
    if path.ends_with(component) {
        format!("{}{}", path, script)
    } else {
        path.to_string()
    }
}

fn from_virtual_with(path: &str, component: &str, script: &str) -> String {
    match path.strip_suffix(script) {
        Some(real) if real.ends_with(component) => real.to_string(),
        _ => path.to_string(),
    }
}

/// [`PathMapping::is_virtual`] with the default `.vue`/`.ts` mapping.
pub fn is_virtual_path(path: &str) -> bool {
    is_virtual_with(path, COMPONENT_EXTENSION, SCRIPT_EXTENSION)
}

/// [`PathMapping::to_virtual`] with the default `.vue`/`.ts` mapping.
pub fn to_virtual_path(path: &str) -> String {
    to_virtual_with(path, COMPONENT_EXTENSION, SCRIPT_EXTENSION)
}

/// [`PathMapping::from_virtual`] with the default `.vue`/`.ts` mapping.
pub fn from_virtual_path(path: &str) -> String {
    from_virtual_with(path, COMPONENT_EXTENSION, SCRIPT_EXTENSION)
}
