use crate::descriptor::ProcessDescriptor;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The descriptor document: an ordered collection of process
/// descriptors under a single top-level `apps` key.
///
/// A `DescriptorSet` is immutable once loaded; the supervisor consumes
/// it at startup and owns all runtime state derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    apps: Vec<ProcessDescriptor>,
}

impl DescriptorSet {
    /// Load a descriptor set from a file (supports JSON and TOML).
    ///
    /// Descriptors without an explicit `cwd` default to the directory
    /// containing the file. Environment variables in paths and `env`
    /// values are expanded before validation.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let mut set = match extension {
            "json" => Self::parse_json(&contents)?,
            "toml" => Self::parse_toml(&contents)?,
            _ => return Err(ConfigError::UnsupportedFormat(extension.to_string())),
        };

        let file_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        for descriptor in &mut set.apps {
            if descriptor.cwd.is_none() {
                descriptor.cwd = Some(file_dir.clone());
            }
            descriptor.expand_env_vars();
        }

        set.validate()?;
        tracing::debug!(
            "Loaded {} descriptor(s) from {}",
            set.len(),
            path.display()
        );
        Ok(set)
    }

    /// Parse and validate a descriptor set from a JSON document
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let set = Self::parse_json(contents)?;
        set.validate()?;
        Ok(set)
    }

    /// Parse and validate a descriptor set from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let set = Self::parse_toml(contents)?;
        set.validate()?;
        Ok(set)
    }

    fn parse_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| ConfigError::MalformedSyntax(format!("JSON: {}", e)))
    }

    fn parse_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::MalformedSyntax(format!("TOML: {}", e)))
    }

    /// Validate the whole set: unique names first, then each
    /// descriptor's own invariants.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for descriptor in &self.apps {
            if !descriptor.name.is_empty() && !seen.insert(descriptor.name.as_str()) {
                return Err(ConfigError::DuplicateName(descriptor.name.clone()));
            }
        }

        for descriptor in &self.apps {
            descriptor.validate()?;
        }

        Ok(())
    }

    /// Serialize the set back to a JSON document
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    /// Serialize the set back to a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    /// All descriptors, in document order
    pub fn apps(&self) -> &[ProcessDescriptor] {
        &self.apps
    }

    /// Look up a descriptor by process name
    pub fn get(&self, name: &str) -> Option<&ProcessDescriptor> {
        self.apps.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl<'a> IntoIterator for &'a DescriptorSet {
    type Item = &'a ProcessDescriptor;
    type IntoIter = std::slice::Iter<'a, ProcessDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.iter()
    }
}
