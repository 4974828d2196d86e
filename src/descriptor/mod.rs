// Descriptor module - the supervision descriptor schema and its validation

mod set;

pub use set::DescriptorSet;

use crate::error::{ConfigError, Result};
use crate::units::{opt_duration, ByteSize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One supervision descriptor: everything an external supervisor needs
/// to launch, restart, and log a single managed process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Process name (unique identifier across the set)
    #[serde(default)]
    pub name: String,

    /// Entry point handed to the interpreter
    #[serde(default)]
    pub script: PathBuf,

    /// Runtime invoked to run `script`; the supervisor's own default
    /// applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Command-line arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Working directory; defaults to the descriptor-file directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Number of concurrent instances
    #[serde(default = "default_instances")]
    pub instances: usize,

    /// Whether to relaunch on unexpected exit
    #[serde(default = "default_autorestart")]
    pub autorestart: bool,

    /// Whether filesystem changes trigger a restart
    #[serde(default)]
    pub watch: bool,

    /// Memory ceiling before the supervisor forces a restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_restart: Option<ByteSize>,

    /// Environment variables injected into the process
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Destination for stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_file: Option<PathBuf>,

    /// Destination for stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<PathBuf>,

    /// Destination for the combined log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Whether log lines are prefixed with a timestamp
    #[serde(default)]
    pub time: bool,

    /// Timestamp pattern for log lines, when `time` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date_format: Option<String>,

    /// Wait before relaunch after a crash, in milliseconds
    #[serde(default)]
    pub restart_delay: u64,

    /// Cap on restart attempts within the supervisor's window
    #[serde(default = "default_max_restarts")]
    pub max_restarts: usize,

    /// Minimum run time for a launch to count as successful
    #[serde(
        default,
        with = "opt_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_uptime: Option<Duration>,

    /// Whether the log-rotation module is active for this process.
    /// The remaining rotation fields are ignored unless this is true.
    #[serde(
        rename = "rotateModule",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rotate_module: Option<bool>,

    /// Log size that triggers a rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<ByteSize>,

    /// Number of rotated files kept before the oldest is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<usize>,

    /// Whether rotated files are compressed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,

    /// Cron-style schedule for time-based rotation
    #[serde(
        rename = "rotateInterval",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rotate_interval: Option<String>,

    /// Name pattern appended to rotated files
    #[serde(
        rename = "dateFormat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_format: Option<String>,
}

// Default value functions for serde
fn default_instances() -> usize {
    1
}

fn default_autorestart() -> bool {
    true
}

fn default_max_restarts() -> usize {
    10
}

/// Borrowed view of a descriptor's log-rotation policy, available only
/// when the rotation module is enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation<'a> {
    pub max_size: Option<ByteSize>,
    pub retain: Option<usize>,
    pub compress: bool,
    pub interval: Option<&'a str>,
    pub date_format: Option<&'a str>,
}

impl ProcessDescriptor {
    /// Validate type and range invariants for this descriptor.
    ///
    /// Uniqueness of `name` across a set is checked by
    /// [`DescriptorSet::validate`], not here.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField("name".to_string()));
        }

        if self.script.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("script".to_string()));
        }

        if matches!(self.interpreter.as_deref(), Some("")) {
            return Err(ConfigError::invalid("interpreter", "must not be empty"));
        }

        if self.instances == 0 {
            return Err(ConfigError::invalid("instances", "must be at least 1"));
        }

        if self.max_memory_restart.is_some_and(|m| m.is_zero()) {
            return Err(ConfigError::invalid(
                "max_memory_restart",
                "must be greater than zero",
            ));
        }

        if self.rotation_enabled() {
            self.validate_rotation()?;
        } else if self.has_rotation_fields() {
            tracing::warn!(
                "Process {}: rotation fields are set but rotateModule is not enabled; they will be ignored",
                self.name
            );
        }

        Ok(())
    }

    fn validate_rotation(&self) -> Result<()> {
        if self.max_size.is_some_and(|m| m.is_zero()) {
            return Err(ConfigError::invalid("max_size", "must be greater than zero"));
        }

        if self.retain == Some(0) {
            return Err(ConfigError::invalid("retain", "must be at least 1"));
        }

        if matches!(self.rotate_interval.as_deref(), Some("")) {
            return Err(ConfigError::invalid("rotateInterval", "must not be empty"));
        }

        Ok(())
    }

    /// Whether the log-rotation module is enabled for this process
    pub fn rotation_enabled(&self) -> bool {
        self.rotate_module == Some(true)
    }

    fn has_rotation_fields(&self) -> bool {
        self.max_size.is_some()
            || self.retain.is_some()
            || self.compress.is_some()
            || self.rotate_interval.is_some()
            || self.date_format.is_some()
    }

    /// The rotation policy, when the rotation module is enabled
    pub fn rotation(&self) -> Option<Rotation<'_>> {
        if !self.rotation_enabled() {
            return None;
        }

        Some(Rotation {
            max_size: self.max_size,
            retain: self.retain,
            compress: self.compress.unwrap_or(false),
            interval: self.rotate_interval.as_deref(),
            date_format: self.date_format.as_deref(),
        })
    }

    /// The entry point resolved against the working directory, for
    /// relative `script` paths
    pub fn resolved_script(&self) -> PathBuf {
        if self.script.is_absolute() {
            return self.script.clone();
        }

        match &self.cwd {
            Some(cwd) => cwd.join(&self.script),
            None => self.script.clone(),
        }
    }

    /// Get restart delay as Duration
    pub fn restart_delay_duration(&self) -> Duration {
        Duration::from_millis(self.restart_delay)
    }

    /// Expand environment variables in configuration fields
    pub(crate) fn expand_env_vars(&mut self) {
        self.script = Self::expand_env_in_path(&self.script);

        if let Some(ref cwd) = self.cwd {
            self.cwd = Some(Self::expand_env_in_path(cwd));
        }

        self.args = self
            .args
            .iter()
            .map(|arg| Self::expand_env_in_string(arg))
            .collect();

        self.env = self
            .env
            .iter()
            .map(|(k, v)| (k.clone(), Self::expand_env_in_string(v)))
            .collect();

        for file in [&mut self.error_file, &mut self.out_file, &mut self.log_file] {
            if let Some(path) = file.take() {
                *file = Some(Self::expand_env_in_path(&path));
            }
        }
    }

    /// Expand environment variables in a string
    fn expand_env_in_string(s: &str) -> String {
        let mut result = s.to_string();

        // Handle $VAR and ${VAR} syntax
        for (key, value) in std::env::vars() {
            result = result.replace(&format!("${{{}}}", key), &value);
            result = result.replace(&format!("${}", key), &value);
        }

        result
    }

    /// Expand environment variables in a path
    fn expand_env_in_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = Self::expand_env_in_string(&path_str);
        PathBuf::from(expanded)
    }
}
