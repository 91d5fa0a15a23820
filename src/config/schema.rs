use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::properties::{host_system_properties, ActivationContext};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// a profile-set file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// dominant properties, usually supplied with `-D`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_properties: HashMap<String, String>,
    /// overlaid on the properties derived from the host
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub system_properties: HashMap<String, String>,
    /// project model properties
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_profiles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inactive_profiles: Vec<String>,
    /// defaults to the directory holding the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// tracing level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// expose environment variables as `env.NAME` system properties
    #[serde(default)]
    pub include_env_properties: bool,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            include_env_properties: false,
        }
    }
}

impl Config {
    /// build the activation context for this file
    ///
    /// `dir` is the directory the file was loaded from; relative directories
    /// in the file resolve against it.
    pub fn activation_context(&self, dir: Option<&Path>) -> ActivationContext {
        let mut system = host_system_properties(self.settings.include_env_properties);
        system.extend(self.system_properties.clone());

        let base = self
            .base_directory
            .as_deref()
            .map(|d| resolve_dir(d, dir))
            .or_else(|| dir.map(Path::to_path_buf));
        let root = self.root_directory.as_deref().map(|d| resolve_dir(d, dir));

        let mut ctx = ActivationContext::new()
            .with_user_properties(self.user_properties.clone())
            .with_system_properties(system)
            .with_model_properties(self.properties.clone())
            .with_active_profiles(self.active_profiles.clone())
            .with_inactive_profiles(self.inactive_profiles.clone());
        ctx.base_directory = base;
        ctx.root_directory = root;
        ctx.artifact_id = self.artifact_id.clone();
        ctx.packaging = self.packaging.clone();
        ctx
    }
}

fn resolve_dir(path: &str, dir: Option<&Path>) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
    match dir {
        Some(dir) if expanded.is_relative() => dir.join(expanded),
        _ => expanded,
    }
}
