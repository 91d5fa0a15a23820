mod schema;

pub use schema::{Config, Settings, DEFAULT_LOG_LEVEL};

use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::conditions;
use crate::version::VersionRange;

const CONFIG_ENV_VAR: &str = "PACTL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "profiles.json5";

/// resolve the profile-set path: `--config`, then `PACTL_CONFIG`, then
/// `./profiles.json5`
pub fn get_config_path(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return expand(&path.to_string_lossy());
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return expand(&path);
        }
    }

    PathBuf::from(DEFAULT_CONFIG_FILE)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).as_ref())
}

pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = json5::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// like [`load`], but a missing file yields the default config
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load(path)
}

/// directory relative paths in `path` resolve against
pub fn config_dir(path: &Path) -> Option<PathBuf> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    match dir {
        Some(dir) => Some(dir.to_path_buf()),
        None => env::current_dir().ok(),
    }
}

/// verify a profile-set file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match json5::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON5: {}", e));
        }
    };

    Ok(verify_config(&config))
}

pub fn verify_config(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, profile) in config.profiles.iter().enumerate() {
        let prefix = if profile.id.trim().is_empty() {
            errors.push(format!("profiles[{}]: missing 'id'", i));
            format!("profiles[{}]", i)
        } else {
            if !seen.insert(profile.id.as_str()) {
                errors.push(format!("profiles[{}]: duplicate id '{}'", i, profile.id));
            }
            format!("profiles[{}] ('{}')", i, profile.id)
        };

        let Some(activation) = &profile.activation else {
            continue;
        };

        if let Some(condition) = activation.condition.as_deref() {
            if !condition.trim().is_empty() {
                if let Err(e) = conditions::compile(condition) {
                    errors.push(format!("{}: invalid condition '{}': {}", prefix, condition, e));
                }
            }
        }

        if let Some(jdk) = activation.jdk.as_deref().map(str::trim) {
            if jdk.is_empty() {
                errors.push(format!("{}: empty jdk clause", prefix));
            } else if jdk.starts_with('[') || jdk.starts_with('(') {
                if let Err(e) = VersionRange::parse(jdk) {
                    errors.push(format!("{}: invalid jdk range '{}': {}", prefix, jdk, e));
                }
            }
        }

        if let Some(os) = &activation.os {
            if os.is_empty() {
                errors.push(format!("{}: os clause declares no fields", prefix));
            }
            if let Some(version) = os.version.as_deref() {
                let version = version.trim();
                let version = version.strip_prefix('!').unwrap_or(version);
                if let Some(pattern) = version.strip_prefix("regex:") {
                    if let Err(e) = Regex::new(pattern) {
                        errors.push(format!(
                            "{}: invalid os version pattern '{}': {}",
                            prefix, pattern, e
                        ));
                    }
                }
            }
        }

        if let Some(property) = &activation.property {
            let name = property.name.as_deref().unwrap_or("").trim();
            if name.trim_start_matches('!').trim().is_empty() {
                errors.push(format!("{}: property clause requires 'name'", prefix));
            }
        }

        if let Some(file) = &activation.file {
            match (file.exists.as_deref(), file.missing.as_deref()) {
                (Some(_), Some(_)) => errors.push(format!(
                    "{}: file clause declares both 'exists' and 'missing'",
                    prefix
                )),
                (None, None) => errors.push(format!("{}: file clause declares no path", prefix)),
                _ => {}
            }
        }
    }

    for id in config.active_profiles.iter().chain(&config.inactive_profiles) {
        if !seen.contains(id.as_str()) {
            errors.push(format!("unknown profile '{}' in active/inactive profiles", id));
        }
    }

    errors
}
