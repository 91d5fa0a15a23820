//! property resolution for activation
//!
//! lookups go user properties -> system properties -> model properties,
//! with a few derived names answered from the project layout:
//! - `project.basedir` / `basedir`
//! - `project.rootDirectory` (fatal when no root is known)
//! - `project.artifactId`, `project.packaging`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// maximum nesting of `${...}` expansion before giving up
const MAX_INTERPOLATION_DEPTH: usize = 32;

/// errors raised while resolving properties
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// no project root directory could be located
    #[error("unable to locate the project root directory")]
    RootNotFound,
    /// `${` without a matching `}`
    #[error("unclosed property reference in '{0}'")]
    Unterminated(String),
    /// expansion kept producing new references
    #[error("property reference '{0}' expands recursively")]
    Recursive(String),
}

impl PropertyError {
    /// fatal errors abort the whole selection pass instead of becoming warnings
    pub fn is_fatal(&self) -> bool {
        matches!(self, PropertyError::RootNotFound)
    }
}

/// source of property values for condition evaluation
pub trait PropertyResolver {
    /// look up a property by name, `Ok(None)` when it has no value
    fn property(&self, name: &str) -> Result<Option<String>, PropertyError>;

    /// directory relative paths are resolved against
    fn base_directory(&self) -> Option<&Path> {
        None
    }
}

impl PropertyResolver for HashMap<String, String> {
    fn property(&self, name: &str) -> Result<Option<String>, PropertyError> {
        Ok(self.get(name).cloned())
    }
}

/// everything the activators may look at for one selection pass
#[derive(Debug, Clone, Default)]
pub struct ActivationContext {
    /// properties supplied on the command line (dominant)
    pub user_properties: HashMap<String, String>,
    /// properties derived from the host
    pub system_properties: HashMap<String, String>,
    /// properties declared by the project model and injected by active profiles
    pub model_properties: HashMap<String, String>,
    /// profile ids activated explicitly
    pub active_profile_ids: Vec<String>,
    /// profile ids deactivated explicitly
    pub inactive_profile_ids: Vec<String>,
    /// directory of the project descriptor
    pub base_directory: Option<PathBuf>,
    /// root of a multi-module project
    pub root_directory: Option<PathBuf>,
    pub artifact_id: Option<String>,
    pub packaging: Option<String>,
}

impl ActivationContext {
    /// create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.user_properties = properties;
        self
    }

    pub fn with_system_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.system_properties = properties;
        self
    }

    pub fn with_model_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.model_properties = properties;
        self
    }

    pub fn with_base_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_directory = Some(dir.into());
        self
    }

    pub fn with_root_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_directory = Some(dir.into());
        self
    }

    pub fn with_active_profiles(mut self, ids: Vec<String>) -> Self {
        self.active_profile_ids = ids;
        self
    }

    pub fn with_inactive_profiles(mut self, ids: Vec<String>) -> Self {
        self.inactive_profile_ids = ids;
        self
    }

    pub fn is_profile_active(&self, id: &str) -> bool {
        self.active_profile_ids.iter().any(|p| p == id)
    }

    pub fn is_profile_inactive(&self, id: &str) -> bool {
        self.inactive_profile_ids.iter().any(|p| p == id)
    }

    /// root directory, or the fatal `RootNotFound`
    pub fn root_directory(&self) -> Result<&Path, PropertyError> {
        self.root_directory
            .as_deref()
            .ok_or(PropertyError::RootNotFound)
    }
}

impl PropertyResolver for ActivationContext {
    fn property(&self, name: &str) -> Result<Option<String>, PropertyError> {
        if name.is_empty() {
            return Ok(None);
        }

        match name {
            "project.basedir" | "basedir" => {
                return Ok(self.base_directory.as_deref().map(path_to_string))
            }
            "project.rootDirectory" => return self.root_directory().map(|p| Some(path_to_string(p))),
            "project.artifactId" => return Ok(self.artifact_id.clone()),
            "project.packaging" => return Ok(self.packaging.clone()),
            _ => {}
        }

        Ok(self
            .user_properties
            .get(name)
            .or_else(|| self.system_properties.get(name))
            .or_else(|| self.model_properties.get(name))
            .cloned())
    }

    fn base_directory(&self) -> Option<&Path> {
        self.base_directory.as_deref()
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// expand every `${name}` in `text`
///
/// resolved values are expanded again; references without a value are left
/// in place verbatim.
pub fn interpolate<E, F>(text: &str, mut lookup: F) -> Result<String, E>
where
    F: FnMut(&str) -> Result<Option<String>, E>,
    E: From<PropertyError>,
{
    interpolate_at_depth(text, &mut lookup, 0)
}

fn interpolate_at_depth<E, F>(text: &str, lookup: &mut F, depth: usize) -> Result<String, E>
where
    F: FnMut(&str) -> Result<Option<String>, E>,
    E: From<PropertyError>,
{
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(PropertyError::Recursive(text.to_string()).into());
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| PropertyError::Unterminated(text.to_string()))?;
        let name = &after[..end];

        match lookup(name)? {
            Some(value) => out.push_str(&interpolate_at_depth(&value, lookup, depth + 1)?),
            None => {
                out.push_str("${");
                out.push_str(name);
                out.push('}');
            }
        }

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// resolve `path` against `base` unless it is already absolute
pub fn resolve_path(path: &str, base: Option<&Path>) -> PathBuf {
    let candidate = PathBuf::from(path);
    match base {
        Some(base) if candidate.is_relative() => base.join(candidate),
        _ => candidate,
    }
}

/// system properties describing the running host
///
/// names follow the usual JVM conventions so descriptors written for other
/// tools keep working (`os.name`, `os.arch`, `os.version`, ...). with
/// `include_env` every environment variable is added as `env.NAME`.
pub fn host_system_properties(include_env: bool) -> HashMap<String, String> {
    let mut props = HashMap::new();

    props.insert("os.name".to_string(), host_os_name().to_string());
    props.insert("os.arch".to_string(), host_os_arch().to_string());
    if let Some(version) = host_os_version() {
        props.insert("os.version".to_string(), version);
    }

    props.insert(
        "file.separator".to_string(),
        std::path::MAIN_SEPARATOR.to_string(),
    );
    props.insert(
        "path.separator".to_string(),
        if cfg!(windows) { ";" } else { ":" }.to_string(),
    );
    props.insert(
        "line.separator".to_string(),
        if cfg!(windows) { "\r\n" } else { "\n" }.to_string(),
    );

    if let Some(home) = dirs::home_dir() {
        props.insert("user.home".to_string(), path_to_string(&home));
    }
    if let Ok(cwd) = std::env::current_dir() {
        props.insert("user.dir".to_string(), path_to_string(&cwd));
    }
    if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
        props.insert("user.name".to_string(), user);
    }

    if include_env {
        for (key, value) in std::env::vars() {
            props.insert(format!("env.{}", key), value);
        }
    }

    props
}

fn host_os_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Mac OS X",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "solaris" => "SunOS",
        other => other,
    }
}

fn host_os_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "x86",
        other => other,
    }
}

#[cfg(unix)]
fn host_os_version() -> Option<String> {
    use std::ffi::CStr;

    // SAFETY: utsname is plain old data and uname only writes into it
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } != 0 {
        return None;
    }
    let release = unsafe { CStr::from_ptr(uts.release.as_ptr()) };
    Some(release.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn host_os_version() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_user_properties_dominate_system_properties() {
        let ctx = ActivationContext::new()
            .with_user_properties(props(&[("prop", "value")]))
            .with_system_properties(props(&[("prop", "other"), ("sys", "x")]));

        assert_eq!(ctx.property("prop").unwrap(), Some("value".to_string()));
        assert_eq!(ctx.property("sys").unwrap(), Some("x".to_string()));
        assert_eq!(ctx.property("missing").unwrap(), None);
    }

    #[test]
    fn test_model_properties_are_recessive() {
        let ctx = ActivationContext::new()
            .with_system_properties(props(&[("a", "system")]))
            .with_model_properties(props(&[("a", "model"), ("b", "model")]));

        assert_eq!(ctx.property("a").unwrap(), Some("system".to_string()));
        assert_eq!(ctx.property("b").unwrap(), Some("model".to_string()));
    }

    #[test]
    fn test_derived_directories() {
        let ctx = ActivationContext::new()
            .with_base_directory("/work/project")
            .with_root_directory("/work");

        assert_eq!(
            ctx.property("project.basedir").unwrap(),
            Some("/work/project".to_string())
        );
        assert_eq!(
            ctx.property("basedir").unwrap(),
            Some("/work/project".to_string())
        );
        assert_eq!(
            ctx.property("project.rootDirectory").unwrap(),
            Some("/work".to_string())
        );
    }

    #[test]
    fn test_missing_root_directory_is_fatal() {
        let ctx = ActivationContext::new();
        let err = ctx.property("project.rootDirectory").unwrap_err();
        assert_eq!(err, PropertyError::RootNotFound);
        assert!(err.is_fatal());
        assert!(!PropertyError::Unterminated("x".into()).is_fatal());
    }

    #[test]
    fn test_empty_name_has_no_value() {
        let ctx = ActivationContext::new().with_user_properties(props(&[("", "x")]));
        assert_eq!(ctx.property("").unwrap(), None);
    }

    #[test]
    fn test_interpolate_consecutive_and_nested() {
        let map = props(&[("a", "/home"), ("b", "${c}/lib"), ("c", "user")]);
        let out: Result<String, PropertyError> =
            interpolate("${a}/${b}/file.txt", |name| map.property(name));
        assert_eq!(out.unwrap(), "/home/user/lib/file.txt");
    }

    #[test]
    fn test_interpolate_leaves_unknown_references() {
        let map = props(&[("a", "x")]);
        let out: Result<String, PropertyError> =
            interpolate("${a}/${nope}/f", |name| map.property(name));
        assert_eq!(out.unwrap(), "x/${nope}/f");
    }

    #[test]
    fn test_interpolate_unterminated() {
        let map = props(&[]);
        let out: Result<String, PropertyError> = interpolate("${unclosed", |name| map.property(name));
        assert!(matches!(out, Err(PropertyError::Unterminated(_))));
    }

    #[test]
    fn test_interpolate_self_reference() {
        let map = props(&[("loop", "${loop}")]);
        let out: Result<String, PropertyError> = interpolate("${loop}", |name| map.property(name));
        assert!(matches!(out, Err(PropertyError::Recursive(_))));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/work");
        assert_eq!(resolve_path("a.txt", Some(base)), PathBuf::from("/work/a.txt"));
        assert_eq!(resolve_path("/abs/a.txt", Some(base)), PathBuf::from("/abs/a.txt"));
        assert_eq!(resolve_path("a.txt", None), PathBuf::from("a.txt"));
    }

    #[test]
    fn test_host_properties_have_os_name() {
        let props = host_system_properties(false);
        assert!(props.contains_key("os.name"));
        assert!(props.contains_key("os.arch"));
        assert!(!props.keys().any(|k| k.starts_with("env.")));
    }
}
