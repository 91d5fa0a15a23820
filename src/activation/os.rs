use regex::Regex;
use tracing::debug;

use super::{ActivationError, ProblemCollector, ProfileActivator};
use crate::profile::{ActivationOs, Profile};
use crate::properties::ActivationContext;

const REGEX_PREFIX: &str = "regex:";

/// activates a profile by the host operating system
///
/// every declared field of the `os` clause must match; a clause with no
/// fields never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatingSystemActivator;

/// os attributes the clause is compared against
struct HostOs<'a> {
    name: String,
    arch: String,
    version: String,
    path_separator: &'a str,
}

impl ProfileActivator for OperatingSystemActivator {
    fn name(&self) -> &'static str {
        "os"
    }

    fn present_in_config(&self, profile: &Profile) -> bool {
        profile
            .activation
            .as_ref()
            .map_or(false, |a| a.os.is_some())
    }

    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError> {
        let Some(os) = profile.activation.as_ref().and_then(|a| a.os.as_ref()) else {
            return Ok(false);
        };
        if os.is_empty() {
            return Ok(false);
        }

        let prop = |name: &str| {
            ctx.system_properties
                .get(name)
                .map(|v| v.to_lowercase())
                .unwrap_or_default()
        };
        let host = HostOs {
            name: prop("os.name"),
            arch: prop("os.arch"),
            version: prop("os.version"),
            path_separator: ctx
                .system_properties
                .get("path.separator")
                .map(String::as_str)
                .unwrap_or(""),
        };

        let active = matches_os(os, &host, profile, problems);
        debug!(
            profile = %profile.id,
            os.name = %host.name,
            os.arch = %host.arch,
            os.version = %host.version,
            active,
            "os clause evaluated"
        );
        Ok(active)
    }
}

fn matches_os(
    os: &ActivationOs,
    host: &HostOs<'_>,
    profile: &Profile,
    problems: &mut dyn ProblemCollector,
) -> bool {
    if let Some(family) = &os.family {
        let (negated, family) = split_negation(family);
        if negated == is_family(&family.to_lowercase(), host) {
            return false;
        }
    }
    if let Some(name) = &os.name {
        if !matches_exact(name, &host.name) {
            return false;
        }
    }
    if let Some(arch) = &os.arch {
        if !matches_exact(arch, &host.arch) {
            return false;
        }
    }
    if let Some(version) = &os.version {
        let (negated, test) = split_negation(version);
        let matched = match test.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(re) => re.is_match(&host.version),
                Err(e) => {
                    problems.warning(format!(
                        "invalid os version pattern '{}' in profile '{}': {}",
                        pattern, profile.id, e
                    ));
                    return false;
                }
            },
            None => test.eq_ignore_ascii_case(&host.version),
        };
        if negated == matched {
            return false;
        }
    }
    true
}

fn split_negation(value: &str) -> (bool, &str) {
    match value.trim().strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, value.trim()),
    }
}

fn matches_exact(test: &str, actual: &str) -> bool {
    let (negated, test) = split_negation(test);
    negated != test.eq_ignore_ascii_case(actual)
}

/// static os family table
///
/// `name` is the lowercased `os.name`. unknown families never match.
fn is_family(family: &str, host: &HostOs<'_>) -> bool {
    let name = host.name.as_str();
    let is_windows = name.contains("windows");
    let is_9x = is_windows
        && (name.contains("95")
            || name.contains("98")
            || name.contains("me")
            || name.contains("ce"));
    let is_netware = name.contains("netware");
    let is_os2 = name.contains("os/2");
    let is_openvms = name.contains("openvms");
    let is_mac = name.contains("mac");

    match family {
        "windows" => is_windows,
        "win9x" => is_9x,
        "winnt" => is_windows && !is_9x,
        "os/2" => is_os2,
        "netware" => is_netware,
        "dos" => (host.path_separator == ";" || is_windows) && !is_netware,
        "mac" => is_mac,
        "tandem" => name.contains("nonstop_kernel"),
        "unix" => {
            !is_windows
                && !is_os2
                && !is_netware
                && !is_openvms
                && (!is_mac || name.ends_with('x'))
        }
        "z/os" => name.contains("z/os") || name.contains("os/390"),
        "os/400" => name.contains("os/400"),
        "openvms" => is_openvms,
        _ => false,
    }
}
