use tracing::debug;

use super::{ActivationError, ProblemCollector, ProfileActivator};
use crate::profile::Profile;
use crate::properties::ActivationContext;
use crate::version::{Version, VersionError, VersionRange};

/// activates a profile by the running java version (`java.version`)
///
/// `1.8` and `!1.8` are plain string prefix tests against the raw version,
/// `[1.8,11)` style ranges compare the first three numeric components of
/// both the running version and every bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct JdkVersionActivator;

impl ProfileActivator for JdkVersionActivator {
    fn name(&self) -> &'static str {
        "jdk"
    }

    fn present_in_config(&self, profile: &Profile) -> bool {
        profile
            .activation
            .as_ref()
            .map_or(false, |a| a.jdk.is_some())
    }

    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError> {
        let Some(jdk) = profile.activation.as_ref().and_then(|a| a.jdk.as_deref()) else {
            return Ok(false);
        };
        let jdk = jdk.trim();

        let version = match ctx.system_properties.get("java.version") {
            Some(v) if !v.trim().is_empty() => v.trim(),
            _ => {
                problems.error(format!(
                    "failed to determine java version for profile '{}'",
                    profile.id
                ));
                return Ok(false);
            }
        };

        let active = if jdk.starts_with('[') || jdk.starts_with('(') {
            let range = VersionRange::parse(jdk).and_then(|range| {
                range.try_map(|bound| {
                    normalize(bound.as_str()).ok_or_else(|| VersionError::InvalidVersion(bound.to_string()))
                })
            });
            let range = match range {
                Ok(range) => range,
                Err(e) => {
                    problems.warning(format!(
                        "failed to parse jdk range of profile '{}': {}",
                        profile.id, e
                    ));
                    return Ok(false);
                }
            };
            match normalize(version) {
                Some(normalized) => range.contains(&normalized),
                None => {
                    problems.warning(format!(
                        "invalid JDK version '{}' for profile '{}'",
                        version, profile.id
                    ));
                    return Ok(false);
                }
            }
        } else {
            match jdk.strip_prefix('!') {
                Some(prefix) => !version.starts_with(prefix),
                None => version.starts_with(jdk),
            }
        };

        debug!(profile = %profile.id, jdk, version, active, "jdk clause evaluated");
        Ok(active)
    }
}

/// reduce a java version to `major.minor.patch`
///
/// anything but digits and `. _ - +` is dropped first, so `1.6.0_09-b03`
/// becomes `1.6.0` and `21-ea` becomes `21.0.0`. an empty component makes
/// the version invalid.
fn normalize(version: &str) -> Option<Version> {
    const SEPARATORS: [char; 4] = ['.', '_', '-', '+'];

    let kept: String = version
        .chars()
        .filter(|c| c.is_ascii_digit() || SEPARATORS.contains(c))
        .collect();
    let kept = kept.trim_end_matches(SEPARATORS);

    let mut parts = [0u64; 3];
    for (slot, token) in parts.iter_mut().zip(kept.split(SEPARATORS)) {
        *slot = token.parse().ok()?;
    }

    Version::parse(&format!("{}.{}.{}", parts[0], parts[1], parts[2])).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::test_support::{run, system};
    use crate::profile::Activation;

    fn profile(jdk: &str) -> Profile {
        Profile::new("jdk").with_activation(Activation::jdk(jdk))
    }

    fn active(jdk: &str, version: &str) -> bool {
        let (active, problems) = run(
            &JdkVersionActivator,
            &profile(jdk),
            &system(&[("java.version", version)]),
        );
        assert!(problems.is_empty(), "{:?}", problems.problems());
        active
    }

    #[test]
    fn test_prefix() {
        for v in ["1.4", "1.4.2", "1.4.2_09", "1.4.2_09-b03"] {
            assert!(active("1.4", v), "{}", v);
            assert!(!active("!1.4", v), "{}", v);
        }
        for v in ["1.3", "1.5"] {
            assert!(!active("1.4", v), "{}", v);
            assert!(active("!1.4", v), "{}", v);
        }
    }

    #[test]
    fn test_ranges() {
        assert!(!active("[1.3.1,1.6)", "1.6"));
        assert!(active("[1.3.1,1.6)", "1.5.1"));
        assert!(active("[1.3.1,1.6)", "1.3.1_09-b03"));
        assert!(!active("[1.3.1,1.6)", "1.3.0_09"));

        assert!(active("[1.5,1.6.1]", "1.6.0_09-b03"));
        assert!(!active("[1.5,1.6.1]", "1.4.2"));
        assert!(active("[1.5,)", "17.0.2"));
        assert!(!active("(,1.6)", "1.6.0_09"));
        assert!(active("(,1.6)", "1.5.0_09-b03"));
    }

    #[test]
    fn test_bounds_with_update_suffixes() {
        assert!(active("[1.4.2_09,1.5)", "1.4.2_09"));
        assert!(active("[1.4.2_09,1.5)", "1.4.2_10"));
        assert!(active("[1.4.2_09,1.5)", "1.4.2"));
        assert!(!active("[1.4.2_09,1.5)", "1.4.1_99"));
        assert!(!active("[1.4.2_09,1.5)", "1.5.0_01"));

        assert!(active("[1.6.0_20-b02,1.7)", "1.6.0_20-b02"));
        assert!(active("(,1.6.0_20]", "1.6.0_25"));
        assert!(!active("(,1.6.0_20]", "1.6.1"));

        assert!(!active("(1.6.0_20,)", "1.6.0_21"));
        assert!(active("(1.6.0_20,)", "1.6.1"));
        assert!(active("(1.6.0_20,)", "17.0.2"));
    }

    #[test]
    fn test_bounds_with_more_than_three_components() {
        assert!(active("[11.0.2.1,12)", "11.0.2"));
        assert!(active("[11.0.2.1,12)", "11.0.2.9"));
        assert!(!active("[11.0.2.1,12)", "11.0.1.9"));
    }

    #[test]
    fn test_multiple_ranges() {
        assert!(active("(,1.4],[1.6,)", "1.8"));
        assert!(active("(,1.4],[1.6,)", "1.4.0_09"));
        assert!(!active("(,1.4],[1.6,)", "1.5.0_22"));
        assert!(active("[1.5,1.6),[11,17)", "11.0.21"));
    }

    #[test]
    fn test_unparseable_bound_is_a_warning() {
        let (active, problems) = run(
            &JdkVersionActivator,
            &profile("[rubbish,1.8)"),
            &system(&[("java.version", "1.7.0")]),
        );
        assert!(!active);
        assert_eq!(problems.warnings().len(), 1);
    }

    #[test]
    fn test_modern_versions() {
        assert!(active("[11,17)", "11.0.21"));
        assert!(!active("[11,17)", "17.0.1"));
        assert!(active("[17,)", "21-ea"));
        assert!(active("17", "17.0.1+12"));
    }

    #[test]
    fn test_invalid_java_version() {
        for version in ["PÅ«teketeke", "rubbish", "1.a.0_09", "1.a.2.b"] {
            let (active, problems) = run(
                &JdkVersionActivator,
                &profile("[1.8,)"),
                &system(&[("java.version", version)]),
            );
            assert!(!active, "{}", version);
            assert!(problems.errors().is_empty());
            assert_eq!(problems.warnings().len(), 1, "{}", version);
            assert!(problems.warnings()[0].contains("invalid JDK version"));
        }
    }

    #[test]
    fn test_invalid_range() {
        let (active, problems) = run(
            &JdkVersionActivator,
            &profile("[1.8"),
            &system(&[("java.version", "1.8.0")]),
        );
        assert!(!active);
        assert_eq!(problems.warnings().len(), 1);
    }

    #[test]
    fn test_missing_java_version() {
        let (active, problems) = run(&JdkVersionActivator, &profile("1.8"), &system(&[]));
        assert!(!active);
        assert_eq!(problems.errors().len(), 1);
        assert!(problems.warnings().is_empty());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("1.6.0_09-b03").unwrap().as_str(), "1.6.0");
        assert_eq!(normalize("1.8").unwrap().as_str(), "1.8.0");
        assert_eq!(normalize("17").unwrap().as_str(), "17.0.0");
        assert_eq!(normalize("21-ea").unwrap().as_str(), "21.0.0");
        assert!(normalize("").is_none());
        assert!(normalize("rubbish").is_none());
    }
}
