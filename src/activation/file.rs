use tracing::debug;

use super::{ActivationError, ProblemCollector, ProfileActivator};
use crate::profile::Profile;
use crate::properties::{interpolate, resolve_path, ActivationContext, PropertyResolver};

/// activates a profile by the existence of files
///
/// `exists` and `missing` are checked independently and both must hold when
/// declared. relative paths resolve against the project base directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileActivator;

impl ProfileActivator for FileActivator {
    fn name(&self) -> &'static str {
        "file"
    }

    fn present_in_config(&self, profile: &Profile) -> bool {
        profile
            .activation
            .as_ref()
            .map_or(false, |a| a.file.is_some())
    }

    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError> {
        let Some(file) = profile.activation.as_ref().and_then(|a| a.file.as_ref()) else {
            return Ok(false);
        };

        let clauses = [(file.exists.as_deref(), true), (file.missing.as_deref(), false)];
        let mut declared = false;

        for (path, should_exist) in clauses {
            let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
                continue;
            };
            declared = true;

            let expanded = match interpolate(path, |name| ctx.property(name)) {
                Ok(expanded) => expanded,
                Err(e) if e.is_fatal() => return Err(ActivationError::property(profile, e)),
                Err(e) => {
                    problems.warning(format!(
                        "failed to interpolate file location '{}' for profile '{}': {}",
                        path, profile.id, e
                    ));
                    return Ok(false);
                }
            };

            let resolved = resolve_path(&expanded, ctx.base_directory());
            let exists = resolved.exists();
            debug!(
                profile = %profile.id,
                path = %resolved.display(),
                exists,
                "file clause evaluated"
            );
            if exists != should_exist {
                return Ok(false);
            }
        }

        Ok(declared)
    }
}
