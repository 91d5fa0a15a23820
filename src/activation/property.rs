use tracing::debug;

use super::{ActivationError, ProblemCollector, ProfileActivator};
use crate::profile::Profile;
use crate::properties::{ActivationContext, PropertyResolver};

/// activates a profile by the presence or value of a property
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyActivator;

impl ProfileActivator for PropertyActivator {
    fn name(&self) -> &'static str {
        "property"
    }

    fn present_in_config(&self, profile: &Profile) -> bool {
        profile
            .activation
            .as_ref()
            .map_or(false, |a| a.property.is_some())
    }

    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError> {
        let Some(property) = profile.activation.as_ref().and_then(|a| a.property.as_ref()) else {
            return Ok(false);
        };

        let name = property.name.as_deref().map(str::trim).unwrap_or("");
        let (reverse_name, name) = match name.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, name),
        };
        if name.is_empty() {
            problems.error(format!(
                "property name is required to activate profile '{}'",
                profile.id
            ));
            return Ok(false);
        }

        let actual = ctx
            .property(name)
            .map_err(|e| ActivationError::property(profile, e))?
            .unwrap_or_default();

        let active = match property.value.as_deref().map(str::trim) {
            Some(expected) if !expected.is_empty() => match expected.strip_prefix('!') {
                Some(expected) => expected != actual,
                None => expected == actual,
            },
            _ => reverse_name != !actual.is_empty(),
        };

        debug!(profile = %profile.id, property = name, active, "property clause evaluated");
        Ok(active)
    }
}
