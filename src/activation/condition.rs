use tracing::debug;

use super::{ActivationError, ProblemCollector, ProfileActivator};
use crate::conditions::{to_boolean, ConditionError, ConditionParser, FunctionRegistry};
use crate::profile::Profile;
use crate::properties::ActivationContext;

/// activates a profile when its `condition` expression is truthy
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionActivator;

impl ProfileActivator for ConditionActivator {
    fn name(&self) -> &'static str {
        "condition"
    }

    fn present_in_config(&self, profile: &Profile) -> bool {
        profile
            .activation
            .as_ref()
            .map_or(false, |a| a.condition.is_some())
    }

    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError> {
        let Some(condition) = profile.activation.as_ref().and_then(|a| a.condition.as_deref()) else {
            return Ok(false);
        };
        if condition.trim().is_empty() {
            return Ok(false);
        }

        let parser = ConditionParser::new(FunctionRegistry::new(ctx));
        match parser.parse(condition) {
            Ok(value) => {
                let active = to_boolean(&value);
                debug!(profile = %profile.id, condition, active, "condition evaluated");
                Ok(active)
            }
            Err(ConditionError::Property(source)) if source.is_fatal() => {
                Err(ActivationError::property(profile, source))
            }
            Err(e) => {
                problems.warning(format!(
                    "failed to evaluate condition '{}' of profile '{}': {}",
                    condition, profile.id, e
                ));
                Ok(false)
            }
        }
    }
}
