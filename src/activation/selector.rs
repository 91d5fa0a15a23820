use std::collections::HashMap;

use tracing::{debug, trace};

use super::{
    default_activators, ActivationError, ProblemCollector, ProfileActivator, SimpleProblemCollector,
};
use crate::profile::{Profile, ProfileSource};
use crate::properties::ActivationContext;

type Activators = Vec<Box<dyn ProfileActivator + Send + Sync>>;

/// picks the active profiles out of a profile set
pub struct ProfileSelector {
    activators: Activators,
}

impl Default for ProfileSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProfileSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.activators.iter().map(|a| a.name()).collect();
        f.debug_struct("ProfileSelector")
            .field("activators", &names)
            .finish()
    }
}

impl ProfileSelector {
    /// selector with every built-in activator
    pub fn new() -> Self {
        Self {
            activators: default_activators(),
        }
    }

    pub fn with_activators(activators: Activators) -> Self {
        Self { activators }
    }

    /// active profiles in order: project descriptor first, then settings
    ///
    /// properties of active profiles are fed back as model properties until
    /// the selection stops changing. problems of the final pass are reported.
    pub fn active_profiles<'p>(
        &self,
        profiles: &'p [Profile],
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<Vec<&'p Profile>, ActivationError> {
        let base = ctx.model_properties.clone();
        let mut ctx = ctx.clone();

        for pass in 0..=profiles.len() {
            let mut collected = SimpleProblemCollector::new();
            let active = self.select_once(profiles, &ctx, &mut collected)?;

            let mut model = base.clone();
            model.extend(injected_properties(&active));

            if model == ctx.model_properties || pass == profiles.len() {
                debug!(
                    passes = pass + 1,
                    active = active.len(),
                    "profile selection settled"
                );
                for problem in collected.into_problems() {
                    problems.add(problem);
                }
                return Ok(active);
            }

            trace!(pass, "active profiles injected new properties, reselecting");
            ctx.model_properties = model;
        }

        Ok(Vec::new())
    }

    fn select_once<'p>(
        &self,
        profiles: &'p [Profile],
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<Vec<&'p Profile>, ActivationError> {
        let mut pom = Vec::new();
        let mut settings = Vec::new();
        let mut pom_defaults = Vec::new();

        for profile in profiles {
            if ctx.is_profile_inactive(&profile.id) {
                trace!(profile = %profile.id, "explicitly deactivated");
                continue;
            }

            let active = ctx.is_profile_active(&profile.id) || self.is_active(profile, ctx, problems)?;
            match (profile.source, active) {
                (ProfileSource::Pom, true) => pom.push(profile),
                (ProfileSource::Pom, false) if profile.is_active_by_default() => {
                    pom_defaults.push(profile)
                }
                (ProfileSource::Settings, true) => settings.push(profile),
                (ProfileSource::Settings, false) if profile.is_active_by_default() => {
                    settings.push(profile)
                }
                _ => {}
            }
        }

        if pom.is_empty() {
            pom = pom_defaults;
        }
        pom.extend(settings);
        Ok(pom)
    }

    /// every declared clause must hold, and at least one must be declared
    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError> {
        let mut declared = false;
        for activator in &self.activators {
            if !activator.present_in_config(profile) {
                continue;
            }
            declared = true;
            if !activator.is_active(profile, ctx, problems)? {
                trace!(profile = %profile.id, activator = activator.name(), "clause does not hold");
                return Ok(false);
            }
        }
        Ok(declared)
    }
}

/// model properties contributed by `profiles`, later profiles win
pub fn injected_properties(profiles: &[&Profile]) -> HashMap<String, String> {
    profiles
        .iter()
        .flat_map(|p| p.properties.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
