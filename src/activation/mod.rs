//! profile activation
//!
//! each activator looks at one kind of clause (`condition`, `jdk`, `os`,
//! `property`, `file`). the [`ProfileSelector`] combines them: a profile is
//! active when it declares at least one clause and every declared clause
//! holds.
//!
//! recoverable failures (malformed versions, bad expressions) are reported
//! to a [`ProblemCollector`] and leave the clause inactive. only a missing
//! project root is returned as an [`ActivationError`].

mod condition;
mod file;
mod jdk;
mod os;
mod property;
mod selector;

pub use condition::ConditionActivator;
pub use file::FileActivator;
pub use jdk::JdkVersionActivator;
pub use os::OperatingSystemActivator;
pub use property::PropertyActivator;
pub use selector::ProfileSelector;

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::profile::Profile;
use crate::properties::{ActivationContext, PropertyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// a diagnostic produced while evaluating activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// sink for activation diagnostics
pub trait ProblemCollector {
    fn add(&mut self, problem: Problem);

    fn warning(&mut self, message: String) {
        warn!("{}", message);
        self.add(Problem {
            severity: Severity::Warning,
            message,
        });
    }

    fn error(&mut self, message: String) {
        warn!(severity = "error", "{}", message);
        self.add(Problem {
            severity: Severity::Error,
            message,
        });
    }
}

/// collects problems in order
#[derive(Debug, Clone, Default)]
pub struct SimpleProblemCollector {
    problems: Vec<Problem>,
}

impl SimpleProblemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.messages(Severity::Warning)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.messages(Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    fn messages(&self, severity: Severity) -> Vec<&str> {
        self.problems
            .iter()
            .filter(|p| p.severity == severity)
            .map(|p| p.message.as_str())
            .collect()
    }
}

impl ProblemCollector for SimpleProblemCollector {
    fn add(&mut self, problem: Problem) {
        self.problems.push(problem);
    }
}

/// failure that aborts a whole selection pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("failed to determine activation for profile '{profile}': {source}")]
    Property {
        profile: String,
        #[source]
        source: PropertyError,
    },
}

impl ActivationError {
    pub(crate) fn property(profile: &Profile, source: PropertyError) -> Self {
        ActivationError::Property {
            profile: profile.id.clone(),
            source,
        }
    }

    pub fn is_root_not_found(&self) -> bool {
        matches!(
            self,
            ActivationError::Property {
                source: PropertyError::RootNotFound,
                ..
            }
        )
    }
}

/// decides one kind of activation clause
pub trait ProfileActivator {
    /// clause name used in logs
    fn name(&self) -> &'static str;

    /// whether the profile declares the clause this activator handles
    fn present_in_config(&self, profile: &Profile) -> bool;

    /// evaluate the clause, `Ok(false)` when it is absent or does not hold
    fn is_active(
        &self,
        profile: &Profile,
        ctx: &ActivationContext,
        problems: &mut dyn ProblemCollector,
    ) -> Result<bool, ActivationError>;
}

/// every built-in activator
pub fn default_activators() -> Vec<Box<dyn ProfileActivator + Send + Sync>> {
    vec![
        Box::new(JdkVersionActivator),
        Box::new(OperatingSystemActivator),
        Box::new(PropertyActivator),
        Box::new(FileActivator),
        Box::new(ConditionActivator),
    ]
}
