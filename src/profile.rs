//! profile data model
//!
//! a profile is a named bundle of properties that is switched on by its
//! activation clauses. every clause is optional; the declared ones must all
//! hold for the profile to be active.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// where a profile was declared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    /// the project descriptor
    #[default]
    Pom,
    /// user or global settings
    Settings,
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::Pom => write!(f, "pom"),
            ProfileSource::Settings => write!(f, "settings"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub source: ProfileSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
    /// injected as model properties while the profile is active
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: ProfileSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn is_active_by_default(&self) -> bool {
        self.activation
            .as_ref()
            .map(|a| a.active_by_default)
            .unwrap_or(false)
    }
}

/// activation clauses of a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    #[serde(default, alias = "activeByDefault")]
    pub active_by_default: bool,
    /// version prefix (`1.8`, `!1.8`) or range (`[11,17)`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jdk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<ActivationOs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<ActivationProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<ActivationFile>,
    /// condition expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Activation {
    pub fn active_by_default() -> Self {
        Self {
            active_by_default: true,
            ..Self::default()
        }
    }

    pub fn condition(expression: impl Into<String>) -> Self {
        Self {
            condition: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn jdk(spec: impl Into<String>) -> Self {
        Self {
            jdk: Some(spec.into()),
            ..Self::default()
        }
    }

    pub fn os(os: ActivationOs) -> Self {
        Self {
            os: Some(os),
            ..Self::default()
        }
    }

    pub fn property(property: ActivationProperty) -> Self {
        Self {
            property: Some(property),
            ..Self::default()
        }
    }

    pub fn file(file: ActivationFile) -> Self {
        Self {
            file: Some(file),
            ..Self::default()
        }
    }
}

/// operating system clause, each field may be negated with a leading `!`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationOs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// literal version or `regex:<pattern>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ActivationOs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.family.is_none() && self.arch.is_none() && self.version.is_none()
    }
}

/// property clause: `name` alone, `!name`, `name` + `value` or `name` + `!value`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ActivationProperty {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.map(str::to_string),
        }
    }
}

/// file clause, paths may contain `${...}` references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<String>,
}

impl ActivationFile {
    pub fn exists(path: impl Into<String>) -> Self {
        Self {
            exists: Some(path.into()),
            missing: None,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            exists: None,
            missing: Some(path.into()),
        }
    }
}
