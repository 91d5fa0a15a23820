//! built-in condition functions and the override table
//!
//! calls are dispatched to an override registered with [`FunctionRegistry::put`]
//! first and to the matching [`Builtin`] second.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use tracing::trace;

use super::convert;
use super::error::{ConditionError, ConditionResult};
use super::types::Value;
use crate::properties::{interpolate, resolve_path, PropertyResolver};
use crate::version::{Version, VersionRange};

/// maximum edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 2;

/// a callable replacing a built-in or adding a new function
pub type Function<'a> = Box<dyn Fn(&[Value]) -> ConditionResult<Value> + 'a>;

/// functions available to every condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Length,
    Upper,
    Lower,
    Substring,
    IndexOf,
    Contains,
    Matches,
    InRange,
    If,
    Not,
    Exists,
    Missing,
    Property,
    ToInt,
}

impl Builtin {
    pub const ALL: [Builtin; 14] = [
        Builtin::Length,
        Builtin::Upper,
        Builtin::Lower,
        Builtin::Substring,
        Builtin::IndexOf,
        Builtin::Contains,
        Builtin::Matches,
        Builtin::InRange,
        Builtin::If,
        Builtin::Not,
        Builtin::Exists,
        Builtin::Missing,
        Builtin::Property,
        Builtin::ToInt,
    ];

    /// look up a builtin by its case-sensitive name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Length => "length",
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Substring => "substring",
            Builtin::IndexOf => "indexOf",
            Builtin::Contains => "contains",
            Builtin::Matches => "matches",
            Builtin::InRange => "inrange",
            Builtin::If => "if",
            Builtin::Not => "not",
            Builtin::Exists => "exists",
            Builtin::Missing => "missing",
            Builtin::Property => "property",
            Builtin::ToInt => "toInt",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// the functions one evaluation may call, bound to a property source
pub struct FunctionRegistry<'a> {
    resolver: &'a dyn PropertyResolver,
    overrides: HashMap<String, Function<'a>>,
}

impl<'a> FunctionRegistry<'a> {
    /// registry with only the built-ins
    pub fn new(resolver: &'a dyn PropertyResolver) -> Self {
        Self {
            resolver,
            overrides: HashMap::new(),
        }
    }

    /// register or replace a function; other entries are unaffected
    pub fn put<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> ConditionResult<Value> + 'a,
    {
        self.overrides.insert(name.into(), Box::new(function));
    }

    /// drop an override, restoring the built-in if there is one
    pub fn remove_override(&mut self, name: &str) -> bool {
        self.overrides.remove(name).is_some()
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.has_override(name) || Builtin::from_name(name).is_some()
    }

    /// every callable name, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Builtin::ALL.iter().map(|b| b.name().to_string()).collect();
        for name in self.overrides.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        names
    }

    pub fn resolver(&self) -> &'a dyn PropertyResolver {
        self.resolver
    }

    /// call a function with already evaluated arguments
    pub fn call(&self, name: &str, args: &[Value]) -> ConditionResult<Value> {
        trace!(function = name, args = args.len(), "calling condition function");

        if let Some(function) = self.overrides.get(name) {
            return function(args);
        }

        match Builtin::from_name(name) {
            Some(builtin) => self.call_builtin(builtin, args),
            None => Err(ConditionError::UnknownFunction {
                name: name.to_string(),
                suggestion: self.suggest(name),
            }),
        }
    }

    /// value of a property as seen by conditions, honouring a `property` override
    pub fn property(&self, name: &str) -> ConditionResult<Value> {
        self.call(Builtin::Property.name(), &[Value::String(name.to_string())])
    }

    /// expand `${...}` references in text through [`Self::property`]
    pub fn interpolate(&self, text: &str) -> ConditionResult<String> {
        interpolate(text, |name| {
            Ok(match self.property(name)? {
                Value::Null => None,
                value => Some(convert::to_string(&value)),
            })
        })
    }

    fn suggest(&self, name: &str) -> Option<String> {
        self.names()
            .into_iter()
            .map(|candidate| (strsim::levenshtein(name, &candidate), candidate))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate)
    }

    fn call_builtin(&self, builtin: Builtin, args: &[Value]) -> ConditionResult<Value> {
        let name = builtin.name();
        match builtin {
            Builtin::Length => {
                arity(name, args, 1, 1)?;
                let s = string_arg(name, &args[0])?;
                Ok(Value::Number(s.chars().count() as f64))
            }
            Builtin::Upper => {
                arity(name, args, 1, 1)?;
                Ok(Value::String(string_arg(name, &args[0])?.to_uppercase()))
            }
            Builtin::Lower => {
                arity(name, args, 1, 1)?;
                Ok(Value::String(string_arg(name, &args[0])?.to_lowercase()))
            }
            Builtin::Substring => {
                arity(name, args, 2, 3)?;
                let s = string_arg(name, &args[0])?;
                let chars: Vec<char> = s.chars().collect();
                let start = convert::to_int(&args[1])?;
                let end = match args.get(2) {
                    Some(end) => convert::to_int(end)?,
                    None => chars.len() as i64,
                };
                if start < 0 || end > chars.len() as i64 || start > end {
                    return Err(ConditionError::function(
                        name,
                        format!(
                            "index out of range: begin {}, end {}, length {}",
                            start,
                            end,
                            chars.len()
                        ),
                    ));
                }
                Ok(Value::String(chars[start as usize..end as usize].iter().collect()))
            }
            Builtin::IndexOf => {
                arity(name, args, 2, 2)?;
                let s = string_arg(name, &args[0])?;
                let needle = string_arg(name, &args[1])?;
                let index = s
                    .find(needle.as_str())
                    .map(|byte| s[..byte].chars().count() as f64)
                    .unwrap_or(-1.0);
                Ok(Value::Number(index))
            }
            Builtin::Contains => {
                arity(name, args, 2, 2)?;
                let s = string_arg(name, &args[0])?;
                let needle = string_arg(name, &args[1])?;
                Ok(Value::Bool(s.contains(needle.as_str())))
            }
            Builtin::Matches => {
                arity(name, args, 2, 2)?;
                let s = string_arg(name, &args[0])?;
                let pattern = string_arg(name, &args[1])?;
                let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                    ConditionError::function(name, format!("invalid pattern '{}': {}", pattern, e))
                })?;
                Ok(Value::Bool(regex.is_match(&s)))
            }
            Builtin::InRange => {
                arity(name, args, 2, 2)?;
                let version = string_arg(name, &args[0])?;
                let range = string_arg(name, &args[1])?;
                let version = Version::parse(&version)
                    .map_err(|e| ConditionError::function(name, e.to_string()))?;
                let range = VersionRange::parse(&range)
                    .map_err(|e| ConditionError::function(name, e.to_string()))?;
                Ok(Value::Bool(range.contains(&version)))
            }
            Builtin::If => {
                arity(name, args, 3, 3)?;
                let chosen = if convert::to_boolean(&args[0]) {
                    &args[1]
                } else {
                    &args[2]
                };
                Ok(chosen.clone())
            }
            Builtin::Not => {
                arity(name, args, 1, 1)?;
                Ok(Value::Bool(!convert::to_boolean(&args[0])))
            }
            Builtin::Exists | Builtin::Missing => {
                arity(name, args, 1, 1)?;
                // arguments arrive already expanded by the evaluator
                let path = string_arg(name, &args[0])?;
                let exists = resolve_path(&path, self.resolver.base_directory()).exists();
                trace!(path = %path, exists, "checked file");
                Ok(Value::Bool(if builtin == Builtin::Exists {
                    exists
                } else {
                    !exists
                }))
            }
            Builtin::Property => {
                arity(name, args, 1, 1)?;
                let key = string_arg(name, &args[0])?;
                if key.is_empty() {
                    return Ok(Value::String(String::new()));
                }
                match self.resolver.property(&key)? {
                    Some(value) => {
                        let expanded: ConditionResult<String> =
                            interpolate(&value, |inner| Ok(self.resolver.property(inner)?));
                        Ok(Value::String(expanded?))
                    }
                    None => Ok(Value::Null),
                }
            }
            Builtin::ToInt => {
                arity(name, args, 1, 1)?;
                Ok(Value::Number(convert::to_int(&args[0])? as f64))
            }
        }
    }
}

impl fmt::Debug for FunctionRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<&String> = self.overrides.keys().collect();
        overrides.sort();
        f.debug_struct("FunctionRegistry")
            .field("overrides", &overrides)
            .finish()
    }
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> ConditionResult<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = match (min, max) {
        (1, 1) => "1",
        (2, 2) => "2",
        (3, 3) => "3",
        (2, 3) => "2 or 3",
        _ => "a different number of",
    };
    Err(ConditionError::Arity {
        name: name.to_string(),
        expected,
        actual: args.len(),
    })
}

fn string_arg(name: &str, value: &Value) -> ConditionResult<String> {
    match value {
        Value::Null => Err(ConditionError::type_error(format!(
            "{}: expected a string, got null",
            name
        ))),
        other => Ok(convert::to_string(other)),
    }
}
