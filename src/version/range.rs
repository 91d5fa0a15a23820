//! version ranges in bracket notation
//!
//! `[` / `]` are inclusive bounds, `(` / `)` exclusive, an empty bound is
//! unbounded: `[1.4,1.5)`, `(,1.6)`, `[1.5,)`, `[2.0]`. several
//! restrictions may be joined with commas, `(,1.0],[1.2,)`, as long as
//! they are in ascending order and do not overlap.

use std::fmt;

use super::{Version, VersionError};

/// one end of a restriction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

/// a single interval of versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Restriction {
    pub fn lower(&self) -> Option<&Bound> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Bound> {
        self.upper.as_ref()
    }

    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = match &self.lower {
            Some(b) if b.inclusive => version >= &b.version,
            Some(b) => version > &b.version,
            None => true,
        };
        let below_upper = match &self.upper {
            Some(b) if b.inclusive => version <= &b.version,
            Some(b) => version < &b.version,
            None => true,
        };
        above_lower && below_upper
    }

    fn parse(range: &str, spec: &str) -> Result<Self, VersionError> {
        let lower_inclusive = spec.starts_with('[');
        let upper_inclusive = spec.ends_with(']');

        let inner = &spec[1..spec.len() - 1];
        if inner.contains(['[', ']', '(', ')']) {
            return Err(VersionError::range(range, "nested brackets are not allowed"));
        }

        let Some((lower, upper)) = inner.split_once(',') else {
            // single version: [1.0]
            if !lower_inclusive || !upper_inclusive {
                return Err(VersionError::range(
                    range,
                    "a single version must be surrounded by []",
                ));
            }
            let version = parse_bound(range, inner)?;
            return Ok(Self {
                lower: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version,
                    inclusive: true,
                }),
            });
        };

        if upper.contains(',') {
            return Err(VersionError::range(range, "too many bounds"));
        }

        let lower = match lower.trim() {
            "" => None,
            text => Some(Bound {
                version: parse_bound(range, text)?,
                inclusive: lower_inclusive,
            }),
        };
        let upper = match upper.trim() {
            "" => None,
            text => Some(Bound {
                version: parse_bound(range, text)?,
                inclusive: upper_inclusive,
            }),
        };

        Ok(Self { lower, upper })
    }

    fn try_map<E>(&self, f: &mut impl FnMut(&Version) -> Result<Version, E>) -> Result<Self, E> {
        let mut map_bound = |bound: &Option<Bound>| -> Result<Option<Bound>, E> {
            bound
                .as_ref()
                .map(|b| {
                    f(&b.version).map(|version| Bound {
                        version,
                        inclusive: b.inclusive,
                    })
                })
                .transpose()
        };
        Ok(Self {
            lower: map_bound(&self.lower)?,
            upper: map_bound(&self.upper)?,
        })
    }

    /// true when `next` starts below the end of `self`
    fn overlaps_next(&self, next: &Restriction) -> bool {
        match (&self.upper, &next.lower) {
            (None, _) | (_, None) => true,
            (Some(upper), Some(lower)) => lower.version < upper.version,
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(l), Some(u)) = (&self.lower, &self.upper) {
            if l.inclusive && u.inclusive && l.version.as_str() == u.version.as_str() {
                return write!(f, "[{}]", l.version);
            }
        }
        match &self.lower {
            Some(b) => write!(f, "{}{}", if b.inclusive { '[' } else { '(' }, b.version)?,
            None => write!(f, "(")?,
        }
        write!(f, ",")?;
        match &self.upper {
            Some(b) => write!(f, "{}{}", b.version, if b.inclusive { ']' } else { ')' }),
            None => write!(f, ")"),
        }
    }
}

/// one or more restrictions, matching a version inside any of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// parse a range like `[1.4,1.5)` or `(,1.0],[1.2,)`
    ///
    /// a restriction whose lower bound is above its upper bound is accepted
    /// and simply never matches.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let mut rest = input.trim();
        if rest.is_empty() {
            return Err(VersionError::range(input, "range is empty"));
        }
        if !rest.starts_with(['[', '(']) {
            return Err(VersionError::range(
                input,
                "a range must start with either [ or (",
            ));
        }

        let mut restrictions: Vec<Restriction> = Vec::new();
        while !rest.is_empty() {
            if !rest.starts_with(['[', '(']) {
                return Err(VersionError::range(
                    input,
                    "only bracketed restrictions can be combined",
                ));
            }
            let close = rest
                .find([']', ')'])
                .ok_or_else(|| VersionError::range(input, "a range must end with either ] or )"))?;

            let restriction = Restriction::parse(input, &rest[..=close])?;
            if let Some(previous) = restrictions.last() {
                if previous.overlaps_next(&restriction) {
                    return Err(VersionError::range(
                        input,
                        "restrictions overlap or are out of order",
                    ));
                }
            }
            restrictions.push(restriction);

            rest = rest[close + 1..].trim_start();
            if let Some(after) = rest.strip_prefix(',') {
                rest = after.trim_start();
                if rest.is_empty() {
                    return Err(VersionError::range(input, "trailing ','"));
                }
            } else if !rest.is_empty() {
                return Err(VersionError::range(
                    input,
                    "restrictions must be separated by ','",
                ));
            }
        }

        Ok(Self { restrictions })
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// check whether `version` lies inside any restriction
    pub fn contains(&self, version: &Version) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }

    /// rebuild the range with every bound passed through `f`
    pub fn try_map<E>(&self, mut f: impl FnMut(&Version) -> Result<Version, E>) -> Result<Self, E> {
        let restrictions = self
            .restrictions
            .iter()
            .map(|r| r.try_map(&mut f))
            .collect::<Result<_, _>>()?;
        Ok(Self { restrictions })
    }
}

fn parse_bound(range: &str, text: &str) -> Result<Version, VersionError> {
    Version::parse(text).map_err(|_| VersionError::range(range, format!("invalid bound '{}'", text.trim())))
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, restriction) in self.restrictions.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", restriction)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}
