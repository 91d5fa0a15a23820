//! condition expressions and profile activation
//!
//! profiles are switched on by activation clauses: a jdk version or range,
//! the host os, a property, the presence of files, or a free-form condition
//! such as `${os.name} == 'Linux' && inrange(${java.version}, '[11,)')`.

pub mod activation;
pub mod cli;
pub mod conditions;
pub mod config;
pub mod profile;
pub mod properties;
pub mod version;
