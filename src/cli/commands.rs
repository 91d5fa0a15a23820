use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::activation::{ProfileSelector, Severity, SimpleProblemCollector};
use crate::conditions::{ConditionError, ConditionParser, FunctionRegistry};
use crate::config::{self, Config};
use crate::properties::ActivationContext;
use crate::version::{Version, VersionRange};

use super::exit_codes;
use super::output::{
    self, EvalData, OutputMode, ProfileData, SelectData, VerifyData, VersionCompareData,
    VersionInData,
};

#[derive(Parser)]
#[command(name = "pactl")]
#[command(about = "Evaluate profile activation conditions and select active profiles")]
#[command(version)]
pub struct Cli {
    /// Path to the profile-set file (overrides PACTL_CONFIG and ./profiles.json5)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Define a user property
    #[arg(
        short = 'D',
        long = "define",
        global = true,
        value_name = "NAME=VALUE",
        value_parser = parse_define,
        action = ArgAction::Append
    )]
    pub defines: Vec<(String, String)>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log level or filter directive, overrides -v and settings.log_level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a condition expression and print its value
    Eval {
        /// Expression, e.g. "${os.name} == 'Linux' && exists('pom.xml')"
        expression: String,
    },

    /// List the profiles that are active for the current environment
    Select {
        /// Profile ids to activate, prefix with '!' or '-' to deactivate
        #[arg(
            short = 'P',
            long = "profiles",
            value_delimiter = ',',
            allow_hyphen_values = true,
            action = ArgAction::Append
        )]
        profiles: Vec<String>,
    },

    /// Validate the profile-set file
    Verify,

    /// Compare two versions, prints -1, 0 or 1
    VersionCompare { left: String, right: String },

    /// Check whether a version lies in a range (exit 0 if it does, 1 if not)
    VersionIn { version: String, range: String },
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim(), value),
        // bare `-Dflag` means `flag=true`
        None => (raw.trim(), "true"),
    };
    if name.is_empty() {
        return Err(format!("invalid property definition '{}': missing name", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

/// split `-P` entries into (activate, deactivate)
fn split_profile_ids(ids: &[String]) -> (Vec<String>, Vec<String>) {
    let mut active = Vec::new();
    let mut inactive = Vec::new();

    for id in ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if let Some(rest) = id.strip_prefix('!').or_else(|| id.strip_prefix('-')) {
            inactive.push(rest.to_string());
        } else {
            active.push(id.strip_prefix('+').unwrap_or(id).to_string());
        }
    }

    (active, inactive)
}

/// log level from flags, then the profile-set file, then the default
pub fn log_level(cli: &Cli, settings: Option<&config::Settings>) -> String {
    if let Some(level) = &cli.log_level {
        return level.clone();
    }
    match cli.verbose {
        0 => settings
            .map(|s| s.log_level.clone())
            .unwrap_or_else(|| config::DEFAULT_LOG_LEVEL.to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// print an error in the requested mode and exit with `code`
fn fail(mode: OutputMode, code: i32, message: &str, details: Vec<String>) -> ! {
    if mode.is_json() {
        output::print_json_error_with_details(code, message, details);
    } else {
        eprintln!("error: {}", message);
        for detail in &details {
            eprintln!("  - {}", detail);
        }
    }
    std::process::exit(code);
}

struct Loaded {
    config: Config,
    dir: Option<PathBuf>,
}

/// load the profile-set file; a missing file is only an error when it was
/// named explicitly
fn load_config(cli: &Cli, path: &Path) -> Result<Loaded> {
    let config = if cli.config.is_some() {
        if !path.exists() {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        config::load(path)?
    } else {
        config::load_or_default(path)?
    };

    Ok(Loaded {
        config,
        dir: config::config_dir(path),
    })
}

fn activation_context(cli: &Cli, loaded: &Loaded) -> ActivationContext {
    let mut ctx = loaded.config.activation_context(loaded.dir.as_deref());
    let defines: HashMap<String, String> = cli.defines.iter().cloned().collect();
    ctx.user_properties.extend(defines);
    ctx
}

pub fn execute(cli: Cli) -> Result<()> {
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);
    let config_path = config::get_config_path(cli.config.as_deref());

    match &cli.command {
        Commands::Eval { expression } => {
            let loaded = load_config(&cli, &config_path)
                .unwrap_or_else(|e| fail(output_mode, exit_codes::CONFIG_ERROR, &format!("{:#}", e), vec![]));
            let ctx = activation_context(&cli, &loaded);

            let parser = ConditionParser::new(FunctionRegistry::new(&ctx));
            match parser.parse(expression) {
                Ok(value) => {
                    if output_mode.is_json() {
                        output::print_json(&EvalData::new(expression, &value));
                    } else if !output_mode.is_quiet() {
                        println!("{}", value);
                    }
                    Ok(())
                }
                Err(ConditionError::Property(e)) if e.is_fatal() => {
                    fail(output_mode, exit_codes::ROOT_NOT_FOUND, &e.to_string(), vec![])
                }
                Err(e) => fail(output_mode, exit_codes::EVALUATION_ERROR, &e.to_string(), vec![]),
            }
        }

        Commands::Select { profiles } => {
            let loaded = load_config(&cli, &config_path)
                .unwrap_or_else(|e| fail(output_mode, exit_codes::CONFIG_ERROR, &format!("{:#}", e), vec![]));
            let mut ctx = activation_context(&cli, &loaded);
            let (activate, deactivate) = split_profile_ids(profiles);
            ctx.active_profile_ids.extend(activate);
            ctx.inactive_profile_ids.extend(deactivate);

            let mut problems = SimpleProblemCollector::new();
            let active = match ProfileSelector::new().active_profiles(
                &loaded.config.profiles,
                &ctx,
                &mut problems,
            ) {
                Ok(active) => active,
                Err(e) if e.is_root_not_found() => {
                    fail(output_mode, exit_codes::ROOT_NOT_FOUND, &e.to_string(), vec![])
                }
                Err(e) => fail(output_mode, exit_codes::EVALUATION_ERROR, &e.to_string(), vec![]),
            };

            let has_errors = problems
                .problems()
                .iter()
                .any(|p| p.severity == Severity::Error);

            if output_mode.is_json() {
                output::print_json(&SelectData {
                    active: active.iter().map(|p| ProfileData::from(*p)).collect(),
                    problems: problems.into_problems(),
                });
            } else {
                if !output_mode.is_quiet() {
                    for profile in &active {
                        println!("{} ({})", profile.id, profile.source);
                    }
                }
                for problem in problems.problems() {
                    eprintln!("{}", problem);
                }
            }

            if has_errors {
                std::process::exit(exit_codes::EVALUATION_ERROR);
            }
            Ok(())
        }

        Commands::Verify => {
            let errors = config::verify(&config_path)
                .unwrap_or_else(|e| fail(output_mode, exit_codes::CONFIG_ERROR, &e.to_string(), vec![]));

            if !errors.is_empty() {
                let message = format!(
                    "profile set has {} error(s): {}",
                    errors.len(),
                    config_path.display()
                );
                fail(output_mode, exit_codes::CONFIG_ERROR, &message, errors);
            }

            if output_mode.is_json() {
                output::print_json(&VerifyData {
                    path: config_path.display().to_string(),
                    valid: true,
                });
            } else if !output_mode.is_quiet() {
                println!("✓ Profile set is valid: {}", config_path.display());
            }
            Ok(())
        }

        Commands::VersionCompare { left, right } => {
            let parse = |raw: &str| {
                Version::parse(raw).unwrap_or_else(|e| {
                    fail(output_mode, exit_codes::INVALID_ARGS, &e.to_string(), vec![])
                })
            };
            let (a, b) = (parse(left), parse(right));
            let ordering: i8 = match a.cmp(&b) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            };

            if output_mode.is_json() {
                output::print_json(&VersionCompareData {
                    left: left.clone(),
                    right: right.clone(),
                    ordering,
                });
            } else if !output_mode.is_quiet() {
                println!("{}", ordering);
            }
            Ok(())
        }

        Commands::VersionIn { version, range } => {
            let parsed = Version::parse(version)
                .unwrap_or_else(|e| fail(output_mode, exit_codes::INVALID_ARGS, &e.to_string(), vec![]));
            let bounds = VersionRange::parse(range)
                .unwrap_or_else(|e| fail(output_mode, exit_codes::INVALID_ARGS, &e.to_string(), vec![]));
            let contained = bounds.contains(&parsed);

            if output_mode.is_json() {
                output::print_json(&VersionInData {
                    version: version.clone(),
                    range: range.clone(),
                    contained,
                });
            } else if !output_mode.is_quiet() {
                println!("{}", contained);
            }

            if !contained {
                std::process::exit(exit_codes::ERROR);
            }
            Ok(())
        }
    }
}
