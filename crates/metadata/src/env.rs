//! Binding of environment variables onto provider structs.
//!
//! Each provider declares a table of [`EnvVar`] entries naming a variable,
//! the field it populates and whether it must be non-empty. [`bind`] walks
//! the table once, collecting every problem before failing so that a
//! misconfigured build reports all of its issues together.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Snapshot of the process environment, keyed by variable name.
pub type Env = HashMap<String, String>;

/// Read a variable, treating unset and empty the same way.
#[must_use]
pub fn lookup<'a>(envs: &'a Env, name: &str) -> &'a str {
    envs.get(name).map_or("", String::as_str)
}

/// Where a parsed value lands in the target struct.
pub(crate) enum Binding<T> {
    Text(fn(&mut T) -> &mut String),
    Uint64(fn(&mut T) -> &mut u64),
    Uint32(fn(&mut T) -> &mut u32),
    Flag(fn(&mut T) -> &mut bool),
}

/// One row of a provider's environment table.
pub(crate) struct EnvVar<T> {
    name: &'static str,
    required: bool,
    binding: Binding<T>,
}

impl<T> EnvVar<T> {
    pub(crate) const fn text(name: &'static str, field: fn(&mut T) -> &mut String) -> Self {
        Self {
            name,
            required: false,
            binding: Binding::Text(field),
        }
    }

    /// A string variable that must be present and non-empty.
    pub(crate) const fn required(name: &'static str, field: fn(&mut T) -> &mut String) -> Self {
        Self {
            name,
            required: true,
            binding: Binding::Text(field),
        }
    }

    pub(crate) const fn uint64(name: &'static str, field: fn(&mut T) -> &mut u64) -> Self {
        Self {
            name,
            required: false,
            binding: Binding::Uint64(field),
        }
    }

    pub(crate) const fn uint32(name: &'static str, field: fn(&mut T) -> &mut u32) -> Self {
        Self {
            name,
            required: false,
            binding: Binding::Uint32(field),
        }
    }

    pub(crate) const fn flag(name: &'static str, field: fn(&mut T) -> &mut bool) -> Self {
        Self {
            name,
            required: false,
            binding: Binding::Flag(field),
        }
    }
}

/// Populate a fresh `T` from `envs` according to `table`.
///
/// Unset or empty variables leave the field at its default. Required
/// variables that are unset or empty, and values that fail to parse as
/// the declared type, are reported together in a single [`Error::Env`].
pub(crate) fn bind<T: Default>(envs: &Env, table: &[EnvVar<T>]) -> Result<T> {
    let mut target = T::default();
    let mut problems = Vec::new();

    for var in table {
        let value = lookup(envs, var.name);
        if value.is_empty() {
            if var.required {
                problems.push(format!(
                    "environment variable {:?} should not be empty",
                    var.name
                ));
            }
            continue;
        }

        let parsed = match &var.binding {
            Binding::Text(field) => {
                *field(&mut target) = value.to_string();
                Ok(())
            }
            Binding::Uint64(field) => value
                .parse::<u64>()
                .map(|n| *field(&mut target) = n)
                .map_err(|_| "an unsigned integer"),
            Binding::Uint32(field) => value
                .parse::<u32>()
                .map(|n| *field(&mut target) = n)
                .map_err(|_| "an unsigned integer"),
            Binding::Flag(field) => parse_bool(value)
                .map(|b| *field(&mut target) = b)
                .ok_or("a boolean"),
        };

        if let Err(expected) = parsed {
            problems.push(format!(
                "environment variable {:?} has invalid value {:?}: expected {expected}",
                var.name, value
            ));
        }
    }

    if problems.is_empty() {
        Ok(target)
    } else {
        Err(Error::env(problems))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
