//! Startup configuration: the repository command table and server settings.
//!
//! Every environment variable whose name contains [`ENV_MARKER`] is a
//! repository entry of the form `<repository>:<command>[ <arg> ...]`.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AutodockError, Result};

/// Substring that marks an environment variable as a repository entry
pub const ENV_MARKER: &str = "AUTODOCK_";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60 * 60;
const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 30;

/// Program plus arguments, split on whitespace.
/// Arguments containing spaces cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    /// Returns None when `command` holds no tokens.
    pub fn parse(command: &str) -> Option<Self> {
        let tokens: Vec<String> = command.split_whitespace().map(String::from).collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Splits an entry value into the repository name and its command line.
///
/// Only the first `:` separates the repository; the rest of the value is
/// rejoined before the whitespace split, so `myrepo:echo hi:there` yields
/// `["echo", "hi:there"]`.
pub fn parse_entry(value: &str) -> std::result::Result<(String, CommandLine), String> {
    let mut segments = value.split(':');
    let repo = segments.next().unwrap_or_default();
    let command = segments.collect::<Vec<_>>().join(":");

    if repo.is_empty() {
        return Err("empty repository name".to_string());
    }
    let command_line =
        CommandLine::parse(&command).ok_or_else(|| "no command given".to_string())?;

    Ok((repo.to_string(), command_line))
}

/// Repository name -> command line. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CommandMapping {
    commands: HashMap<String, CommandLine>,
}

impl CommandMapping {
    /// Builds the mapping from `(key, value)` pairs, keeping only keys that
    /// contain [`ENV_MARKER`]. Later entries for the same repository replace
    /// earlier ones. Malformed entries are logged and skipped.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut commands = HashMap::new();

        for (key, value) in vars {
            let key = key.as_ref();
            if !key.contains(ENV_MARKER) {
                continue;
            }

            match parse_entry(value.as_ref()) {
                Ok((repo, command)) => {
                    debug!("{} -> {}: {}", key, repo, command);
                    if let Some(previous) = commands.insert(repo.clone(), command) {
                        warn!(
                            "Repository '{}' configured more than once, '{}' replaced by {}",
                            repo, previous, key
                        );
                    }
                }
                Err(reason) => {
                    let err = AutodockError::InvalidEntry {
                        key: key.to_string(),
                        reason,
                    };
                    warn!("Skipping entry: {}", err);
                }
            }
        }

        if commands.is_empty() {
            return Err(AutodockError::NoRepositoriesConfigured);
        }

        Ok(Self { commands })
    }

    /// Scans the process environment. Iteration order of the environment is
    /// unspecified, so duplicate repositories resolve arbitrarily.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    pub fn get(&self, repo: &str) -> Option<&CommandLine> {
        self.commands.get(repo)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CommandLine)> {
        self.commands.iter()
    }

    /// Repository names, sorted.
    pub fn repositories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: String,
    pub command_timeout: Duration,
    pub callback_timeout: Duration,
    pub log_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            callback_timeout: Duration::from_secs(DEFAULT_CALLBACK_TIMEOUT_SECS),
            log_dir: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secs = |name: &str, default: Duration| -> Result<Duration> {
            match lookup(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| {
                        AutodockError::ConfigError(format!("{} must be whole seconds: {}", name, e))
                    }),
                None => Ok(default),
            }
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            command_timeout: secs("COMMAND_TIMEOUT_SECS", defaults.command_timeout)?,
            callback_timeout: secs("CALLBACK_TIMEOUT_SECS", defaults.callback_timeout)?,
            log_dir: lookup("LOG_DIR").filter(|dir| !dir.is_empty()),
        })
    }
}
