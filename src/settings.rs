use std::path::PathBuf;

use femora_embed::{ConflictPolicy, RegistryConfig, RegistryError};

/// Environment variable naming the conflict policy.
pub const CONFLICT_POLICY_VAR: &str = "FEMORA_CONFLICT_POLICY";

/// Run-time settings for the command line tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// JSON file of records; the built-in pile group is used when absent.
    pub input: Option<PathBuf>,
    /// Registry configuration.
    pub registry: RegistryConfig,
}

impl Settings {
    /// Read settings from the process arguments and environment.
    pub fn from_env() -> Result<Self, RegistryError> {
        let policy = std::env::var(CONFLICT_POLICY_VAR).ok();
        let input = std::env::args_os().nth(1).map(PathBuf::from);
        Self::from_parts(input, policy.as_deref())
    }

    /// Build settings from an optional input path and policy name.
    pub fn from_parts(
        input: Option<PathBuf>,
        policy: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let conflict_policy = match policy {
            Some(name) => name.parse()?,
            None => ConflictPolicy::default(),
        };
        Ok(Self {
            input,
            registry: RegistryConfig { conflict_policy },
        })
    }
}
