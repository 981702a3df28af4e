use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::errors::{BridgeError, BridgeResult};

/// How the bridge treats overrides of methods marked final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalMethodPolicy {
    /// Final methods are forwarded like any other
    #[default]
    Dispatch,
    /// Final methods are never forwarded
    Ignore,
    /// An override of a final method is an error
    Reject,
}

impl FromStr for FinalMethodPolicy {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dispatch" => Ok(Self::Dispatch),
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(BridgeError::Config(format!("unknown final method policy '{}'", other))),
        }
    }
}

/// Result returned for calls the bridge does not forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultResult {
    /// Always `Null`
    #[default]
    Null,
    /// Zero value of the declared return type, `Null` when none is declared
    TypeDefault,
}

impl FromStr for DefaultResult {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "null" => Ok(Self::Null),
            "type_default" | "type-default" => Ok(Self::TypeDefault),
            other => Err(BridgeError::Config(format!("unknown default result '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub final_methods: FinalMethodPolicy,

    #[serde(default)]
    pub default_result: DefaultResult,

    /// Coerce callback results to the declared return type, when known
    #[serde(default = "default_true")]
    pub coerce_returns: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            final_methods: FinalMethodPolicy::default(),
            default_result: DefaultResult::default(),
            coerce_returns: true,
        }
    }
}

fn default_true() -> bool { true }

/// On-disk layout: settings live under a `[bridge]` table
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    bridge: BridgeConfig,
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> BridgeResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> BridgeResult<Self> {
        toml::from_str::<ConfigFile>(content)
            .map(|file| file.bridge)
            .map_err(|e| BridgeError::Config(format!("failed to parse config: {}", e)))
    }

    /// Defaults overridden by environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // PROXY_BRIDGE_FINAL_METHODS: dispatch, ignore, reject
        if let Some(policy) = env_parse::<FinalMethodPolicy>("PROXY_BRIDGE_FINAL_METHODS") {
            config.final_methods = policy;
        }

        // PROXY_BRIDGE_DEFAULT_RESULT: null, type_default
        if let Some(result) = env_parse::<DefaultResult>("PROXY_BRIDGE_DEFAULT_RESULT") {
            config.default_result = result;
        }

        // PROXY_BRIDGE_COERCE_RETURNS: true/false or 1/0
        if let Some(enabled) = std::env::var("PROXY_BRIDGE_COERCE_RETURNS")
            .ok()
            .and_then(|val| parse_flag(&val))
        {
            config.coerce_returns = enabled;
        }

        config
    }

    pub fn with_final_methods(mut self, policy: FinalMethodPolicy) -> Self {
        self.final_methods = policy;
        self
    }

    pub fn with_default_result(mut self, result: DefaultResult) -> Self {
        self.default_result = result;
        self
    }

    pub fn with_coerce_returns(mut self, enabled: bool) -> Self {
        self.coerce_returns = enabled;
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
