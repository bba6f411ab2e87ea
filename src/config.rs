//! Layered configuration for the analyzer.
//!
//! Sources, later wins:
//! - built-in defaults
//! - `symshake.toml` in the working directory
//! - `SYMSHAKE_*` environment variables (double underscore separates
//!   nesting: `SYMSHAKE_ANALYSIS__STRICT=true` sets `analysis.strict`)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Version of the configuration schema.
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Options consumed by the extractor and analyzer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Emit dependencies on ambient standard-library symbols.
    #[serde(default = "default_false")]
    pub include_system_symbols: bool,

    /// Emit dependencies on symbols imported from bare module specifiers.
    #[serde(default = "default_false")]
    pub include_node_modules: bool,

    /// Follow references to declarations used purely as types. Off by
    /// default: types carry no runtime cost, mirroring tree-shake semantics.
    #[serde(default = "default_false")]
    pub follow_type_only_imports: bool,

    /// Fail the run when the parser reports errors.
    #[serde(default = "default_false")]
    pub strict: bool,

    /// Extract distinct files on worker threads. Table insertion is always
    /// serialized.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

/// Options consumed by the reporter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Node cap for DOT graph output.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Restrict DOT output to included symbols.
    #[serde(default = "default_false")]
    pub included_only: bool,

    /// Append `file:line` to adjacency-list entries.
    #[serde(default = "default_false")]
    pub show_location: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level filter (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `extractor = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}
fn default_max_nodes() -> usize {
    100
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            analysis: AnalysisConfig::default(),
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_system_symbols: false,
            include_node_modules: false,
            follow_type_only_imports: false,
            strict: false,
            parallel: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            included_only: false,
            show_location: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings with the full layering.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("symshake.toml"))
            .merge(Env::prefixed("SYMSHAKE_").split("__"))
            .extract()
    }
}
