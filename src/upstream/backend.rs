//! Backend service identity.
//!
//! # Responsibilities
//! - Name the two upstream services the gateway fronts
//! - Provide stable labels for logs and metrics

use std::fmt;

/// One of the two backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Ingests uploads, Wikipedia articles and scripts into collections.
    DataCollector,
    /// Generates scripts from collections.
    ScriptGenerator,
}

impl Backend {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Backend::DataCollector => "data-collector",
            Backend::ScriptGenerator => "script-generator",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::DataCollector => write!(f, "data collector"),
            Backend::ScriptGenerator => write!(f, "script generator"),
        }
    }
}
