//! Per-invocation state shared by the commands.

use anyhow::{Context, Result};
use costblame_core::CostBlameConfig;
use costblame_core::source::{CostExplorerSource, CostSource, FileCostSource};
use tracing::debug;

/// Resolved configuration plus access to the billing source.
pub struct AppContext {
    /// Layered configuration with command-line overrides applied.
    pub config: CostBlameConfig,
}

impl AppContext {
    pub fn new(config: CostBlameConfig) -> Self {
        Self { config }
    }

    /// Open the billing source: the configured export file if any, otherwise Cost Explorer.
    pub async fn open_source(&self) -> Result<Box<dyn CostSource>> {
        if let Some(path) = &self.config.input {
            debug!(path = %path.display(), "Using billing export");
            let source = FileCostSource::open(path)
                .with_context(|| format!("failed to load billing export {}", path.display()))?;
            return Ok(Box::new(source));
        }

        debug!(region = self.config.region(), "Using AWS Cost Explorer");
        Ok(Box::new(CostExplorerSource::connect(self.config.profile.as_deref(), self.config.region()).await))
    }

    /// JSON output requested by flag or configuration.
    pub fn wants_json(&self, flag: bool) -> bool {
        flag || self.config.prefers_json()
    }
}
