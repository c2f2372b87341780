//! Wiring of configuration, devices and inputs for one command

use std::fs;
use std::path::Path;
use std::sync::Arc;

use intent_compare::{ConfigComparator, ListKeyResolver, SchemaKeySource, StaticKeySource};
use intent_core::{AuditOrchestrator, EngineConfig, StaticRenderer, SynchronizationEngine};
use intent_model::Intent;
use intent_restconf::{
    DeviceClient, HttpDeviceClient, HttpMisalignmentResolver, HttpSchemaKeySource,
    MisalignmentResolver,
};

use crate::error::{CliError, Result};

/// Everything a command needs to talk to the controller
pub struct Context {
    config: EngineConfig,
    devices: Arc<dyn DeviceClient>,
    resolver: Option<Arc<dyn MisalignmentResolver>>,
}

impl Context {
    /// Load configuration (defaults when `path` is `None`) and build clients
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        tracing::debug!(base_url = %config.restconf.base_url, "Loaded engine configuration");

        let devices: Arc<dyn DeviceClient> =
            Arc::new(HttpDeviceClient::new(config.restconf.clone())?);
        let resolver = HttpMisalignmentResolver::from_config(&config.resolver, &config.restconf)?
            .map(|r| Arc::new(r) as Arc<dyn MisalignmentResolver>);

        Ok(Self {
            config,
            devices,
            resolver,
        })
    }

    /// Synchronization engine over pre-rendered site objects
    pub fn engine(&self, renderer: StaticRenderer) -> SynchronizationEngine {
        let engine = SynchronizationEngine::new(Arc::clone(&self.devices), Arc::new(renderer))
            .with_settings(self.config.engine.clone());
        match &self.resolver {
            Some(resolver) => engine.with_resolver(Arc::clone(resolver)),
            None => engine,
        }
    }

    /// Audit orchestrator over pre-rendered site objects
    pub fn orchestrator(&self, renderer: StaticRenderer) -> Result<AuditOrchestrator> {
        let keys: Arc<dyn SchemaKeySource> = match &self.config.schema.base_url {
            Some(base_url) => Arc::new(HttpSchemaKeySource::new(base_url.clone(), &self.config.restconf)?),
            None => Arc::new(StaticKeySource::new()),
        };
        let orchestrator = AuditOrchestrator::new(
            Arc::clone(&self.devices),
            Arc::new(renderer),
            ConfigComparator::new(ListKeyResolver::new(keys)),
        )
        .with_settings(self.config.engine.clone());
        Ok(match &self.resolver {
            Some(resolver) => orchestrator.with_resolver(Arc::clone(resolver)),
            None => orchestrator,
        })
    }
}

/// Read an intent document
pub fn read_intent(path: &Path) -> Result<Intent> {
    let content = fs::read_to_string(path).map_err(|e| CliError::input(path, e))?;
    serde_json::from_str(&content).map_err(|e| CliError::input(path, e))
}

/// Write an intent document back, pretty-printed
pub fn write_intent(path: &Path, intent: &Intent) -> Result<()> {
    let mut content = serde_json::to_string_pretty(intent)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

/// Read pre-rendered site objects
pub fn read_objects(path: &Path) -> Result<StaticRenderer> {
    let content = fs::read_to_string(path).map_err(|e| CliError::input(path, e))?;
    StaticRenderer::from_json(&content).map_err(|e| CliError::input(path, e))
}
