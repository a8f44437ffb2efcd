use std::path::PathBuf;
use std::sync::Arc;

use pora_volume::MountResolver;

use crate::config::Config;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    resolver: Arc<dyn MountResolver>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let resolver = config.mount_resolver.build();
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Suffix appended to read and chmod responses.
    pub fn identity(&self) -> String {
        format!("instance index: {}", self.config.instance_index)
    }

    /// Resolve the mount directory for the current request.
    pub fn mount(&self) -> pora_volume::Result<PathBuf> {
        self.resolver.resolve(&self.config.service_binding)
    }
}
