//! Per-run context.
//!
//! A [`RunContext`] bundles the variable store with the static configuration
//! and properties of one run. It is passed explicitly to the resolver,
//! credential manager, executor and accessor; separate contexts never share
//! state.

use crate::config::RunnerConfig;
use crate::environment::StaticProperties;
use crate::validator::ResponseFieldAccessor;
use crate::variables::{ParameterResolver, VariableStore};
use std::sync::Arc;

/// Shared state of one test run. Clones are cheap and see the same store.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub store: VariableStore,
    pub config: Arc<RunnerConfig>,
    pub properties: Arc<StaticProperties>,
}

impl RunContext {
    /// Creates a context with a fresh, empty variable store.
    pub fn new(config: RunnerConfig, properties: StaticProperties) -> Self {
        Self {
            store: VariableStore::new(),
            config: Arc::new(config),
            properties: Arc::new(properties),
        }
    }

    /// Creates a context with default properties and the given configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self::new(config, StaticProperties::new())
    }

    /// Placeholder resolver over this context's store and properties.
    pub fn resolver(&self) -> ParameterResolver {
        ParameterResolver::new(self.store.clone(), Arc::clone(&self.properties))
    }

    /// Field accessor that extracts into this context's store.
    pub fn accessor(&self) -> ResponseFieldAccessor {
        ResponseFieldAccessor::new(self.store.clone())
    }
}
