//! Proxy factory
//!
//! Assembles observers, collaborator stores, the capability registry and the
//! dispatch table once, then wraps providers into [`Proxy`] instances.
//!
//! ```rust,ignore
//! let factory = ProxyFactory::builder()
//!     .with_observer(Arc::new(TracingObserver::new()))
//!     .override_store(Arc::new(MemoryOverrideStore::new()))
//!     .build();
//! let proxy = factory.create(Arc::new(MyProvider::new()));
//! ```

use std::sync::Arc;

use super::Proxy;
use super::config::ProxyConfig;
use crate::cache::{MemoryCacheStore, MetadataCache};
use crate::capability::{CapabilityRegistry, CapabilityTable, global_registry};
use crate::execution::{DispatchTable, LifecycleDispatcher};
use crate::observers::{PostCallObserver, PreCallObserver};
use crate::traits::{CacheStore, ModelOverrideStore, ProviderClient};

/// Creates proxies sharing one observer pipeline and metadata cache.
#[derive(Clone, Debug)]
pub struct ProxyFactory {
    config: ProxyConfig,
    dispatcher: LifecycleDispatcher,
    metadata: MetadataCache,
    registry: Option<Arc<CapabilityRegistry>>,
}

impl Default for ProxyFactory {
    fn default() -> Self {
        ProxyFactoryBuilder::default().build()
    }
}

impl ProxyFactory {
    pub fn builder() -> ProxyFactoryBuilder {
        ProxyFactoryBuilder::default()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    /// Capability table for `provider`: the registry's entry for its type, or a
    /// freshly computed one for unregistered types.
    pub fn capability_table(&self, provider: &dyn ProviderClient) -> Arc<CapabilityTable> {
        self.registry
            .as_ref()
            .and_then(|registry| registry.table_for(provider))
            .unwrap_or_else(|| {
                tracing::debug!(
                    target: "siumai_proxy::capability",
                    type_name = provider.type_name(),
                    "provider type not registered, computing capability table"
                );
                Arc::new(CapabilityTable::for_provider(provider))
            })
    }

    /// Wrap `provider` in a new proxy.
    pub fn create(&self, provider: Arc<dyn ProviderClient>) -> Proxy {
        let capabilities = self.capability_table(provider.as_ref());
        Proxy::new(
            provider,
            capabilities,
            self.dispatcher.clone(),
            self.metadata.clone(),
            self.config.base_configuration.clone(),
        )
    }
}

#[derive(Default)]
pub struct ProxyFactoryBuilder {
    config: ProxyConfig,
    pre_observers: Vec<Arc<dyn PreCallObserver>>,
    post_observers: Vec<Arc<dyn PostCallObserver>>,
    cache_store: Option<Arc<dyn CacheStore>>,
    override_store: Option<Arc<dyn ModelOverrideStore>>,
    registry: Option<Arc<CapabilityRegistry>>,
    dispatch_table: Option<DispatchTable>,
}

impl ProxyFactoryBuilder {
    pub fn config(mut self, config: ProxyConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a pre-call observer; observers run in the order added.
    pub fn with_pre_call_observer(mut self, observer: Arc<dyn PreCallObserver>) -> Self {
        self.pre_observers.push(observer);
        self
    }

    /// Append a post-call observer; observers run in the order added.
    pub fn with_post_call_observer(mut self, observer: Arc<dyn PostCallObserver>) -> Self {
        self.post_observers.push(observer);
        self
    }

    /// Register an observer implementing both hooks.
    pub fn with_observer<T>(self, observer: Arc<T>) -> Self
    where
        T: PreCallObserver + PostCallObserver + 'static,
    {
        let pre: Arc<dyn PreCallObserver> = observer.clone();
        let post: Arc<dyn PostCallObserver> = observer;
        self.with_pre_call_observer(pre).with_post_call_observer(post)
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    pub fn override_store(mut self, store: Arc<dyn ModelOverrideStore>) -> Self {
        self.override_store = Some(store);
        self
    }

    /// Use `registry` instead of the process-wide one.
    pub fn capability_registry(mut self, registry: Arc<CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn dispatch_table(mut self, table: DispatchTable) -> Self {
        self.dispatch_table = Some(table);
        self
    }

    pub fn build(self) -> ProxyFactory {
        let store = self
            .cache_store
            .unwrap_or_else(|| Arc::new(MemoryCacheStore::default()) as Arc<dyn CacheStore>);
        let mut metadata = self.config.apply_to(MetadataCache::new(store));
        if let Some(overrides) = self.override_store {
            metadata = metadata.with_override_store(overrides);
        }

        let dispatcher = LifecycleDispatcher::new(
            self.pre_observers,
            self.post_observers,
            Arc::new(self.dispatch_table.unwrap_or_default()),
        );

        ProxyFactory {
            config: self.config,
            dispatcher,
            metadata,
            registry: self.registry.or_else(global_registry),
        }
    }
}
