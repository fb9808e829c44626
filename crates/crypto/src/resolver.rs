//! Provider selection.
//!
//! A [`CryptoResolver`] holds an ordered list of probes and a memoized slot.
//! The first probe that yields a provider wins and is cached until
//! [`CryptoResolver::set`] replaces it. Resolvers are ordinary values: pass
//! one into the signer and verifiers, or use [`default_resolver`] for the
//! process-wide instance behind the convenience functions.
//!
//! Default probe order:
//!
//! 1. `custom` - provider injected with [`CryptoResolverBuilder::custom`]
//! 2. `platform-subtle` - a host subtle-crypto engine, when one was registered
//! 3. `native` - the in-process RustCrypto backend (`native` feature)

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use tracing::{debug, trace, warn};

use crate::backends::{NativeCryptoProvider, SubtleCrypto, WebCryptoProvider};
use crate::provider::SharedProvider;
use crate::{CryptoError, Result};

type ProbeFn = dyn Fn() -> Option<SharedProvider> + Send + Sync;

static DEFAULT_RESOLVER: Lazy<Arc<CryptoResolver>> = Lazy::new(|| Arc::new(CryptoResolver::new()));

/// The process-wide resolver used by the convenience functions.
#[must_use]
pub fn default_resolver() -> Arc<CryptoResolver> {
    Arc::clone(&DEFAULT_RESOLVER)
}

/// A named factory evaluated on a cold [`CryptoResolver::get`].
pub struct Probe {
    name: &'static str,
    factory: Box<ProbeFn>,
}

impl Probe {
    /// Create a probe.
    pub fn new(
        name: &'static str,
        factory: impl Fn() -> Option<SharedProvider> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            factory: Box::new(factory),
        }
    }

    /// Probe name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe").field("name", &self.name).finish()
    }
}

/// Lazily resolves and memoizes the active crypto provider.
pub struct CryptoResolver {
    probes: Vec<Probe>,
    active: RwLock<Option<SharedProvider>>,
}

impl Default for CryptoResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoResolver {
    /// Resolver with the default probe list and no custom provider.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a resolver.
    #[must_use]
    pub fn builder() -> CryptoResolverBuilder {
        CryptoResolverBuilder::default()
    }

    /// Resolver that always hands out `provider`.
    #[must_use]
    pub fn with_provider(provider: SharedProvider) -> Self {
        Self::builder().custom(provider).build()
    }

    /// Return the active provider, probing on the first call.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Unavailable`] when no probe yields a provider.
    pub fn get(&self) -> Result<SharedProvider> {
        if let Some(provider) = self.read_slot().as_ref() {
            return Ok(Arc::clone(provider));
        }

        for probe in &self.probes {
            match (probe.factory)() {
                Some(provider) => {
                    let mut slot = self.write_slot();
                    // A `set` or a concurrent probe may have filled the slot meanwhile.
                    if let Some(existing) = slot.as_ref() {
                        return Ok(Arc::clone(existing));
                    }
                    debug!(
                        probe = probe.name,
                        provider = provider.name(),
                        "Crypto provider resolved"
                    );
                    *slot = Some(Arc::clone(&provider));
                    return Ok(provider);
                }
                None => trace!(probe = probe.name, "Crypto probe found nothing"),
            }
        }

        warn!(probes = ?self.probe_names(), "No crypto provider available");
        Err(CryptoError::Unavailable)
    }

    /// Override the active provider until the next reset.
    pub fn set(&self, provider: SharedProvider) {
        debug!(provider = provider.name(), "Crypto provider overridden");
        *self.write_slot() = Some(provider);
    }

    /// The memoized provider, without probing.
    #[must_use]
    pub fn active(&self) -> Option<SharedProvider> {
        self.read_slot().clone()
    }

    /// Probe names in evaluation order.
    #[must_use]
    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(Probe::name).collect()
    }

    /// Forget the memoized provider so the next `get` probes again.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset(&self) {
        *self.write_slot() = None;
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Option<SharedProvider>> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<SharedProvider>> {
        self.active.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CryptoResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.active().map(|p| p.name().to_string());
        f.debug_struct("CryptoResolver")
            .field("probes", &self.probe_names())
            .field("active", &active)
            .finish()
    }
}

/// Builder for [`CryptoResolver`].
#[derive(Default)]
pub struct CryptoResolverBuilder {
    custom: Option<SharedProvider>,
    platform_subtle: Option<Arc<dyn SubtleCrypto>>,
    extra: Vec<Probe>,
    skip_native: bool,
}

impl CryptoResolverBuilder {
    /// Inject a provider that takes priority over every probe.
    #[must_use]
    pub fn custom(mut self, provider: SharedProvider) -> Self {
        self.custom = Some(provider);
        self
    }

    /// Register the host's subtle-crypto engine.
    #[must_use]
    pub fn platform_subtle(mut self, subtle: Arc<dyn SubtleCrypto>) -> Self {
        self.platform_subtle = Some(subtle);
        self
    }

    /// Add a probe, evaluated after the platform probe and before `native`.
    #[must_use]
    pub fn probe(mut self, probe: Probe) -> Self {
        self.extra.push(probe);
        self
    }

    /// Leave the in-process backend out of the probe list.
    #[must_use]
    pub fn without_native(mut self) -> Self {
        self.skip_native = true;
        self
    }

    /// Build the resolver.
    #[must_use]
    pub fn build(self) -> CryptoResolver {
        let mut probes = Vec::with_capacity(self.extra.len() + 3);

        let custom = self.custom;
        probes.push(Probe::new("custom", move || custom.clone()));

        let subtle = self.platform_subtle;
        probes.push(Probe::new("platform-subtle", move || {
            subtle
                .clone()
                .map(|s| Arc::new(WebCryptoProvider::new(s)) as SharedProvider)
        }));

        probes.extend(self.extra);

        if cfg!(feature = "native") && !self.skip_native {
            probes.push(Probe::new("native", || {
                Some(Arc::new(NativeCryptoProvider::new()) as SharedProvider)
            }));
        }

        CryptoResolver {
            probes,
            active: RwLock::new(None),
        }
    }
}
