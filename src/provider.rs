//! Declarative provider references and the resolution protocol that
//! turns them into live, configured providers.
//!
//! A [`ProviderConfig`] names the provider to wire, optionally the
//! extension module containing it, and the free-form parameters handed
//! to its `configure` call. Resolution is two-tier: built-ins supplied
//! by the caller are tried first (by name, case-insensitively), and an
//! extension module is consulted only when the reference carries a
//! module location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BootconfError;
use crate::extension;

/// A named, configurable capability — a storage backend, an identity
/// backend — selected and wired at startup.
pub trait Provider {
    /// The provider's declared name. References match against it
    /// case-insensitively.
    fn name(&self) -> &str;

    /// Configure the provider from a reference's free-form parameters.
    fn configure(&mut self, parameters: &Map<String, Value>) -> Result<(), BootconfError>;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("name", &self.name()).finish()
    }
}

/// An unresolved intent to obtain a configured provider, as it appears
/// inside a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// A built-in provider name, or the symbol to look up in the
    /// extension module.
    pub provider: String,

    /// Location of the extension module containing the provider. When
    /// absent, only built-ins are considered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<PathBuf>,

    /// Parameters handed to the provider's `configure` call.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

impl ProviderConfig {
    /// Resolve this reference against the supplied built-ins.
    ///
    /// With no module location, built-ins are scanned in order and the
    /// first one that both matches the name and configures without
    /// error is returned; a matching built-in whose configuration fails
    /// is passed over and the scan continues. With a module location,
    /// the extension path is taken instead, and each stage — opening
    /// the module, finding the symbol, checking the contract,
    /// configuring — reports its own error.
    pub fn load(
        &self,
        builtins: Vec<Box<dyn Provider>>,
    ) -> Result<Box<dyn Provider>, BootconfError> {
        let Some(module) = &self.module else {
            for mut builtin in builtins {
                if builtin.name().eq_ignore_ascii_case(&self.provider)
                    && builtin.configure(&self.config).is_ok()
                {
                    return Ok(builtin);
                }
            }
            return Err(BootconfError::ProviderNotFound {
                name: self.provider.clone(),
            });
        };

        let mut provider = extension::open(module, &self.provider)?;
        provider.configure(&self.config)?;
        tracing::debug!(
            provider = %self.provider,
            module = %module.display(),
            "configured extension provider"
        );
        Ok(Box::new(provider))
    }

    /// Like [`load`](Self::load), but escalates any resolution error to
    /// a panic. Reserved for startup-time configuration the process
    /// cannot run without.
    pub fn load_or_panic(&self, builtins: Vec<Box<dyn Provider>>) -> Box<dyn Provider> {
        match self.load(builtins) {
            Ok(provider) => provider,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Load a provider from an optional reference, defaulting to the first
/// built-in when the configuration omits the reference entirely — in
/// that case no lookup and no `configure` call happens.
///
/// # Panics
///
/// Panics when `config` is `None` and `builtins` is empty, and on any
/// resolution failure when `config` is present.
pub fn load_provider(
    config: Option<&ProviderConfig>,
    builtins: Vec<Box<dyn Provider>>,
) -> Box<dyn Provider> {
    match config {
        None => builtins
            .into_iter()
            .next()
            .expect("load_provider requires at least one built-in provider"),
        Some(reference) => reference.load_or_panic(builtins),
    }
}
