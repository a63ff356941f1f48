//! The secret-store boundary. Stores are consumed by this crate, never
//! implemented here: any backend that can answer "is there a value for
//! this path" can drive a declassification pass.

use serde_json::Value;

use crate::error::BootconfError;

/// A store capable of resolving secrets by qualified field path.
///
/// A store is configured exactly once against the just-loaded
/// configuration document — which lets it read its own settings out of
/// the document (a vault address, an environment prefix) before any
/// lookup happens — and is then queried once per scalar leaf during the
/// overlay pass. Queries are independent and idempotent; no ordering is
/// guaranteed between queries for different leaves.
pub trait SecretStore {
    /// Prepare the store using the loaded configuration document.
    ///
    /// Returning an error skips this store's overlay pass entirely. The
    /// load itself still succeeds; only this store's overrides are
    /// forfeited.
    fn configure(&mut self, document: &Value) -> Result<(), BootconfError>;

    /// Look up the secret stored under a fully qualified path such as
    /// `svc/vault/address`. `None` means "no override for this field".
    fn get_secret(&self, path: &str) -> Option<String>;
}

impl<T> SecretStore for Box<T>
where
    T: SecretStore + ?Sized,
{
    fn configure(&mut self, document: &Value) -> Result<(), BootconfError> {
        (**self).configure(document)
    }

    fn get_secret(&self, path: &str) -> Option<String> {
        (**self).get_secret(path)
    }
}
