//! Load-or-create lifecycle for configuration documents.
//!
//! A document moves through `Absent → Created` or `→ Loaded`, then
//! `→ Declassified`: the file is read (or a default is built and
//! persisted), each secret store is configured against the current
//! document tree, and every store that accepts runs an overlay pass.
//! Only then is the tree handed back as the caller's typed document.
//!
//! Load and parse failures abort the whole sequence — no partial
//! document is ever returned. Store failures do not: a store whose
//! `configure` errors is skipped with a warning and only its overrides
//! are forfeited.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::declass;
use crate::error::BootconfError;
use crate::store::SecretStore;

/// Read the configuration document at `path`, creating and persisting
/// one from `new_default` when none exists, then overlay secrets from
/// each store in order.
///
/// Each store's `configure` runs against the current state of the
/// document tree, so a store can read values an earlier store has
/// already overridden (load the vault address from disk, then use it to
/// resolve everything else). Later stores win when two provide a value
/// for the same path.
pub fn read_or_create<T, F>(
    prefix: &str,
    path: &Path,
    new_default: F,
    stores: &mut [Box<dyn SecretStore>],
) -> Result<T, BootconfError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let mut tree: Value = match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "loaded configuration document");
            serde_json::from_str(&content).map_err(|err| BootconfError::Parse {
                path: path.to_path_buf(),
                source: err,
            })?
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let document = new_default();
            persist(&document, path)?;
            tracing::debug!(path = %path.display(), "created default configuration document");
            serde_json::to_value(&document).map_err(|err| BootconfError::Parse {
                path: path.to_path_buf(),
                source: err,
            })?
        }
        Err(err) => {
            return Err(BootconfError::Read {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    for store in stores {
        match store.configure(&tree) {
            Ok(()) => {
                declass::overlay(&mut tree, prefix, &**store);
            }
            Err(err) => {
                tracing::warn!(error = %err, "secret store failed to configure; skipping its overlay pass");
            }
        }
    }

    serde_json::from_value(tree).map_err(|err| BootconfError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Persist a document as tab-indented JSON, creating parent directories
/// as needed.
pub fn persist<T: Serialize>(document: &T, path: &Path) -> Result<(), BootconfError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|err| BootconfError::Persist {
            path: path.to_path_buf(),
            source: std::io::Error::other(err),
        })?;
    out.push(b'\n');

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| BootconfError::Persist {
            path: parent.to_path_buf(),
            source: err,
        })?;
    }
    std::fs::write(path, &out).map_err(|err| BootconfError::Persist {
        path: path.to_path_buf(),
        source: err,
    })
}
