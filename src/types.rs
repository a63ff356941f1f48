//! Ready-made configuration vocabulary for networked services: TLS
//! listener, vault, and cluster blocks, and a [`ServiceConfig`] document
//! that composes them. Field tags match the persisted JSON format, so
//! every string and integer here is addressable by the declassification
//! pass (`svc/listen`, `svc/vault/address`, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BootconfError;
use crate::provider::ProviderConfig;

/// TLS listener settings.
///
/// `certificate` and `private` hold either a filesystem path or inline
/// PEM text; [`materialize`](Self::materialize) normalizes both to
/// absolute file paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// The address to listen on.
    #[serde(rename = "listen")]
    pub listen_addr: String,

    /// The certificate, as a file path or inline PEM text.
    pub certificate: String,

    /// The private key for the certificate, as a file path or inline PEM text.
    #[serde(rename = "private")]
    pub private_key: String,
}

impl TlsConfig {
    /// Resolve the certificate and private key to absolute file paths.
    ///
    /// Inline PEM text (a value starting with `---`) is written to a
    /// file under `dir`; nothing is ever written outside it. A value
    /// that is already a path is left on disk untouched and only made
    /// absolute, so the caller can hand both paths to a file-based TLS
    /// loader directly.
    pub fn materialize(&self, dir: &Path) -> Result<(PathBuf, PathBuf), BootconfError> {
        let certificate = materialize_pem(&self.certificate, dir, "certificate.pem")?;
        let private_key = materialize_pem(&self.private_key, dir, "private.pem")?;
        Ok((certificate, private_key))
    }
}

fn materialize_pem(value: &str, dir: &Path, file_name: &str) -> Result<PathBuf, BootconfError> {
    let path = if value.starts_with("---") {
        let target = dir.join(file_name);
        std::fs::write(&target, value).map_err(|err| BootconfError::Persist {
            path: target.clone(),
            source: err,
        })?;
        target
    } else {
        PathBuf::from(value)
    };
    std::path::absolute(&path).map_err(|err| BootconfError::Read { path, source: err })
}

/// Vault-style secret store settings, read by the store itself during
/// its configure phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// The vault address to use.
    pub address: String,

    /// The vault application id to use.
    #[serde(rename = "app")]
    pub application: String,
}

/// Inter-node networking settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// This node's name, unique within the cluster. Left unset, the
    /// service derives one at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The address and port to bind the inter-node network on.
    #[serde(rename = "listen")]
    pub listen_addr: String,

    /// The address and port advertised to other nodes, for NAT traversal.
    #[serde(rename = "advertise")]
    pub advertise_addr: String,

    /// The seed address (or a domain name) used to join the cluster.
    pub seed: String,

    /// Passphrase for the primary gossip encryption key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

/// A ready-made top-level document for a networked service.
///
/// Usable directly as the `read_or_create` factory output, or as a
/// starting point for an application-specific document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// The service name.
    pub name: String,

    /// The address and port to listen on.
    pub listen: String,

    /// TLS listener settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,

    /// Vault secret store settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultConfig>,

    /// Cluster membership settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterConfig>,

    /// The storage provider to wire at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<ProviderConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            listen: ":4000".into(),
            tls: None,
            vault: None,
            cluster: None,
            storage: None,
        }
    }
}
