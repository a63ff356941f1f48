use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootconfError {
    #[error("Provider '{name}' could not be found or configured from the built-ins")]
    ProviderNotFound { name: String },

    #[error("Extension module {path} could not be opened: {reason}")]
    ModuleOpen { path: PathBuf, reason: String },

    #[error("Symbol '{symbol}' not found in extension module {path}")]
    SymbolNotFound { symbol: String, path: PathBuf },

    #[error("Export '{symbol}' does not satisfy the provider contract: {reason}")]
    ContractViolation { symbol: String, reason: String },

    #[error("Provider '{name}' could not be configured: {reason}")]
    ProviderConfiguration { name: String, reason: String },

    #[error("Secret store '{name}' could not be configured: {reason}")]
    StoreConfiguration { name: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}
