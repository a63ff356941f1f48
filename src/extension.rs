//! Extension modules: externally supplied WebAssembly units exposing
//! named provider symbols.
//!
//! A module location names a `.wasm` binary (or `.wat` text) file on
//! disk. The capability contract an exported provider must satisfy:
//!
//! - the module exports a linear memory named `memory`;
//! - the module exports, under the provider's name, a function of
//!   signature `(ptr: i32, len: i32) -> i32` that reads a JSON-encoded
//!   parameter map of `len` bytes at `ptr` and returns 0 on success.
//!
//! Modules are instantiated without imports and never unloaded; every
//! `open` re-reads and re-instantiates the file. The sandbox boundary
//! means a misbehaving extension can fail its own configuration but
//! cannot touch the host beyond the memory it exports.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use wasmtime::{Engine, Instance, Memory, Module, Store, TypedFunc};

use crate::error::BootconfError;
use crate::provider::Provider;

/// Guest memory offset where configure parameters are written.
const INPUT_OFFSET: usize = 4096;

/// A provider backed by an exported function of a loaded extension
/// module. `configure` marshals the parameter map into guest memory and
/// invokes the export; a trap or nonzero status is a configuration
/// failure.
pub(crate) struct WasmProvider {
    symbol: String,
    store: Store<()>,
    memory: Memory,
    configure: TypedFunc<(i32, i32), i32>,
}

impl Provider for WasmProvider {
    fn name(&self) -> &str {
        &self.symbol
    }

    fn configure(&mut self, parameters: &Map<String, Value>) -> Result<(), BootconfError> {
        let payload =
            serde_json::to_vec(parameters).map_err(|err| BootconfError::ProviderConfiguration {
                name: self.symbol.clone(),
                reason: format!("parameters not encodable: {err}"),
            })?;

        if INPUT_OFFSET + payload.len() > self.memory.data_size(&self.store) {
            return Err(BootconfError::ProviderConfiguration {
                name: self.symbol.clone(),
                reason: "parameters exceed module memory".into(),
            });
        }
        self.memory
            .write(&mut self.store, INPUT_OFFSET, &payload)
            .map_err(|err| BootconfError::ProviderConfiguration {
                name: self.symbol.clone(),
                reason: format!("memory write failed: {err}"),
            })?;

        let status = self
            .configure
            .call(&mut self.store, (INPUT_OFFSET as i32, payload.len() as i32))
            .map_err(|err| BootconfError::ProviderConfiguration {
                name: self.symbol.clone(),
                reason: format!("trapped: {err}"),
            })?;
        if status != 0 {
            return Err(BootconfError::ProviderConfiguration {
                name: self.symbol.clone(),
                reason: format!("rejected parameters (status {status})"),
            });
        }
        Ok(())
    }
}

/// Open the module at `path` and resolve the export named `symbol` into
/// an unconfigured provider instance.
pub(crate) fn open(path: &Path, symbol: &str) -> Result<WasmProvider, BootconfError> {
    let bytes = load_module_bytes(path)?;

    let engine = Engine::default();
    let module = Module::new(&engine, &bytes).map_err(|err| BootconfError::ModuleOpen {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut store = Store::new(&engine, ());
    let instance =
        Instance::new(&mut store, &module, &[]).map_err(|err| BootconfError::ModuleOpen {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    let export =
        instance
            .get_export(&mut store, symbol)
            .ok_or_else(|| BootconfError::SymbolNotFound {
                symbol: symbol.to_string(),
                path: path.to_path_buf(),
            })?;
    let func = export
        .into_func()
        .ok_or_else(|| BootconfError::ContractViolation {
            symbol: symbol.to_string(),
            reason: "export is not a function".into(),
        })?;
    let configure =
        func.typed::<(i32, i32), i32>(&store)
            .map_err(|_| BootconfError::ContractViolation {
                symbol: symbol.to_string(),
                reason: "expected signature (i32, i32) -> i32".into(),
            })?;
    let memory =
        instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| BootconfError::ContractViolation {
                symbol: symbol.to_string(),
                reason: "module does not export a memory".into(),
            })?;

    tracing::debug!(module = %path.display(), symbol, "opened extension module");
    Ok(WasmProvider {
        symbol: symbol.to_string(),
        store,
        memory,
        configure,
    })
}

/// Read module bytes, accepting text-format (`.wat`) modules as well.
fn load_module_bytes(path: &Path) -> Result<Vec<u8>, BootconfError> {
    let bytes = fs::read(path).map_err(|err| BootconfError::ModuleOpen {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if path.extension().and_then(|ext| ext.to_str()) == Some("wat") {
        let wasm = wat::parse_bytes(&bytes).map_err(|err| BootconfError::ModuleOpen {
            path: path.to_path_buf(),
            reason: format!("invalid text module: {err}"),
        })?;
        return Ok(wasm.into_owned());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderConfig;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A module exporting a provider `blob` that accepts any parameters.
    const ACCEPTING: &str = r#"
        (module
          (memory (export "memory") 1)
          (func (export "blob") (param i32 i32) (result i32)
            i32.const 0))
    "#;

    /// A provider that rejects every configure call with status 7.
    const REJECTING: &str = r#"
        (module
          (memory (export "memory") 1)
          (func (export "blob") (param i32 i32) (result i32)
            i32.const 7))
    "#;

    /// A provider that checks the parameter bytes were actually written:
    /// succeeds only when the first byte at `ptr` is `{` (0x7b).
    const PICKY: &str = r#"
        (module
          (memory (export "memory") 1)
          (func (export "picky") (param $ptr i32) (param $len i32) (result i32)
            (i32.ne (i32.load8_u (local.get $ptr)) (i32.const 123))))
    "#;

    fn write_module(dir: &TempDir, name: &str, wat_text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, wat_text).unwrap();
        path
    }

    fn load_from(path: PathBuf, symbol: &str) -> Result<Box<dyn Provider>, BootconfError> {
        ProviderConfig {
            provider: symbol.into(),
            module: Some(path),
            ..ProviderConfig::default()
        }
        .load(Vec::new())
    }

    #[test]
    fn loads_and_configures_exported_provider() {
        let dir = TempDir::new().unwrap();
        let provider = load_from(write_module(&dir, "ext.wat", ACCEPTING), "blob").unwrap();
        assert_eq!(provider.name(), "blob");
    }

    #[test]
    fn parameters_reach_guest_memory() {
        let dir = TempDir::new().unwrap();
        assert!(load_from(write_module(&dir, "ext.wat", PICKY), "picky").is_ok());
    }

    #[test]
    fn nonexistent_location_is_module_open_error() {
        let err = load_from(PathBuf::from("/nonexistent/ext.wasm"), "blob").unwrap_err();
        assert!(matches!(err, BootconfError::ModuleOpen { path, .. } if path.ends_with("ext.wasm")));
    }

    #[test]
    fn malformed_module_is_module_open_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.wasm");
        std::fs::write(&path, b"not a wasm module").unwrap();
        assert!(matches!(
            load_from(path, "blob").unwrap_err(),
            BootconfError::ModuleOpen { .. }
        ));
    }

    #[test]
    fn missing_export_is_symbol_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_from(write_module(&dir, "ext.wat", ACCEPTING), "missing").unwrap_err();
        assert!(
            matches!(err, BootconfError::SymbolNotFound { symbol, .. } if symbol == "missing")
        );
    }

    #[test]
    fn non_function_export_is_contract_violation() {
        let dir = TempDir::new().unwrap();
        let module = r#"
            (module
              (memory (export "memory") 1)
              (global (export "blob") i32 (i32.const 1)))
        "#;
        let err = load_from(write_module(&dir, "ext.wat", module), "blob").unwrap_err();
        assert!(
            matches!(err, BootconfError::ContractViolation { reason, .. } if reason.contains("not a function"))
        );
    }

    #[test]
    fn wrong_signature_is_contract_violation() {
        let dir = TempDir::new().unwrap();
        let module = r#"
            (module
              (memory (export "memory") 1)
              (func (export "blob") (param i32) (result i32)
                local.get 0))
        "#;
        let err = load_from(write_module(&dir, "ext.wat", module), "blob").unwrap_err();
        assert!(
            matches!(err, BootconfError::ContractViolation { reason, .. } if reason.contains("signature"))
        );
    }

    #[test]
    fn missing_memory_export_is_contract_violation() {
        let dir = TempDir::new().unwrap();
        let module = r#"
            (module
              (func (export "blob") (param i32 i32) (result i32)
                i32.const 0))
        "#;
        let err = load_from(write_module(&dir, "ext.wat", module), "blob").unwrap_err();
        assert!(
            matches!(err, BootconfError::ContractViolation { reason, .. } if reason.contains("memory"))
        );
    }

    #[test]
    fn nonzero_status_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let err = load_from(write_module(&dir, "ext.wat", REJECTING), "blob").unwrap_err();
        assert!(
            matches!(err, BootconfError::ProviderConfiguration { reason, .. } if reason.contains("status 7"))
        );
    }
}
