//! Configuration bootstrapping for networked services. Load a document,
//! overlay secrets, wire providers, and go.
//!
//! Bootconf covers the first minute of a service's life: it materializes
//! a JSON configuration document from disk (or creates a default one),
//! injects secrets from external stores onto the loaded document's
//! fields, and resolves declarative provider references — storage or
//! identity backends named in the document — into live, configured
//! components.
//!
//! ```ignore
//! let config: ServiceConfig = bootconf::read_or_create(
//!     "svc",
//!     Path::new("service.json"),
//!     ServiceConfig::default,
//!     &mut stores,
//! )?;
//! ```
//!
//! That single call reads `service.json` (writing a default one first if
//! none exists), lets each secret store configure itself against the
//! loaded document, and overlays every secret the stores can resolve
//! before handing back the typed config.
//!
//! # Design: the document is the schema
//!
//! There is no separate key registry. Any `Serialize + DeserializeOwned`
//! type is a valid document, and the serde-declared field names do
//! double duty: they are the tags of the persisted JSON *and* the
//! segments of the secret paths used for declassification. A field
//! `address` inside a `vault` block is persisted as `vault.address` and
//! queried as `{prefix}/vault/address` — rename the field and both move
//! together, so secret paths can never drift from the file format.
//!
//! # Declassification
//!
//! [`declassify`] walks the document depth-first, building `/`-joined
//! paths from the field names, and asks the [`SecretStore`] for an
//! override at every scalar leaf:
//!
//! - **string** fields take the store's value verbatim;
//! - **integer** fields take it only if it parses as base-10 `i64`;
//! - booleans, floats, and collections are never touched;
//! - an absent `Option` branch ends the walk down that path.
//!
//! The pass is deliberately best-effort and additive: it can never abort
//! startup, and a store with nothing to say leaves the document exactly
//! as loaded. Run it with several stores in sequence and the last store
//! to claim a path wins.
//!
//! # Providers
//!
//! A [`ProviderConfig`] in the document declares which provider to wire
//! and how:
//!
//! ```json
//! {"provider": "s3", "config": {"bucket": "backups"}}
//! ```
//!
//! Resolution tries the caller-supplied built-ins first, by name,
//! case-insensitively, in the order given — a matching built-in whose
//! `configure` call fails is passed over, not fatal. When the reference
//! carries a `module` location, the built-ins are bypassed and the
//! provider is looked up as a named export of a WebAssembly extension
//! module instead; each failure stage (open, symbol lookup, contract
//! check, configure) reports its own error. [`load_provider`] wraps the
//! common startup pattern: no reference configured means "use the first
//! built-in as-is".
//!
//! # Lifecycle and errors
//!
//! [`read_or_create`] is all-or-nothing about the document itself —
//! unreadable or malformed files abort the load with [`BootconfError`]
//! carrying the path — and lenient about everything layered on top: a
//! secret store that fails to configure is skipped with a warning and
//! forfeits only its own overrides. Resolution errors are returned to
//! the caller, who decides whether to handle or escalate
//! ([`ProviderConfig::load_or_panic`] for configuration the process
//! cannot run without).
//!
//! Events are emitted through [`tracing`]; the crate never installs a
//! subscriber.

pub mod error;
pub mod types;

mod declass;
mod extension;
mod lifecycle;
mod provider;
mod store;

#[cfg(test)]
mod fixtures;

pub use declass::declassify;
pub use error::BootconfError;
pub use lifecycle::{persist, read_or_create};
pub use provider::{Provider, ProviderConfig, load_provider};
pub use store::SecretStore;
pub use types::{ClusterConfig, ServiceConfig, TlsConfig, VaultConfig};
