#[cfg(test)]
pub mod test {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use serde_json::{Map, Value};

    use crate::error::BootconfError;
    use crate::provider::Provider;
    use crate::store::SecretStore;

    /// In-memory secret store that records every query it receives.
    pub struct MapStore {
        values: HashMap<String, String>,
        fail_configure: bool,
        pub queries: RefCell<Vec<String>>,
    }

    impl MapStore {
        pub fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                values: pairs
                    .iter()
                    .map(|&(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                fail_configure: false,
                queries: RefCell::new(Vec::new()),
            }
        }

        pub fn empty() -> Self {
            Self::new(&[])
        }

        /// A store whose `configure` always fails, so its overlay pass
        /// must be skipped.
        pub fn failing(pairs: &[(&str, &str)]) -> Self {
            Self {
                fail_configure: true,
                ..Self::new(pairs)
            }
        }
    }

    impl SecretStore for MapStore {
        fn configure(&mut self, _document: &Value) -> Result<(), BootconfError> {
            if self.fail_configure {
                return Err(BootconfError::StoreConfiguration {
                    name: "map".into(),
                    reason: "forced failure".into(),
                });
            }
            Ok(())
        }

        fn get_secret(&self, path: &str) -> Option<String> {
            self.queries.borrow_mut().push(path.to_string());
            self.values.get(path).cloned()
        }
    }

    /// Store that records the document it was configured against and
    /// resolves nothing.
    pub struct PeekStore {
        pub seen: Rc<RefCell<Option<Value>>>,
    }

    impl SecretStore for PeekStore {
        fn configure(&mut self, document: &Value) -> Result<(), BootconfError> {
            *self.seen.borrow_mut() = Some(document.clone());
            Ok(())
        }

        fn get_secret(&self, _path: &str) -> Option<String> {
            None
        }
    }

    /// Shared call log for [`StubProvider`] instances: `(marker,
    /// parameters)` per configure call.
    pub type CallLog = Rc<RefCell<Vec<(&'static str, Map<String, Value>)>>>;

    pub fn new_log() -> CallLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// Provider that records its configure calls into a shared log.
    /// `marker` distinguishes instances that share a name.
    pub struct StubProvider {
        pub name: &'static str,
        pub marker: &'static str,
        pub fail_configure: bool,
        pub log: CallLog,
    }

    impl Provider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn configure(&mut self, parameters: &Map<String, Value>) -> Result<(), BootconfError> {
            self.log.borrow_mut().push((self.marker, parameters.clone()));
            if self.fail_configure {
                return Err(BootconfError::ProviderConfiguration {
                    name: self.name.into(),
                    reason: "forced failure".into(),
                });
            }
            Ok(())
        }
    }
}
