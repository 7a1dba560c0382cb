//! The ordered, immutable registry of document sources.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{LocatorPolicy, SourceEntry};
use crate::error::LoadError;

/// Ordered collection of named document sources.
///
/// Insertion order is display order. A registry never changes after it is
/// built; reconfiguration builds a new one. Clones share storage, so a
/// registry can be handed to concurrent tasks freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    entries: Arc<[SourceEntry]>,
}

impl Registry {
    /// Build a registry, accepting shared locators.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::DuplicateName` if two entries share a name,
    /// `LoadError::EmptyLocator` if a locator is blank, and
    /// `LoadError::EmptyName` if a name is blank.
    pub fn load(sources: Vec<SourceEntry>) -> Result<Self, LoadError> {
        Self::load_with_policy(sources, LocatorPolicy::Allow)
    }

    /// Build a registry, handling shared locators according to `policy`.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::load`], plus `LoadError::DuplicateLocator` when
    /// `policy` is `Reject` and two entries share a locator.
    pub fn load_with_policy(
        sources: Vec<SourceEntry>,
        policy: LocatorPolicy,
    ) -> Result<Self, LoadError> {
        let mut names: HashMap<&str, usize> = HashMap::with_capacity(sources.len());
        let mut locators: HashMap<&str, &str> = HashMap::with_capacity(sources.len());

        for (position, entry) in sources.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(LoadError::EmptyName { position });
            }
            if entry.locator.trim().is_empty() {
                return Err(LoadError::EmptyLocator {
                    name: entry.name.clone(),
                    position,
                });
            }
            if let Some(&first) = names.get(entry.name.as_str()) {
                return Err(LoadError::DuplicateName {
                    name: entry.name.clone(),
                    first,
                    second: position,
                });
            }
            names.insert(&entry.name, position);

            let locator = entry.locator.trim();
            if let Some(&first) = locators.get(locator) {
                match policy {
                    LocatorPolicy::Allow => {}
                    LocatorPolicy::Warn => tracing::warn!(
                        locator,
                        first,
                        second = %entry.name,
                        "Locator is shared by more than one source"
                    ),
                    LocatorPolicy::Reject => {
                        return Err(LoadError::DuplicateLocator {
                            locator: locator.to_owned(),
                            first: first.to_owned(),
                            second: entry.name.clone(),
                        });
                    }
                }
            } else {
                locators.insert(locator, &entry.name);
            }
        }

        tracing::debug!(entries = sources.len(), "Registry loaded");
        Ok(Self {
            entries: sources.into(),
        })
    }

    /// Read-only snapshot of the entries in load order.
    #[must_use]
    pub fn list(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// Look up an entry by its exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a SourceEntry;
    type IntoIter = std::slice::Iter<'a, SourceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn load_capturing_logs(
        sources: Vec<SourceEntry>,
        policy: LocatorPolicy,
    ) -> (Result<Registry, LoadError>, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            Registry::load_with_policy(sources, policy)
        });
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (result, text)
    }

    fn names(registry: &Registry) -> Vec<&str> {
        registry.list().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_load_preserves_order() {
        let registry = Registry::load(vec![
            SourceEntry::new("Auth", "/specs/auth.yaml"),
            SourceEntry::new("RBAC", "/specs/rbac.yaml"),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(names(&registry), vec!["Auth", "RBAC"]);
    }

    #[test]
    fn test_load_does_not_sort() {
        let registry = Registry::load(vec![
            SourceEntry::new("COA Service", "/specs/coa-service.yaml"),
            SourceEntry::new("AP Service", "/specs/ap-service.yaml"),
            SourceEntry::new("GL Service", "/specs/gl-service.yaml"),
        ])
        .unwrap();
        assert_eq!(
            names(&registry),
            vec!["COA Service", "AP Service", "GL Service"]
        );
    }

    #[test]
    fn test_empty_source_list_is_valid() {
        let registry = Registry::load(vec![]).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_name_regardless_of_locator() {
        let err = Registry::load(vec![
            SourceEntry::new("Auth", "/specs/auth.yaml"),
            SourceEntry::new("RBAC", "/specs/rbac.yaml"),
            SourceEntry::new("Auth", "https://elsewhere.example.com/auth.json"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::DuplicateName {
                name: "Auth".to_owned(),
                first: 0,
                second: 2,
            }
        );
    }

    #[test]
    fn test_empty_and_blank_locator() {
        for locator in ["", "   "] {
            let err = Registry::load(vec![
                SourceEntry::new("Auth", "/specs/auth.yaml"),
                SourceEntry::new("RBAC", locator),
            ])
            .unwrap_err();
            assert_eq!(
                err,
                LoadError::EmptyLocator {
                    name: "RBAC".to_owned(),
                    position: 1,
                }
            );
        }
    }

    #[test]
    fn test_blank_name() {
        let err = Registry::load(vec![SourceEntry::new(" ", "/specs/auth.yaml")]).unwrap_err();
        assert_eq!(err, LoadError::EmptyName { position: 0 });
    }

    #[test]
    fn test_shared_locator_policies() {
        let sources = vec![
            SourceEntry::new("Ledger", "/specs/gl-service.yaml"),
            SourceEntry::new("GL Service", "/specs/gl-service.yaml"),
        ];

        let (allowed, logs) = load_capturing_logs(sources.clone(), LocatorPolicy::Allow);
        assert_eq!(allowed.unwrap().len(), 2);
        assert!(!logs.contains("WARN"), "unexpected warning: {logs}");

        let (warned, logs) = load_capturing_logs(sources.clone(), LocatorPolicy::Warn);
        assert_eq!(warned.unwrap().len(), 2);
        assert!(logs.contains("WARN"), "no warning logged: {logs}");
        assert!(logs.contains("Locator is shared by more than one source"));
        assert!(logs.contains("/specs/gl-service.yaml"));

        let err = Registry::load_with_policy(sources, LocatorPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            LoadError::DuplicateLocator {
                locator: "/specs/gl-service.yaml".to_owned(),
                first: "Ledger".to_owned(),
                second: "GL Service".to_owned(),
            }
        );
    }

    #[test]
    fn test_get_and_clone_share_entries() {
        let registry = Registry::load(vec![SourceEntry::new("Auth", "/specs/auth.yaml")]).unwrap();
        let copy = registry.clone();
        assert_eq!(copy.get("Auth"), registry.get("Auth"));
        assert!(registry.get("auth").is_none());
    }
}
