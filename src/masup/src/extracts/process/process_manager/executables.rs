use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

pub type Executables = BTreeMap<String, BTreeSet<String>>;

/// Shared, grow-only record of every executable path seen for each tool.
///
/// Paths are compared as exact strings, without normalisation.
#[derive(Debug, Clone, Default)]
pub struct ExecutableRegistry {
    executables: Arc<RwLock<Executables>>,
}

impl ExecutableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_executables(executables: Executables) -> Self {
        Self {
            executables: Arc::new(RwLock::new(executables)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Executables> {
        self.executables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Executables> {
        self.executables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers one tick's worth of observed paths under a single write lock.
    pub fn register_all(&self, observed: &BTreeMap<String, Vec<String>>) -> usize {
        if observed.values().all(Vec::is_empty) {
            return 0;
        }
        let mut executables = self.write();
        observed
            .iter()
            .flat_map(|(tool_id, paths)| paths.iter().map(move |path| (tool_id, path)))
            .filter(|(tool_id, path)| !path.is_empty() && insert(&mut executables, tool_id, path))
            .count()
    }

    /// Independent copy of the whole registry.
    pub fn executables(&self) -> Executables {
        self.read().clone()
    }

    pub fn get(&self, tool_id: &str) -> Option<BTreeSet<String>> {
        self.read().get(tool_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

fn insert(executables: &mut Executables, tool_id: &str, path: &str) -> bool {
    let inserted = executables
        .entry(tool_id.to_string())
        .or_default()
        .insert(path.to_string());
    if inserted {
        debug!("New executable for {}: {}", tool_id, path);
    }
    inserted
}
