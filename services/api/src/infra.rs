use kindness_registry::config::RegistryConfig;
use kindness_registry::registry::{
    Change, InMemoryPositionStore, Position, PositionFilter, PositionId, PositionStore,
    SqlitePositionStore, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Backing store chosen at startup from `REGISTRY_DATABASE`.
pub(crate) enum RegistryStore {
    Memory(InMemoryPositionStore),
    Sqlite(SqlitePositionStore),
}

impl RegistryStore {
    pub(crate) fn from_config(config: &RegistryConfig) -> Result<Self, StoreError> {
        match &config.database {
            Some(path) => Ok(Self::Sqlite(open_sqlite_store(path)?)),
            None => {
                info!("no REGISTRY_DATABASE configured; records live in memory only");
                Ok(Self::Memory(InMemoryPositionStore::new()))
            }
        }
    }

    fn inner(&self) -> &dyn PositionStore {
        match self {
            Self::Memory(store) => store,
            Self::Sqlite(store) => store,
        }
    }
}

impl PositionStore for RegistryStore {
    fn get(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        self.inner().get(id)
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Position>, StoreError> {
        self.inner().get_by_code(code)
    }

    fn get_all(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        self.inner().get_all(filter)
    }

    fn commit(&self, changes: Vec<Change>) -> Result<usize, StoreError> {
        self.inner().commit(changes)
    }
}

pub(crate) fn open_sqlite_store(path: &Path) -> Result<SqlitePositionStore, StoreError> {
    let store = SqlitePositionStore::new(path);
    store.init()?;
    info!(path = %path.display(), "registry database ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindness_registry::registry::{NewPosition, UnitOfWork};

    fn position(code: &str) -> NewPosition {
        NewPosition {
            name: "Chen ancestors".to_string(),
            position_code: code.to_string(),
            floor: "1F".to_string(),
            section: "AF".to_string(),
            level: "3F".to_string(),
            position: "001".to_string(),
            applicant_name: None,
            relation: None,
            mobile_phone: None,
            note: None,
        }
    }

    #[test]
    fn defaults_to_memory_store_without_database() {
        let store = RegistryStore::from_config(&RegistryConfig::default()).expect("store builds");
        assert!(matches!(store, RegistryStore::Memory(_)));
    }

    #[test]
    fn sqlite_store_is_initialized_from_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = RegistryConfig {
            database: Some(dir.path().join("registry.db")),
            ..RegistryConfig::default()
        };

        let store = RegistryStore::from_config(&config).expect("store builds");
        assert!(matches!(store, RegistryStore::Sqlite(_)));

        let mut uow = UnitOfWork::new(&store);
        uow.add(position("1FAF3F:001"));
        assert_eq!(uow.save().expect("commit"), 1);
        assert!(store
            .get_by_code("1FAF3F:001")
            .expect("lookup")
            .is_some());
    }
}
