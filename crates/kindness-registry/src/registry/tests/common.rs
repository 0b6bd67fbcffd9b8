use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::registry::domain::{ImportRow, NewPosition, Position, PositionFilter, PositionId};
use crate::registry::masking::{ApplicantMasker, MaskError};
use crate::registry::memory::InMemoryPositionStore;
use crate::registry::store::{Change, PositionStore, StoreError, UnitOfWork};
use crate::registry::{registry_router, RegistryService, RegistrySettings};

pub(super) fn import_row(name: &str, code: &str) -> ImportRow {
    ImportRow {
        name: Some(name.to_string()),
        floor: Some("1F".to_string()),
        section: Some("AF".to_string()),
        level: Some("3F".to_string()),
        position: Some(code.rsplit(':').next().unwrap_or_default().to_string()),
        position_code: Some(code.to_string()),
        applicant_name: Some("王小明".to_string()),
        relation: Some("grandson".to_string()),
        mobile_phone: Some("0912345678".to_string()),
        note: None,
    }
}

pub(super) fn new_position(name: &str, code: &str, applicant: Option<&str>) -> NewPosition {
    NewPosition {
        name: name.to_string(),
        position_code: code.to_string(),
        floor: "1F".to_string(),
        section: "AF".to_string(),
        level: "3F".to_string(),
        position: code.rsplit(':').next().unwrap_or_default().to_string(),
        applicant_name: applicant.map(str::to_string),
        relation: None,
        mobile_phone: None,
        note: None,
    }
}

pub(super) fn build_service() -> (
    RegistryService<InMemoryPositionStore>,
    Arc<InMemoryPositionStore>,
) {
    let store = Arc::new(InMemoryPositionStore::new());
    let service = RegistryService::new(store.clone(), RegistrySettings::default());
    (service, store)
}

/// Seed the store directly and return the stored records in id order.
pub(super) fn seed(store: &InMemoryPositionStore, positions: Vec<NewPosition>) -> Vec<Position> {
    let mut uow = UnitOfWork::new(store);
    uow.add_range(positions);
    uow.save().expect("seed commit succeeds");
    store
        .get_all(&PositionFilter::default())
        .expect("seed listing succeeds")
}

pub(super) fn seeded_service() -> (
    RegistryService<InMemoryPositionStore>,
    Arc<InMemoryPositionStore>,
    Vec<Position>,
) {
    let (service, store) = build_service();
    let seeded = seed(
        &store,
        vec![
            new_position("Chen ancestors", "1FAF3F:001", Some("王小明")),
            new_position("Lin ancestors", "1FAF3F:002", Some("李四")),
            new_position("Wu family", "2FBF1F:010", Some("張")),
        ],
    );
    (service, store, seeded)
}

pub(super) fn registry_router_with_service(
    service: RegistryService<InMemoryPositionStore>,
) -> axum::Router {
    registry_router(Arc::new(service))
}

/// Masker that refuses a specific name, to exercise the fail-open listing path.
pub(super) struct RefusingMasker {
    pub(super) refuse: &'static str,
}

impl ApplicantMasker for RefusingMasker {
    fn mask(&self, raw: Option<&str>) -> Result<Option<String>, MaskError> {
        if raw == Some(self.refuse) {
            Err(MaskError {
                reason: "unsupported name".to_string(),
            })
        } else {
            Ok(raw.map(|_| "masked".to_string()))
        }
    }
}

/// Store whose reads work but whose commits always fail.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    pub(super) inner: InMemoryPositionStore,
    pub(super) commits: AtomicUsize,
}

impl PositionStore for ReadOnlyStore {
    fn get(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        self.inner.get(id)
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Position>, StoreError> {
        self.inner.get_by_code(code)
    }

    fn get_all(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        self.inner.get_all(filter)
    }

    fn commit(&self, _changes: Vec<Change>) -> Result<usize, StoreError> {
        self.commits.fetch_add(1, Ordering::Relaxed);
        Err(StoreError::Unavailable("read only".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl PositionStore for UnavailableStore {
    fn get(&self, _id: PositionId) -> Result<Option<Position>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn get_by_code(&self, _code: &str) -> Result<Option<Position>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn get_all(&self, _filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn commit(&self, _changes: Vec<Change>) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
