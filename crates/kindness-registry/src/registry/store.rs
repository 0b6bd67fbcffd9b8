use super::domain::{NewPosition, Position, PositionFilter, PositionId};

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("position code [{code}] is already held by another record")]
    Conflict { code: String },
    #[error("position {0} not found")]
    NotFound(PositionId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A staged write, applied by [`PositionStore::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Add(NewPosition),
    Update(Position),
    Remove(PositionId),
}

/// Persistence collaborator for the registry.
///
/// Reads go straight to the store. Writes are staged through a [`UnitOfWork`]
/// and applied together by `commit`, which must be atomic: either every change
/// lands or none does. Implementations enforce `position_code` uniqueness at
/// commit time and report a violation as [`StoreError::Conflict`].
pub trait PositionStore: Send + Sync {
    fn get(&self, id: PositionId) -> Result<Option<Position>, StoreError>;
    fn get_by_code(&self, code: &str) -> Result<Option<Position>, StoreError>;
    /// Records ordered by id.
    fn get_all(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError>;
    /// Apply staged changes atomically, returning the number of affected rows.
    fn commit(&self, changes: Vec<Change>) -> Result<usize, StoreError>;
}

/// Per-operation change set over an injected store.
pub struct UnitOfWork<'a, S: PositionStore + ?Sized> {
    store: &'a S,
    pending: Vec<Change>,
}

impl<'a, S: PositionStore + ?Sized> UnitOfWork<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            pending: Vec::new(),
        }
    }

    pub fn add(&mut self, position: NewPosition) {
        self.pending.push(Change::Add(position));
    }

    pub fn add_range(&mut self, positions: impl IntoIterator<Item = NewPosition>) {
        self.pending
            .extend(positions.into_iter().map(Change::Add));
    }

    pub fn update(&mut self, position: Position) {
        self.pending.push(Change::Update(position));
    }

    pub fn remove(&mut self, id: PositionId) {
        self.pending.push(Change::Remove(id));
    }

    /// Commit every staged change in one store round trip.
    pub fn save(self) -> Result<usize, StoreError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        self.store.commit(self.pending)
    }
}
