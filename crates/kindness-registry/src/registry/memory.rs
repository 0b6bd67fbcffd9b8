use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Position, PositionFilter, PositionId};
use super::store::{Change, PositionStore, StoreError};

#[derive(Debug, Clone, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<PositionId, Position>,
}

impl Table {
    fn holder_of(&self, code: &str) -> Option<PositionId> {
        self.rows
            .values()
            .find(|row| row.position_code == code)
            .map(|row| row.id)
    }

    fn apply(&mut self, change: Change) -> Result<usize, StoreError> {
        match change {
            Change::Add(new) => {
                if self.holder_of(&new.position_code).is_some() {
                    return Err(StoreError::Conflict {
                        code: new.position_code,
                    });
                }
                self.next_id += 1;
                let id = PositionId(self.next_id);
                self.rows.insert(id, new.with_id(id));
                Ok(1)
            }
            Change::Update(position) => {
                if !self.rows.contains_key(&position.id) {
                    return Err(StoreError::NotFound(position.id));
                }
                match self.holder_of(&position.position_code) {
                    Some(holder) if holder != position.id => Err(StoreError::Conflict {
                        code: position.position_code,
                    }),
                    _ => {
                        self.rows.insert(position.id, position);
                        Ok(1)
                    }
                }
            }
            Change::Remove(id) => Ok(usize::from(self.rows.remove(&id).is_some())),
        }
    }
}

/// Process-local store; the default backend when no database is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPositionStore {
    table: Arc<Mutex<Table>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("position table lock poisoned".to_string()))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl PositionStore for InMemoryPositionStore {
    fn get(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Position>, StoreError> {
        let table = self.lock()?;
        Ok(table
            .holder_of(code)
            .and_then(|id| table.rows.get(&id).cloned()))
    }

    fn get_all(&self, filter: &PositionFilter) -> Result<Vec<Position>, StoreError> {
        Ok(self
            .lock()?
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    fn commit(&self, changes: Vec<Change>) -> Result<usize, StoreError> {
        let mut table = self.lock()?;
        let mut staged = table.clone();
        let mut affected = 0;
        for change in changes {
            affected += staged.apply(change)?;
        }
        *table = staged;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::domain::NewPosition;

    fn new_position(code: &str) -> NewPosition {
        NewPosition {
            name: "Lin family".to_string(),
            position_code: code.to_string(),
            floor: "1F".to_string(),
            section: "2F".to_string(),
            level: "3F".to_string(),
            position: "001".to_string(),
            applicant_name: None,
            relation: None,
            mobile_phone: None,
            note: None,
        }
    }

    #[test]
    fn commit_assigns_sequential_ids() {
        let store = InMemoryPositionStore::new();
        let affected = store
            .commit(vec![
                Change::Add(new_position("1F2F3F:001")),
                Change::Add(new_position("1F2F3F:002")),
            ])
            .expect("commit succeeds");
        assert_eq!(affected, 2);

        let all = store.get_all(&PositionFilter::default()).expect("list");
        let ids: Vec<i64> = all.iter().map(|row| row.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn failed_commit_leaves_table_untouched() {
        let store = InMemoryPositionStore::new();
        store
            .commit(vec![Change::Add(new_position("1F2F3F:001"))])
            .expect("seed");

        let error = store
            .commit(vec![
                Change::Add(new_position("1F2F3F:002")),
                Change::Add(new_position("1F2F3F:001")),
            ])
            .expect_err("duplicate code rejected");
        assert!(matches!(error, StoreError::Conflict { code } if code == "1F2F3F:001"));
        assert_eq!(store.len().expect("len"), 1);
        assert!(store.get_by_code("1F2F3F:002").expect("lookup").is_none());
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let store = InMemoryPositionStore::new();
        let error = store
            .commit(vec![Change::Update(
                new_position("1F2F3F:001").with_id(PositionId(9)),
            )])
            .expect_err("missing record");
        assert!(matches!(error, StoreError::NotFound(PositionId(9))));
    }

    #[test]
    fn removing_missing_ids_affects_nothing() {
        let store = InMemoryPositionStore::new();
        let affected = store
            .commit(vec![Change::Remove(PositionId(42))])
            .expect("commit succeeds");
        assert_eq!(affected, 0);
    }
}
