//! Name source collaborator.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::SourceError;
use crate::types::{NameId, NameRecord};

/// Read-only provider of name records.
///
/// Calls are blocking; timeout and cancellation belong to the caller.
pub trait NameSource: Send + Sync {
    /// Full corpus snapshot, used by rebuilds.
    fn list_all(&self) -> Result<Vec<NameRecord>, SourceError>;

    /// Point lookup, used for leaf enrichment.
    fn get_by_id(&self, id: NameId) -> Result<Option<NameRecord>, SourceError>;
}

/// In-memory name source.
#[derive(Debug, Default)]
pub struct MemoryNameSource {
    records: RwLock<BTreeMap<NameId, NameRecord>>,
}

impl MemoryNameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = NameRecord>) -> Self {
        let source = Self::new();
        {
            let mut map = source.records.write();
            for record in records {
                map.insert(record.id, record);
            }
        }
        source
    }

    /// Inserts or replaces a record, returning the previous one.
    pub fn insert(&self, record: NameRecord) -> Option<NameRecord> {
        self.records.write().insert(record.id, record)
    }

    pub fn remove(&self, id: NameId) -> Option<NameRecord> {
        self.records.write().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl NameSource for MemoryNameSource {
    fn list_all(&self) -> Result<Vec<NameRecord>, SourceError> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn get_by_id(&self, id: NameId) -> Result<Option<NameRecord>, SourceError> {
        Ok(self.records.read().get(&id).cloned())
    }
}
