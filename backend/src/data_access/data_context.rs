//! Document store over redb.
//!
//! One table per collection, keyed by the 16-byte document id, values
//! encoded with postcard. Ids are UUIDv7, so key order is insertion order
//! and `find_all` returns documents in that natural order.
//!
//! Every public operation runs in its own transaction. Nothing here spans
//! more than one call: callers that chain a read and a write (toggle, tag
//! delete + cascade) are not atomic against concurrent writers.

use redb::{backends::InMemoryBackend, Database, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use std::{collections::HashSet, path::Path, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

use crate::{category::Category, tag::Tag, task::Task};

const CATEGORIES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("categories");
const TAGS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tags");
const TASKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");

/// A record stored in one of the collections.
pub trait Document: Serialize + DeserializeOwned {
    const TABLE: TableDefinition<'static, &'static [u8], &'static [u8]>;

    fn id(&self) -> Uuid;
}

impl Document for Category {
    const TABLE: TableDefinition<'static, &'static [u8], &'static [u8]> = CATEGORIES_TABLE;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Tag {
    const TABLE: TableDefinition<'static, &'static [u8], &'static [u8]> = TAGS_TABLE;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Task {
    const TABLE: TableDefinition<'static, &'static [u8], &'static [u8]> = TASKS_TABLE;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Handle to the store. Cloneable (Arc inside); the database closes when
/// the last clone is dropped.
#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Open (or create) the store file at `path` and make sure every
    /// collection table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// A store that lives only in memory. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, StoreError> {
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(CATEGORIES_TABLE)?;
            let _ = txn.open_table(TAGS_TABLE)?;
            let _ = txn.open_table(TASKS_TABLE)?;
        }
        txn.commit()?;
        Ok(DataContext { db: Arc::new(db) })
    }

    pub fn insert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(D::TABLE)?;
            let bytes = encode(doc)?;
            table.insert(doc.id().as_bytes().as_slice(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Insert every document in one transaction. Either all land or none do.
    pub fn insert_many<D: Document>(&self, docs: &[D]) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(D::TABLE)?;
            for doc in docs {
                let bytes = encode(doc)?;
                table.insert(doc.id().as_bytes().as_slice(), bytes.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    pub fn find_by_id<D: Document>(&self, id: Uuid) -> Result<Option<D>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(D::TABLE)?;
        let doc = match table.get(id.as_bytes().as_slice())? {
            Some(data) => Some(decode(data.value())?),
            None => None,
        };
        Ok(doc)
    }

    /// All documents of a collection in natural (insertion) order.
    pub fn find_all<D: Document>(&self) -> Result<Vec<D>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(D::TABLE)?;

        let mut docs = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            docs.push(decode(value.value())?);
        }
        Ok(docs)
    }

    /// Overwrite an existing document. Returns false (and writes nothing)
    /// when no document with that id exists.
    pub fn replace<D: Document>(&self, doc: &D) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let replaced;
        {
            let mut table = txn.open_table(D::TABLE)?;
            let id = doc.id();
            replaced = table.get(id.as_bytes().as_slice())?.is_some();
            if replaced {
                let bytes = encode(doc)?;
                table.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(replaced)
    }

    pub fn remove<D: Document>(&self, id: Uuid) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let removed;
        {
            let mut table = txn.open_table(D::TABLE)?;
            removed = table.remove(id.as_bytes().as_slice())?.is_some();
        }
        txn.commit()?;
        Ok(removed)
    }

    /// Apply `apply` to every document whose id is in `ids`, in one
    /// transaction. Ids with no document are skipped; duplicates count once.
    /// An error from `apply` aborts the whole batch.
    pub fn update_many<D, E, F>(&self, ids: &[Uuid], mut apply: F) -> Result<usize, E>
    where
        D: Document,
        E: From<StoreError>,
        F: FnMut(&mut D) -> Result<(), E>,
    {
        let txn = self.db.begin_write().map_err(StoreError::from)?;
        let mut updated = 0;
        {
            let mut table = txn.open_table(D::TABLE).map_err(StoreError::from)?;
            let mut seen = HashSet::with_capacity(ids.len());
            for id in ids {
                if !seen.insert(*id) {
                    continue;
                }
                let current: Option<D> = match table.get(id.as_bytes().as_slice()).map_err(StoreError::from)? {
                    Some(data) => Some(decode(data.value())?),
                    None => None,
                };
                let Some(mut doc) = current else { continue };
                apply(&mut doc)?;
                let bytes = encode(&doc)?;
                table
                    .insert(id.as_bytes().as_slice(), bytes.as_slice())
                    .map_err(StoreError::from)?;
                updated += 1;
            }
        }
        txn.commit().map_err(StoreError::from)?;
        Ok(updated)
    }

    /// Scan the whole collection in one transaction; `apply` returns true
    /// for documents it changed, and only those are written back.
    /// Returns the number of documents written.
    pub fn update_where<D, E, F>(&self, mut apply: F) -> Result<usize, E>
    where
        D: Document,
        E: From<StoreError>,
        F: FnMut(&mut D) -> Result<bool, E>,
    {
        let txn = self.db.begin_write().map_err(StoreError::from)?;
        let mut changed = Vec::new();
        {
            let mut table = txn.open_table(D::TABLE).map_err(StoreError::from)?;
            for entry in table.iter().map_err(StoreError::from)? {
                let (_, value) = entry.map_err(StoreError::from)?;
                let mut doc: D = decode(value.value())?;
                if apply(&mut doc)? {
                    changed.push(doc);
                }
            }
            for doc in &changed {
                let bytes = encode(doc)?;
                table
                    .insert(doc.id().as_bytes().as_slice(), bytes.as_slice())
                    .map_err(StoreError::from)?;
            }
        }
        txn.commit().map_err(StoreError::from)?;
        Ok(changed.len())
    }

    /// Delete every document whose id is in `ids`. Missing ids are ignored.
    pub fn delete_many<D: Document>(&self, ids: &[Uuid]) -> Result<usize, StoreError> {
        let txn = self.db.begin_write()?;
        let mut deleted = 0;
        {
            let mut table = txn.open_table(D::TABLE)?;
            for id in ids {
                if table.remove(id.as_bytes().as_slice())?.is_some() {
                    deleted += 1;
                }
            }
        }
        txn.commit()?;
        Ok(deleted)
    }
}

fn encode<D: Serialize>(doc: &D) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(doc).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode<D: DeserializeOwned>(bytes: &[u8]) -> Result<D, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb: {0}")]
    Redb(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("encode: {0}")]
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tag(name: &str) -> Tag {
        let now = Utc::now();
        Tag {
            id: Uuid::now_v7(),
            name: name.into(),
            color: "#ff0000".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_then_find() {
        let ctx = DataContext::open_in_memory().unwrap();
        let work = tag("work");
        ctx.insert(&work).unwrap();

        let found: Tag = ctx.find_by_id(work.id).unwrap().unwrap();
        assert_eq!(found, work);
        assert!(ctx.find_by_id::<Tag>(Uuid::now_v7()).unwrap().is_none());
    }

    #[test]
    fn find_all_returns_insertion_order() {
        let ctx = DataContext::open_in_memory().unwrap();
        let names = ["zeta", "alpha", "mid"];
        for name in names {
            ctx.insert(&tag(name)).unwrap();
        }

        let all: Vec<Tag> = ctx.find_all().unwrap();
        let got: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(got, names);
    }

    #[test]
    fn replace_missing_document_is_a_no_op() {
        let ctx = DataContext::open_in_memory().unwrap();
        let ghost = tag("ghost");
        assert!(!ctx.replace(&ghost).unwrap());
        assert!(ctx.find_all::<Tag>().unwrap().is_empty());

        ctx.insert(&ghost).unwrap();
        let mut renamed = ghost.clone();
        renamed.name = "visible".into();
        assert!(ctx.replace(&renamed).unwrap());
        assert_eq!(ctx.find_by_id::<Tag>(ghost.id).unwrap().unwrap().name, "visible");
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let ctx = DataContext::open_in_memory().unwrap();
        let doomed = tag("doomed");
        ctx.insert(&doomed).unwrap();

        assert!(ctx.remove::<Tag>(doomed.id).unwrap());
        assert!(!ctx.remove::<Tag>(doomed.id).unwrap());
    }

    #[test]
    fn update_many_skips_unknown_and_duplicate_ids() {
        let ctx = DataContext::open_in_memory().unwrap();
        let a = tag("a");
        let b = tag("b");
        ctx.insert_many(&[a.clone(), b.clone()]).unwrap();

        let ids = [a.id, Uuid::now_v7(), a.id, b.id];
        let updated = ctx
            .update_many::<Tag, StoreError, _>(&ids, |t| {
                t.color = "#000000".into();
                Ok(())
            })
            .unwrap();
        assert_eq!(updated, 2);
        assert!(ctx.find_all::<Tag>().unwrap().iter().all(|t| t.color == "#000000"));
    }

    #[test]
    fn update_many_error_aborts_the_batch() {
        let ctx = DataContext::open_in_memory().unwrap();
        let a = tag("a");
        let b = tag("b");
        ctx.insert_many(&[a.clone(), b.clone()]).unwrap();

        let result = ctx.update_many::<Tag, StoreError, _>(&[a.id, b.id], |t| {
            if t.name == "b" {
                return Err(StoreError::Encode("refused".into()));
            }
            t.name = "changed".into();
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(ctx.find_by_id::<Tag>(a.id).unwrap().unwrap().name, "a");
    }

    #[test]
    fn update_where_writes_only_changed_documents() {
        let ctx = DataContext::open_in_memory().unwrap();
        ctx.insert_many(&[tag("keep"), tag("flip"), tag("flip")]).unwrap();

        let changed = ctx
            .update_where::<Tag, StoreError, _>(|t| {
                if t.name == "flip" {
                    t.name = "flipped".into();
                    return Ok(true);
                }
                Ok(false)
            })
            .unwrap();
        assert_eq!(changed, 2);
    }

    #[test]
    fn delete_many_counts_only_existing() {
        let ctx = DataContext::open_in_memory().unwrap();
        let a = tag("a");
        let b = tag("b");
        ctx.insert_many(&[a.clone(), b.clone()]).unwrap();

        let deleted = ctx.delete_many::<Tag>(&[a.id, Uuid::now_v7()]).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(ctx.find_all::<Tag>().unwrap(), vec![b]);
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.redb");
        let kept = tag("kept");

        {
            let ctx = DataContext::open(&path).unwrap();
            ctx.insert(&kept).unwrap();
        }

        let ctx = DataContext::open(&path).unwrap();
        assert_eq!(ctx.find_all::<Tag>().unwrap(), vec![kept]);
    }
}
