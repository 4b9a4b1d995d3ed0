//! File-backed record store.
//!
//! The whole table is a JSON array of flat documents.  Every mutation
//! rewrites the file through a sibling temp file and a rename, so a crash
//! mid-write leaves either the old or the new table, never a torn one.
//! The cached table only changes once the write has landed; a failed
//! mutation leaves both file and cache as they were.  A missing file is an
//! empty store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::{Document, Matcher, RecordStore, StoreError};

use super::memory_store::{merge_into, remove_from};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    docs: Vec<Document>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let docs = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str::<Vec<Document>>(&text)
                .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("JsonFileStore: {} not found, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", path.display()))),
        };
        debug!("JsonFileStore: loaded {} record(s) from {}", docs.len(), path.display());
        Ok(Self { path, docs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, docs: &[Document]) -> Result<(), StoreError> {
        let io = |e: std::io::Error| StoreError::Io(format!("{}: {e}", self.path.display()));
        let body =
            serde_json::to_vec_pretty(docs).map_err(|e| StoreError::Io(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io)?;
        fs::rename(&tmp, &self.path).map_err(io)
    }

    /// Write `next` to disk, then adopt it as the cached table.
    fn commit(&mut self, next: Vec<Document>) -> Result<(), StoreError> {
        self.flush(&next)?;
        self.docs = next;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs.clone())
    }

    fn find(&self, matcher: &Matcher) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.iter().find(|d| matcher.matches(d)).cloned())
    }

    fn insert(&mut self, doc: Document) -> Result<(), StoreError> {
        let mut next = self.docs.clone();
        next.push(doc);
        self.commit(next)
    }

    fn update(&mut self, fields: Document, matcher: &Matcher) -> Result<usize, StoreError> {
        let mut next = self.docs.clone();
        let touched = merge_into(&mut next, &fields, matcher);
        if touched > 0 {
            self.commit(next)?;
        }
        Ok(touched)
    }

    fn remove(&mut self, matcher: &Matcher) -> Result<usize, StoreError> {
        let mut next = self.docs.clone();
        let removed = remove_from(&mut next, matcher);
        if removed > 0 {
            self.commit(next)?;
        }
        Ok(removed)
    }
}
