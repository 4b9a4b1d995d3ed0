//! In-memory record store.
//!
//! Backs tests and debug runs; nothing survives the process.  Documents
//! keep insertion order, like the file-backed store.

use log::trace;

use crate::app::ports::{Document, Matcher, RecordStore, StoreError};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    docs: Vec<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Shared merge/delete logic for every `Vec<Document>`-backed store.
pub(crate) fn merge_into(docs: &mut [Document], fields: &Document, matcher: &Matcher) -> usize {
    let mut touched = 0;
    for doc in docs.iter_mut().filter(|d| matcher.matches(d)) {
        for (k, v) in fields {
            doc.insert(k.clone(), v.clone());
        }
        touched += 1;
    }
    touched
}

pub(crate) fn remove_from(docs: &mut Vec<Document>, matcher: &Matcher) -> usize {
    let before = docs.len();
    docs.retain(|d| !matcher.matches(d));
    before - docs.len()
}

impl RecordStore for MemoryStore {
    fn all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.docs.clone())
    }

    fn find(&self, matcher: &Matcher) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.iter().find(|d| matcher.matches(d)).cloned())
    }

    fn insert(&mut self, doc: Document) -> Result<(), StoreError> {
        self.docs.push(doc);
        Ok(())
    }

    fn update(&mut self, fields: Document, matcher: &Matcher) -> Result<usize, StoreError> {
        let touched = merge_into(&mut self.docs, &fields, matcher);
        trace!("MemoryStore: updated {} document(s)", touched);
        Ok(touched)
    }

    fn remove(&mut self, matcher: &Matcher) -> Result<usize, StoreError> {
        Ok(remove_from(&mut self.docs, matcher))
    }
}
