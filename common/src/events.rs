//! Append-only event log
//!
//! Every successful mutating call appends exactly the records it emitted.
//! A failed call appends nothing. Records are never removed or rewritten.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventLog<E> {
    records: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<E> EventLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: E) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&E> {
        self.records.last()
    }

    /// Records appended at or after `index`; empty if `index` is past the end
    pub fn since(&self, index: usize) -> &[E] {
        self.records.get(index..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.records.iter()
    }
}

impl<E> Extend<E> for EventLog<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_since() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        log.push(1u32);
        log.push(2);
        log.extend([3, 4]);

        assert_eq!(log.len(), 4);
        assert_eq!(log.last(), Some(&4));
        assert_eq!(log.since(2), &[3, 4]);
        assert_eq!(log.since(4), &[] as &[u32]);
        assert_eq!(log.since(10), &[] as &[u32]);
        assert_eq!(log.iter().copied().sum::<u32>(), 10);
    }
}
