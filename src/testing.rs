//! In-memory query double recording every clause the paginator applies.

use crate::{LoadPage, LoadRelated, PageQuery};
use ::std::collections::BTreeMap;
use ::std::sync::atomic::{AtomicUsize, Ordering};
use ::std::sync::{Arc, Barrier, Mutex};

#[derive(Clone, Copy, Debug, Eq, PartialEq, ::thiserror::Error)]
pub(crate) enum FakeError {
    #[error("count failed")]
    Count,
    #[error("fetch failed")]
    Fetch,
    #[error("unknown relation")]
    UnknownRelation,
}

#[derive(Debug, Default)]
pub(crate) struct Calls {
    counts: AtomicUsize,
    fetches: AtomicUsize,
}

impl Calls {
    pub(crate) fn counts(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// Clauses of a query that reached a fetch.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Window {
    pub(crate) order: Vec<String>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

#[derive(Clone, Debug)]
pub(crate) struct FakeQuery {
    rows: Arc<Vec<String>>,
    pub(crate) order: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    fail_count: bool,
    fail_fetch: bool,
    barrier: Option<Arc<Barrier>>,
    calls: Arc<Calls>,
    last_fetch: Arc<Mutex<Option<Window>>>,
}

impl FakeQuery {
    pub(crate) fn new(rows: Vec<String>) -> Self {
        Self {
            rows: Arc::new(rows),
            order: Vec::new(),
            limit: None,
            offset: None,
            fail_count: false,
            fail_fetch: false,
            barrier: None,
            calls: Arc::default(),
            last_fetch: Arc::default(),
        }
    }

    pub(crate) fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub(crate) fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Makes count and fetch wait for each other before returning.
    pub(crate) fn meeting_at(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub(crate) fn calls(&self) -> &Calls {
        &self.calls
    }

    pub(crate) fn last_fetch(&self) -> Option<Window> {
        self.last_fetch.lock().unwrap().clone()
    }

    fn meet(&self) {
        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }
    }

    fn count_rows(&self, rows: &[String]) -> Result<i64, FakeError> {
        self.calls.counts.fetch_add(1, Ordering::SeqCst);
        self.meet();
        if self.fail_count {
            return Err(FakeError::Count);
        }
        Ok(rows.len() as i64)
    }

    /// A trailing `DESC` sorts descending, anything else ascending.
    fn fetch_rows(&self, rows: &[String], records: &mut Vec<String>) -> Result<(), FakeError> {
        self.calls.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_fetch.lock().unwrap() = Some(Window {
            order: self.order.clone(),
            limit: self.limit,
            offset: self.offset,
        });
        self.meet();

        let mut rows = rows.to_vec();
        for clause in self.order.iter().rev() {
            if clause.ends_with("DESC") {
                rows.sort_by(|a, b| b.cmp(a));
            } else {
                rows.sort();
            }
        }
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let limit = self.limit.map_or(usize::MAX, |limit| limit.max(0) as usize);

        records.clear();
        records.extend(rows.into_iter().skip(offset).take(limit));

        if self.fail_fetch {
            return Err(FakeError::Fetch);
        }
        Ok(())
    }
}

impl PageQuery for FakeQuery {
    type Error = FakeError;

    fn order(mut self, clause: &str) -> Self {
        self.order.push(clause.to_owned());
        self
    }

    fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl LoadPage<String> for FakeQuery {
    fn load_page(&self, records: &mut Vec<String>) -> Result<(), FakeError> {
        self.fetch_rows(&self.rows, records)
    }

    fn count(&self) -> Result<i64, FakeError> {
        self.count_rows(&self.rows)
    }
}

/// Owner whose relations are plain named row lists.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeOwner {
    relations: BTreeMap<String, Vec<String>>,
}

impl FakeOwner {
    pub(crate) fn with_relation(mut self, name: &str, rows: Vec<String>) -> Self {
        self.relations.insert(name.to_owned(), rows);
        self
    }
}

impl LoadRelated<FakeOwner, String> for FakeQuery {
    type Association = Arc<Vec<String>>;

    fn association(&self, owner: &FakeOwner, relation: &str) -> Result<Self::Association, FakeError> {
        owner
            .relations
            .get(relation)
            .map(|rows| Arc::new(rows.clone()))
            .ok_or(FakeError::UnknownRelation)
    }

    fn count_related(&self, association: &Self::Association) -> Result<i64, FakeError> {
        self.count_rows(association)
    }

    fn load_related(
        &self,
        association: &Self::Association,
        records: &mut Vec<String>,
    ) -> Result<(), FakeError> {
        self.fetch_rows(association, records)
    }
}
