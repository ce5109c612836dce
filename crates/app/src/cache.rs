use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use metrics::counter;
use tracing::debug;

/// Most pages kept per path. Search queries are client-chosen, so the
/// oldest rendering is evicted once a path reaches this many.
pub const MAX_PAGES_PER_PATH: usize = 64;

/// Rendered list pages keyed by path, then by normalized query string.
///
/// Every path carries a generation number that [`PageCache::revalidate_path`]
/// bumps. A render that started before a revalidation cannot be stored
/// afterwards, so the next read after a mutation always goes to storage.
#[derive(Clone, Default)]
pub struct PageCache {
    inner: Arc<Mutex<HashMap<String, PathEntry>>>,
}

#[derive(Default)]
struct PathEntry {
    generation: u64,
    pages: HashMap<String, Arc<str>>,
    /// Keys of `pages` in insertion order.
    order: VecDeque<String>,
}

/// Result of looking up a cached page.
pub enum Lookup {
    Hit(Arc<str>),
    Miss(FillTicket),
}

/// Permission to store a freshly rendered page, valid until the next revalidation.
#[derive(Debug)]
pub struct FillTicket {
    path: String,
    key: String,
    generation: u64,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PathEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup(&self, path: &str, key: &str) -> Lookup {
        let mut entries = self.entries();
        let entry = entries.entry(path.to_string()).or_default();
        if let Some(html) = entry.pages.get(key) {
            counter!("page_cache_requests_total", "result" => "hit").increment(1);
            return Lookup::Hit(html.clone());
        }

        counter!("page_cache_requests_total", "result" => "miss").increment(1);
        Lookup::Miss(FillTicket {
            path: path.to_string(),
            key: key.to_string(),
            generation: entry.generation,
        })
    }

    /// Stores `html` unless the path was revalidated after the ticket was issued.
    pub fn fill(&self, ticket: FillTicket, html: impl Into<Arc<str>>) -> bool {
        let mut entries = self.entries();
        let FillTicket {
            path,
            key,
            generation,
        } = ticket;
        let entry = entries.entry(path.clone()).or_default();
        if entry.generation != generation {
            return false;
        }
        if entry.pages.insert(key.clone(), html.into()).is_none() {
            entry.order.push_back(key);
        }
        while entry.order.len() > MAX_PAGES_PER_PATH {
            if let Some(oldest) = entry.order.pop_front() {
                entry.pages.remove(&oldest);
                debug!(stage = "cache", %path, key = %oldest, "evicted page");
            }
        }
        true
    }

    /// Discards every cached rendering under `path`.
    pub fn revalidate_path(&self, path: &str) {
        let mut entries = self.entries();
        let entry = entries.entry(path.to_string()).or_default();
        let dropped = entry.pages.len();
        entry.pages.clear();
        entry.order.clear();
        entry.generation += 1;
        debug!(stage = "cache", %path, dropped, "revalidated path");
    }

    #[cfg(test)]
    pub fn len(&self, path: &str) -> usize {
        self.entries()
            .get(path)
            .map(|entry| entry.pages.len())
            .unwrap_or_default()
    }
}
