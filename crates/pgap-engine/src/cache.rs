//! Bounded FIFO cache of completed reports, keyed by document identity and
//! display name.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use pgap_analysis::AnalysisReport;

use crate::request::ReportKey;

#[derive(Debug, Default)]
struct Entries {
    reports: HashMap<ReportKey, Arc<AnalysisReport>>,
    order: VecDeque<ReportKey>,
}

/// Completed reports, evicted oldest-inserted first.
///
/// A capacity of zero disables caching.
#[derive(Debug)]
pub struct ReportCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl ReportCache {
    /// Create a cache holding at most `capacity` reports.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Maximum number of reports.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a report.
    pub fn get(&self, key: &ReportKey) -> Option<Arc<AnalysisReport>> {
        self.entries.lock().reports.get(key).cloned()
    }

    /// Insert or replace a report. Replacing keeps the original insertion
    /// position.
    pub fn insert(&self, key: ReportKey, report: Arc<AnalysisReport>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        if let Some(slot) = entries.reports.get_mut(&key) {
            *slot = report;
            return;
        }
        while entries.order.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.reports.remove(&oldest);
                    tracing::debug!(document_id = %oldest.document_id, "evicted cached report");
                }
                None => break,
            }
        }
        entries.order.push_back(key.clone());
        entries.reports.insert(key, report);
    }

    /// Remove one report.
    pub fn remove(&self, key: &ReportKey) -> Option<Arc<AnalysisReport>> {
        let mut entries = self.entries.lock();
        let removed = entries.reports.remove(key);
        if removed.is_some() {
            entries.order.retain(|k| k != key);
        }
        removed
    }

    /// Number of cached reports.
    pub fn len(&self) -> usize {
        self.entries.lock().reports.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every report.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.reports.clear();
        entries.order.clear();
    }
}
