//! In-memory [`MetadataSource`] for tests.

use crate::error::{ErrorKind, Result};
use crate::{ExternalRecord, MetadataSource, Records};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves a fixed set of records. A search matches a record by exact
/// external id or by a case-insensitive substring of its title.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    records: Vec<ExternalRecord>,
    unavailable: bool,
    searches: Arc<AtomicUsize>,
}

impl StaticSource {
    pub fn new(records: impl IntoIterator<Item = ExternalRecord>) -> Self {
        Self { records: records.into_iter().collect(), ..Self::default() }
    }

    /// A source whose every search fails with `RemoteUnavailable`.
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    /// Number of searches served so far, failed ones included.
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for StaticSource {
    async fn search(&self, query: &str) -> Result<Records> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            exn::bail!(ErrorKind::RemoteUnavailable);
        }
        let needle = query.to_lowercase();
        let matches: Vec<_> = self
            .records
            .iter()
            .filter(|record| {
                record.external_id == query
                    || record.title.as_ref().is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(Records::new(matches))
    }
}
