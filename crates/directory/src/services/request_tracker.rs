use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::directory_service::DirectoryService;
use crate::entities::ClassRoom;
use crate::types::{DirectoryResult, FetchClassOptions};

/// Sequence number handed to one in-flight request for a resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    key: String,
    sequence: u64,
}

impl RequestTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Issues monotonic tickets per resource key.
///
/// Only the latest ticket issued for a key is current; completions holding an
/// older ticket must be discarded.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<Mutex<HashMap<String, u64>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self, key: &str) -> RequestTicket {
        let mut guard = self.latest.lock().await;
        let sequence = guard.entry(key.to_string()).or_insert(0);
        *sequence += 1;
        RequestTicket {
            key: key.to_string(),
            sequence: *sequence,
        }
    }

    pub async fn is_current(&self, ticket: &RequestTicket) -> bool {
        let guard = self.latest.lock().await;
        guard.get(&ticket.key) == Some(&ticket.sequence)
    }
}

/// Result of a tracked load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    /// The load was the latest for its key and its result should be applied
    Applied(T),
    /// A newer load for the same key was started before this one completed
    Superseded,
}

impl<T> LoadOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            LoadOutcome::Applied(value) => Some(value),
            LoadOutcome::Superseded => None,
        }
    }
}

/// Loads classrooms with their roster into a named slot, dropping stale completions.
#[derive(Debug, Clone)]
pub struct ClassLoader {
    service: DirectoryService,
    tracker: RequestTracker,
}

impl ClassLoader {
    pub fn new(service: DirectoryService) -> Self {
        Self {
            service,
            tracker: RequestTracker::new(),
        }
    }

    pub async fn load(&self, slot: &str, class_id: &str) -> DirectoryResult<LoadOutcome<ClassRoom>> {
        let ticket = self.tracker.issue(slot).await;
        let classroom = self
            .service
            .fetch_class_by_id(class_id, FetchClassOptions { with_users: true })
            .await?;

        if self.tracker.is_current(&ticket).await {
            Ok(LoadOutcome::Applied(classroom))
        } else {
            debug!(slot, class_id, sequence = ticket.sequence, "discarding superseded class load");
            Ok(LoadOutcome::Superseded)
        }
    }
}
