use crate::domain::model::{Lead, SearchRequest};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bounded FIFO of recent search results, keyed by normalized request, so a
/// CSV download never repeats billed API calls.
pub struct ResultCache {
    capacity: usize,
    entries: RwLock<VecDeque<(SearchRequest, Arc<Vec<Lead>>)>>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn insert(&self, request: &SearchRequest, leads: Vec<Lead>) -> Arc<Vec<Lead>> {
        let key = request.normalized();
        let leads = Arc::new(leads);

        let mut entries = self.entries.write().await;
        entries.retain(|(existing, _)| *existing != key);
        entries.push_back((key, leads.clone()));
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        leads
    }

    pub async fn get(&self, request: &SearchRequest) -> Option<Arc<Vec<Lead>>> {
        let key = request.normalized();
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, leads)| leads.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
