use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::error::RegistrarError;
use crate::submission::NewVerificationRequest;
use crate::VerificationRequest;

pub mod sql;

#[cfg(not(target_arch = "wasm32"))]
mod sea_orm_store;

#[cfg(not(target_arch = "wasm32"))]
pub use sea_orm_store::SeaOrmStore;

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

/// Persistence for verification requests.
///
/// There is no coupling between reads and the later `mark_verified`: a request listed as
/// pending may already be verified when it is approved, and the last write wins.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait VerificationStore {
    /// Persists a new request with `is_verified = false`, a fresh id and the current time.
    async fn create(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RegistrarError>;

    /// Every request with `is_verified = false`, in insertion order.
    async fn list_pending(&self) -> Result<Vec<VerificationRequest>, RegistrarError>;

    async fn get_by_id(&self, id: i32) -> Result<VerificationRequest, RegistrarError>;

    /// Sets `is_verified = true`. Marking an already verified request is a no-op success.
    async fn mark_verified(&self, id: i32) -> Result<VerificationRequest, RegistrarError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    records: Vec<VerificationRequest>,
}

/// In-process store, insertion ordered, ids starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored request, verified or not.
    pub fn all(&self) -> Vec<VerificationRequest> {
        self.state.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl VerificationStore for MemoryStore {
    async fn create(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RegistrarError> {
        let mut state = self.state.lock();
        state.last_id += 1;

        let record = VerificationRequest {
            id: state.last_id,
            first_name: request.first_name,
            last_name: request.last_name,
            institution_name: request.institution_name,
            institution_address: request.institution_address,
            role: request.role,
            email: request.email,
            is_verified: false,
            created_at: now_ts(),
        };
        state.records.push(record.clone());

        Ok(record)
    }

    async fn list_pending(&self) -> Result<Vec<VerificationRequest>, RegistrarError> {
        let state = self.state.lock();
        Ok(state
            .records
            .iter()
            .filter(|r| !r.is_verified)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<VerificationRequest, RegistrarError> {
        let state = self.state.lock();
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RegistrarError::NotFound(id))
    }

    async fn mark_verified(&self, id: i32) -> Result<VerificationRequest, RegistrarError> {
        let mut state = self.state.lock();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RegistrarError::NotFound(id))?;

        record.is_verified = true;
        Ok(record.clone())
    }
}


#[cfg(test)]
mod tests {
    use super::contract::{exercise_store, submission};
    use super::*;

    #[tokio::test]
    async fn memory_store_contract() {
        let store = MemoryStore::new();
        exercise_store(&store).await;
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn memory_ids_start_at_one() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        let first = store.create(submission("Ana", "ana@acme.org")).await.unwrap();
        assert_eq!(first.id, 1);
    }

    #[tokio::test]
    async fn memory_store_accepts_duplicate_emails() {
        let store = MemoryStore::new();
        store.create(submission("Ana", "ana@acme.org")).await.unwrap();
        store.create(submission("Ana", "ana@acme.org")).await.unwrap();
        assert_eq!(store.list_pending().await.unwrap().len(), 2);
    }
}
