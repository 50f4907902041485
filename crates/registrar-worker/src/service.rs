use serde::Serialize;

use crate::error::{NotifyError, RegistrarError};
use crate::notify::{approval_email, Mailer};
use crate::store::VerificationStore;
use crate::submission::SubmitVerification;
use crate::VerificationRequest;

/// Review-queue projection of a pending request.
///
/// Omits the address, status and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSummary {
    pub id: i32,
    pub name: String,
    pub institution: String,
    pub role: String,
    pub email: String,
}

impl From<&VerificationRequest> for PendingSummary {
    fn from(r: &VerificationRequest) -> Self {
        Self {
            id: r.id,
            name: r.full_name(),
            institution: r.institution_name.clone(),
            role: r.role.clone(),
            email: r.email.clone(),
        }
    }
}

/// Result of an approval. The record is already persisted as verified regardless of
/// whether the notification went out.
#[derive(Debug)]
pub struct Approval {
    pub record: VerificationRequest,
    pub notification: Result<(), NotifyError>,
}

impl Approval {
    pub fn notified(&self) -> bool {
        self.notification.is_ok()
    }
}

pub struct VerificationService<S, M> {
    store: S,
    mailer: M,
    registration_url: String,
}

impl<S, M> VerificationService<S, M>
where
    S: VerificationStore,
    M: Mailer,
{
    pub fn new(store: S, mailer: M, registration_url: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            registration_url: registration_url.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Validates and persists a new request. Duplicate emails are accepted.
    pub async fn submit(
        &self,
        payload: SubmitVerification,
    ) -> Result<VerificationRequest, RegistrarError> {
        let request = payload.validate()?;
        let created = self.store.create(request).await?;
        tracing::info!(id = created.id, "verification request submitted");
        Ok(created)
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingSummary>, RegistrarError> {
        let pending = self.store.list_pending().await?;
        Ok(pending.iter().map(PendingSummary::from).collect())
    }

    /// Marks the request verified, then makes one notification attempt.
    ///
    /// The two steps are not atomic: a failed send is logged and reported in the
    /// returned [`Approval`], but the verified flag stays set. Concurrent approvals of the
    /// same id each send their own notification.
    pub async fn approve(&self, id: i32) -> Result<Approval, RegistrarError> {
        let record = self.store.get_by_id(id).await?;
        let record = self.store.mark_verified(record.id).await?;
        tracing::info!(id, "verification request approved");

        let email = approval_email(&record, &self.registration_url);
        let notification = self.mailer.send(&email).await;
        if let Err(e) = &notification {
            tracing::warn!(id, error = %e, "approval notification failed");
        }

        Ok(Approval {
            record,
            notification,
        })
    }
}
