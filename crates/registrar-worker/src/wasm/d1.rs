use async_trait::async_trait;
use worker::wasm_bindgen::JsValue;
use worker::{D1Database, D1PreparedStatement, Env};

use crate::error::RegistrarError;
use crate::store::{now_ts, sql, VerificationStore};
use crate::submission::NewVerificationRequest;
use crate::VerificationRequest;

pub const D1_BINDING: &str = "DB";

fn db_err(e: worker::Error) -> RegistrarError {
    RegistrarError::Database(e.to_string())
}

/// D1-backed store; statements come from [`sql`].
pub struct D1Store {
    db: D1Database,
}

impl D1Store {
    pub fn from_env(env: &Env) -> worker::Result<Self> {
        Ok(Self {
            db: env.d1(D1_BINDING)?,
        })
    }

    fn statement(&self, query: &str, params: &[JsValue]) -> Result<D1PreparedStatement, RegistrarError> {
        self.db.prepare(query).bind(params).map_err(db_err)
    }

    async fn first(
        &self,
        query: &str,
        params: &[JsValue],
    ) -> Result<Option<VerificationRequest>, RegistrarError> {
        let row = self
            .statement(query, params)?
            .first::<sql::SqlRow>(None)
            .await
            .map_err(db_err)?;
        Ok(row.map(VerificationRequest::from))
    }
}

#[async_trait(?Send)]
impl VerificationStore for D1Store {
    async fn create(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RegistrarError> {
        let params = [
            JsValue::from(request.first_name),
            JsValue::from(request.last_name),
            JsValue::from(request.institution_name),
            JsValue::from(request.institution_address),
            JsValue::from(request.role),
            JsValue::from(request.email),
            // D1 numbers cross the JS boundary as f64; Unix seconds fit exactly.
            JsValue::from_f64(now_ts() as f64),
        ];

        self.first(sql::INSERT, &params)
            .await?
            .ok_or_else(|| RegistrarError::Database("insert returned no row".to_string()))
    }

    async fn list_pending(&self) -> Result<Vec<VerificationRequest>, RegistrarError> {
        let rows = self
            .statement(sql::SELECT_PENDING, &[])?
            .all()
            .await
            .map_err(db_err)?
            .results::<sql::SqlRow>()
            .map_err(db_err)?;
        Ok(rows.into_iter().map(VerificationRequest::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<VerificationRequest, RegistrarError> {
        self.first(sql::SELECT_BY_ID, &[JsValue::from(id)])
            .await?
            .ok_or(RegistrarError::NotFound(id))
    }

    async fn mark_verified(&self, id: i32) -> Result<VerificationRequest, RegistrarError> {
        self.first(sql::MARK_VERIFIED, &[JsValue::from(id)])
            .await?
            .ok_or(RegistrarError::NotFound(id))
    }
}
