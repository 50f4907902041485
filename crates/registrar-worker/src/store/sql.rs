//! Raw SQL for SQLite-dialect backends that have no ORM driver (D1 on Workers).
//!
//! Booleans are stored as 0/1 and come back as integers.

use sea_orm::FromQueryResult;
use serde::Deserialize;

use crate::VerificationRequest;

/// Same table as the SeaORM migration, for `wrangler d1 migrations apply`.
pub const SCHEMA: &str = include_str!("../../migrations/0001_verification_requests.sql");

/// Binds, in order: first_name, last_name, institution_name, institution_address, role,
/// email, created_at.
pub const INSERT: &str = "INSERT INTO verification_requests \
    (first_name, last_name, institution_name, institution_address, role, email, is_verified, created_at) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7) \
    RETURNING id, first_name, last_name, institution_name, institution_address, role, email, is_verified, created_at";

pub const SELECT_PENDING: &str = "SELECT id, first_name, last_name, institution_name, \
    institution_address, role, email, is_verified, created_at \
    FROM verification_requests WHERE is_verified = 0 ORDER BY id";

/// Binds: id.
pub const SELECT_BY_ID: &str = "SELECT id, first_name, last_name, institution_name, \
    institution_address, role, email, is_verified, created_at \
    FROM verification_requests WHERE id = ?1";

/// Binds: id. Returns no row when the id is unknown.
pub const MARK_VERIFIED: &str = "UPDATE verification_requests SET is_verified = 1 WHERE id = ?1 \
    RETURNING id, first_name, last_name, institution_name, institution_address, role, email, is_verified, created_at";

#[derive(Debug, Clone, Deserialize, FromQueryResult)]
pub struct SqlRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub institution_name: String,
    pub institution_address: String,
    pub role: String,
    pub email: String,
    pub is_verified: i64,
    pub created_at: i64,
}

impl From<SqlRow> for VerificationRequest {
    fn from(row: SqlRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            institution_name: row.institution_name,
            institution_address: row.institution_address,
            role: row.role,
            email: row.email,
            is_verified: row.is_verified != 0,
            created_at: row.created_at,
        }
    }
}
