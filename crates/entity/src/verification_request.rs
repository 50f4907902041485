use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A registration vetting request submitted by a prospective user.
///
/// Rows are created by the submission endpoint and only ever mutated by approval,
/// which flips `is_verified` from `false` to `true`. Nothing deletes them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,

    pub last_name: String,

    pub institution_name: String,

    #[sea_orm(column_type = "Text")]
    pub institution_address: String,

    /// Free-form, e.g. "researcher" or "clinician".
    pub role: String,

    pub email: String,

    pub is_verified: bool,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// First and last name joined with a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
