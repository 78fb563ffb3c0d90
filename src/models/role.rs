use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An on-call role (physician on-call, supervisor, CEO, ...). The
/// `escalation_chain` column holds the role's notification ladder as a JSON
/// array of `{ target_role_id, delay_minutes }` steps, in notification order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub hospital_id: i32,
    pub name: String,
    #[sea_orm(default_value = "[]")]
    pub escalation_chain: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::staff::Entity")]
    Staff,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
