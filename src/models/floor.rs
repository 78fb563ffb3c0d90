use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "floors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub hospital_id: i32,
    pub name: String,
    pub level: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ward::Entity")]
    Wards,
}

impl Related<super::ward::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
