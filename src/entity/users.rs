use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Transport-assigned user id, not autoincrement.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub is_admin: bool,
    pub is_banned: bool,
    pub is_approved: bool,
    pub added_at: DateTimeUtc,
    pub last_action_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::action_logs::Entity")]
    ActionLogs,
    #[sea_orm(has_many = "super::shift_reports::Entity")]
    ShiftReports,
}

impl Related<super::action_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionLogs.def()
    }
}

impl Related<super::shift_reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
