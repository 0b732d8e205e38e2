use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Represents an investment opportunity (one product instance offered to
/// investors). Only the fields the backend flows need are modeled here;
/// presentation copy lives elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "opportunities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// URL-safe identifier, e.g. "rezidence-waltrovka".
    #[sea_orm(unique)]
    pub text_id: String,
    /// Czech title, shown in partner notifications.
    pub title: String,
    pub title_en: Option<String>,
    pub subtitle: Option<String>,
    /// ISO 4217 currency code the opportunity raises in, e.g. "CZK".
    pub currency: String,
    pub fundraising_target: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
