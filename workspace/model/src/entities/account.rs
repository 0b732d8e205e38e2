use sea_orm::entity::prelude::*;

/// Represents an investor account on the platform.
///
/// An account may be referred by a distribution partner, which is itself
/// just another account row (`distribution_partner_account_id` is a
/// self-referencing foreign key). Partner-less accounts take part in the
/// platform normally but are never included in partner payout summaries.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Contact email; nullable because corporate accounts created by back
    /// office may not have one yet.
    pub email: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    /// True for company accounts; `corporate_name` is then the legal name.
    #[sea_orm(default_value = "false")]
    pub is_corporate: bool,
    pub corporate_name: Option<String>,
    /// The distribution partner that referred this account, if any.
    pub distribution_partner_account_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Self-referencing relation to the referring distribution partner.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::DistributionPartnerAccountId",
        to = "Column::Id"
    )]
    DistributionPartner,
    /// Payments paid out to this account.
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Model {
    /// Display-name convention used in all partner-facing summaries:
    /// the corporate name for company accounts, otherwise "name surname".
    /// Missing parts degrade to whatever is available.
    pub fn display_name(&self) -> String {
        if self.is_corporate {
            if let Some(corporate_name) = &self.corporate_name {
                return corporate_name.clone();
            }
        }

        let parts: Vec<&str> = [self.name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        parts.join(" ")
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, surname: &str) -> Model {
        Model {
            id: 1,
            email: Some("a@example.com".to_string()),
            name: Some(name.to_string()),
            surname: Some(surname.to_string()),
            is_corporate: false,
            corporate_name: None,
            distribution_partner_account_id: None,
        }
    }

    #[test]
    fn test_display_name_person() {
        assert_eq!(person("Jan", "Novák").display_name(), "Jan Novák");
    }

    #[test]
    fn test_display_name_corporate() {
        let mut account = person("Jan", "Novák");
        account.is_corporate = true;
        account.corporate_name = Some("Novák Invest s.r.o.".to_string());
        assert_eq!(account.display_name(), "Novák Invest s.r.o.");
    }

    #[test]
    fn test_display_name_corporate_without_legal_name_falls_back() {
        let mut account = person("Jan", "Novák");
        account.is_corporate = true;
        assert_eq!(account.display_name(), "Jan Novák");
    }

    #[test]
    fn test_display_name_missing_surname() {
        let mut account = person("Jan", "Novák");
        account.surname = None;
        assert_eq!(account.display_name(), "Jan");
    }
}
