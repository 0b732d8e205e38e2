//! This file serves as the root for all SeaORM entity modules.
//! The data model covers the slice of the investment platform the backend
//! flows touch: investor accounts (with their distribution-partner
//! relation), opportunities, and executed payout payments.

pub mod account;
pub mod opportunity;
pub mod payment;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::opportunity::Entity as Opportunity;
    pub use super::payment::Entity as Payment;
}
