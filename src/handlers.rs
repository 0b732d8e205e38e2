pub mod document_checks;
pub mod health;
pub mod payouts;
