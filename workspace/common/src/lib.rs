//! Shared plain types used across the platform backend: supported
//! currencies, locales, and the locale-aware money formatter. Keeping them
//! here lets the service and the notification crate agree on wire shapes
//! without duplicating them.

mod currency;
mod format;

pub use currency::{Currency, Locale, UnsupportedCurrency};
pub use format::{Amount, format_amount};
