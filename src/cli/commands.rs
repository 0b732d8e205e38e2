pub mod check_document;
pub mod initdb;
pub mod serve;

pub use check_document::check_document;
pub use initdb::init_database;
pub use serve::serve;
