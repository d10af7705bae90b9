pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod resolver;

pub use error::CoreError;
