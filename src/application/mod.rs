// Application layer - the ledger store and the derived views built on it.

pub mod error;
pub mod reporting;
pub mod store;

pub use error::*;
pub use reporting::*;
pub use store::*;
