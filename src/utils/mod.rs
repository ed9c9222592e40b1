pub mod error;

pub use error::{IdRejection, ReconcileError};
