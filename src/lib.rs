pub mod models;
pub mod processing;
pub mod validation;
pub mod matching;
pub mod ledger;
pub mod report;
pub mod utils;
pub mod reconciler;

pub use reconciler::Reconciler;
