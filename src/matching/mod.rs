pub mod dates;
pub mod fuzzy;
pub mod resolver;

pub use resolver::RecordResolver;
