pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod load;
pub mod plan;
pub mod records;
pub mod rows;
pub mod schema;
pub mod source;
pub mod store;
pub mod votes;

pub use error::{ConversionError, Error, Result};
pub use load::{load_all, LoadSummary, PLANS};
pub use source::{DirectoryProvider, RawFileProvider};
pub use store::Store;
