pub mod error;
pub mod record;
pub mod types;

pub use error::NovelError;
pub use record::*;
pub use types::*;
