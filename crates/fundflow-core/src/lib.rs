pub mod constants;
pub mod error;
pub mod types;
pub mod project;
pub mod feed;
pub mod collection;
pub mod action;

pub use constants::*;
pub use error::{ErrorKind, FundflowError, StateConflict, ValidationError};
pub use types::*;
pub use project::*;
pub use feed::*;
pub use collection::*;
pub use action::*;
