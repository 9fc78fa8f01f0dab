pub mod error;
pub mod types;
pub mod value;

pub use error::{DmScriptError, ValidationError, ValidationWarning};
pub use types::*;
pub use value::*;
