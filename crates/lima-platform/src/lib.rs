pub use error::{Error, Result};

pub mod arch;
pub mod dir;
mod error;
