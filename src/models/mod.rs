// Re-export all model types
pub use self::cafe::*;
pub use self::errors::*;

mod cafe;
mod errors;
