pub mod entities;
pub mod ordering;
pub mod repositories;

pub use entities::*;
pub use opsboard_errors::{OpsboardError, OpsboardResult};
pub use ordering::*;
pub use repositories::*;
