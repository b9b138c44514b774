mod config;
mod error;
mod types;
mod utils;

pub use config::*;
pub use error::{Error, ErrorKind, ReservationConflict, ReservationWindow};
pub use types::*;
pub use utils::*;
