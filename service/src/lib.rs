mod command;
mod reply;
mod service;

#[cfg(test)]
mod test_utils;

use abi::{Role, UserId};
use reservation::ReservationManager;

pub use command::{Command, USAGE};
pub use reply::Reply;

/// Role-checked command dispatch over a [`ReservationManager`].
pub struct HotelService {
    manager: ReservationManager,
}

/// Who is logged in at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
}
