use std::fmt;

use crate::{Booking, BookingId, Date, RoomId};

/// Both sides of a rejected reservation: the window that was asked for and
/// the live booking it collides with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationConflict {
    pub new: ReservationWindow,
    pub old: ReservationWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationWindow {
    /// `None` for a window that has not been booked yet.
    pub booking_id: Option<BookingId>,
    pub room_id: RoomId,
    pub check_in: Date,
    pub check_out: Date,
}

impl ReservationWindow {
    pub fn requested(room_id: RoomId, check_in: Date, check_out: Date) -> Self {
        Self {
            booking_id: None,
            room_id,
            check_in,
            check_out,
        }
    }
}

impl From<&Booking> for ReservationWindow {
    fn from(b: &Booking) -> Self {
        Self {
            booking_id: Some(b.id),
            room_id: b.room_id,
            check_in: b.check_in.clone(),
            check_out: b.check_out.clone(),
        }
    }
}

impl fmt::Display for ReservationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.booking_id {
            Some(id) => write!(
                f,
                "booking {} on room {} [{}, {})",
                id, self.room_id, self.check_in, self.check_out
            ),
            None => write!(
                f,
                "room {} [{}, {})",
                self.room_id, self.check_in, self.check_out
            ),
        }
    }
}

impl fmt::Display for ReservationConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} conflicts with {}", self.new, self.old)
    }
}
