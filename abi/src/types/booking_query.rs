use derive_builder::Builder;

use crate::{Booking, BookingStatus, Date, Error, RoomId, UserId};

/// Read-only filter over the ledger. Unset fields match everything; an
/// empty status list matches every status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct BookingQuery {
    #[builder(setter(into, strip_option))]
    pub user_id: Option<UserId>,
    #[builder(setter(strip_option))]
    pub room_id: Option<RoomId>,
    #[builder(setter(each = "status"))]
    pub statuses: Vec<BookingStatus>,
    /// Inclusive lower bound on the booking date.
    #[builder(setter(strip_option))]
    pub booked_from: Option<Date>,
    /// Inclusive upper bound on the booking date.
    #[builder(setter(strip_option))]
    pub booked_to: Option<Date>,
}

impl BookingQuery {
    /// Reserved and checked-in bookings of one user.
    pub fn current_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            statuses: vec![BookingStatus::Reserved, BookingStatus::CheckedIn],
            ..Default::default()
        }
    }

    /// Cancelled and checked-out bookings of one user.
    pub fn history_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            statuses: vec![BookingStatus::Cancelled, BookingStatus::CheckedOut],
            ..Default::default()
        }
    }

    pub fn booked_between(start: Date, end: Date) -> Self {
        Self {
            booked_from: Some(start),
            booked_to: Some(end),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let (Some(from), Some(to)) = (&self.booked_from, &self.booked_to) {
            if from > to {
                return Err(Error::InvalidQuery(format!(
                    "start date {} is after end date {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, b: &Booking) -> bool {
        self.user_id.as_ref().map_or(true, |u| *u == b.user_id)
            && self.room_id.map_or(true, |r| r == b.room_id)
            && (self.statuses.is_empty() || self.statuses.contains(&b.status))
            && self
                .booked_from
                .as_ref()
                .map_or(true, |d| b.booking_date >= *d)
            && self.booked_to.as_ref().map_or(true, |d| b.booking_date <= *d)
    }
}
