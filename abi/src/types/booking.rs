use std::{fmt, str::FromStr};

use super::{parse_field, split_fields, validate_user_id};
use crate::{BookingId, Date, Error, Record, RoomId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Reserved,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Reserved and checked-in bookings hold their room.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Reserved | Self::CheckedIn)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Reserved => write!(f, "Reserved"),
            BookingStatus::CheckedIn => write!(f, "Checked-In"),
            BookingStatus::CheckedOut => write!(f, "Checked-Out"),
            BookingStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Reserved" => Ok(Self::Reserved),
            "Checked-In" => Ok(Self::CheckedIn),
            "Checked-Out" => Ok(Self::CheckedOut),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(Error::Parse(format!("unknown booking status {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Display order, 1-based.
    pub seq: u32,
    pub id: BookingId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub status: BookingStatus,
    pub booking_date: Date,
    pub check_in: Date,
    pub check_out: Date,
}

impl Booking {
    pub fn new_reserved(id: BookingId, seq: u32, req: &ReserveRequest) -> Self {
        Self {
            seq,
            id,
            user_id: req.user_id.clone(),
            room_id: req.room_id,
            status: BookingStatus::Reserved,
            booking_date: req.booking_date.clone(),
            check_in: req.check_in.clone(),
            check_out: req.check_out.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether a stay of `[check_in, check_out)` would collide with this
    /// booking.
    ///
    /// A request may start on this booking's check-out date and may end on
    /// its check-in date, so same-day turnover is never a collision.
    pub fn overlaps(&self, check_in: &Date, check_out: &Date) -> bool {
        let enters = *check_in >= self.check_in && *check_in < self.check_out;
        let leaves = *check_out > self.check_in && *check_out <= self.check_out;
        let encloses = *check_in < self.check_in && *check_out > self.check_out;
        enters || leaves || encloses
    }
}

impl Record for Booking {
    fn to_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}, {}, {}",
            self.seq,
            self.id,
            self.user_id,
            self.room_id,
            self.status,
            self.booking_date,
            self.check_in,
            self.check_out
        )
    }

    fn from_line(line: &str) -> Result<Self, Error> {
        let f = split_fields(line, 8)?;
        let booking = Self {
            seq: parse_field(line, f[0])?,
            id: parse_field(line, f[1])?,
            user_id: f[2].to_string(),
            room_id: parse_field(line, f[3])?,
            status: f[4].parse()?,
            booking_date: f[5].parse()?,
            check_in: f[6].parse()?,
            check_out: f[7].parse()?,
        };
        if booking.user_id.is_empty() {
            return Err(Error::Parse(line.to_string()));
        }
        Ok(booking)
    }
}

/// Everything needed to ask the ledger for a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveRequest {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub booking_date: Date,
    pub check_in: Date,
    pub check_out: Date,
}

impl ReserveRequest {
    pub fn new(
        room_id: RoomId,
        user_id: impl Into<String>,
        booking_date: Date,
        check_in: Date,
        check_out: Date,
    ) -> Self {
        Self {
            room_id,
            user_id: user_id.into(),
            booking_date,
            check_in,
            check_out,
        }
    }

    /// The user id ends up in a comma-separated ledger line, so it obeys the
    /// same rules as a directory id.
    pub fn validate(&self) -> Result<(), Error> {
        validate_user_id(&self.user_id)?;
        if self.check_in >= self.check_out {
            return Err(Error::InvalidTimespan);
        }
        Ok(())
    }
}
