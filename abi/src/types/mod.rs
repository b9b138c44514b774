mod booking;
mod booking_query;
mod event;
mod room;
mod user;

use std::str::FromStr;

pub use booking::*;
pub use booking_query::*;
pub use event::*;
pub use room::*;
pub use user::*;

use crate::Error;

pub type BookingId = u32;
pub type RoomId = u32;
pub type UserId = String;

pub const MIN_BOOKING_ID: BookingId = 100;
pub const MAX_BOOKING_ID: BookingId = 999;
pub const MAX_BOOKINGS: usize = 200;
pub const MAX_ROOMS: usize = 50;
pub const MAX_USERS: usize = 100;
pub const MAX_EVENTS: usize = 500;
pub const MAX_AMENITIES: usize = 3;
/// Longest accepted name, id, password or amenity.
pub const MAX_FIELD_LEN: usize = 24;

/// One entity per line of a flat data file.
pub trait Record: Sized {
    fn to_line(&self) -> String;
    fn from_line(line: &str) -> Result<Self, Error>;
}

pub(crate) fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, Error> {
    let fields: Vec<&str> = line.trim_end().split(',').map(str::trim).collect();
    if fields.len() != expected {
        return Err(Error::Parse(line.to_string()));
    }
    Ok(fields)
}

pub(crate) fn parse_field<T: FromStr>(line: &str, field: &str) -> Result<T, Error> {
    field.parse().map_err(|_| Error::Parse(line.to_string()))
}

pub(crate) fn parse_flag(line: &str, field: &str) -> Result<bool, Error> {
    match field {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(Error::Parse(line.to_string())),
    }
}

pub(crate) fn flag(active: bool) -> u8 {
    u8::from(active)
}

pub(crate) fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
