mod conflict;

use thiserror::Error;

pub use conflict::*;

use crate::{BookingId, BookingStatus, Date, RoomId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid date: {0}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid timespan: end date must be later than start date")]
    InvalidTimespan,

    #[error("check-in date {0} is in the past")]
    PastCheckIn(Date),

    #[error("invalid room: {0}")]
    InvalidRoom(String),

    #[error("invalid user: {0}")]
    InvalidUser(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("malformed record: {0}")]
    Parse(String),

    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("room unavailable: {0}")]
    RoomUnavailable(ReservationConflict),

    #[error("room {0} is inactive")]
    RoomInactive(RoomId),

    #[error("booking {0} belongs to another user")]
    NotOwner(BookingId),

    #[error("booking {id} is {actual}, expected {expected}")]
    WrongState {
        id: BookingId,
        expected: BookingStatus,
        actual: BookingStatus,
    },

    #[error("booking {id} checks in on {expected}, today is {actual}")]
    DateMismatch {
        id: BookingId,
        expected: Date,
        actual: Date,
    },

    #[error("user {0} is inactive")]
    UserInactive(String),

    #[error("user {0} is not a customer")]
    NotCustomer(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("room id {0} already exists")]
    DuplicateRoom(RoomId),

    #[error("user id {0} is already in use")]
    DuplicateUser(String),

    #[error("account {0} is protected")]
    ProtectedAccount(String),

    #[error("booking ledger is full ({0} bookings)")]
    LedgerFull(usize),

    #[error("no free booking id left")]
    IdSpaceExhausted,

    #[error("room catalog is full ({0} rooms)")]
    CatalogFull(usize),

    #[error("user directory is full ({0} users)")]
    DirectoryFull(usize),

    #[error("event log is full ({0} events)")]
    EventLogFull(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("changes kept in memory but not saved: {0}")]
    Unsaved(String),
}

/// Coarse classification of [`Error`], used by callers to decide how to
/// report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StateConflict,
    Capacity,
    Persistence,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDate(_)
            | Self::InvalidTimespan
            | Self::PastCheckIn(_)
            | Self::InvalidRoom(_)
            | Self::InvalidUser(_)
            | Self::InvalidQuery(_)
            | Self::Parse(_) => ErrorKind::Validation,
            Self::BookingNotFound(_) | Self::RoomNotFound(_) | Self::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::RoomUnavailable(_)
            | Self::RoomInactive(_)
            | Self::NotOwner(_)
            | Self::WrongState { .. }
            | Self::DateMismatch { .. }
            | Self::UserInactive(_)
            | Self::NotCustomer(_)
            | Self::PermissionDenied(_)
            | Self::DuplicateRoom(_)
            | Self::DuplicateUser(_)
            | Self::ProtectedAccount(_) => ErrorKind::StateConflict,
            Self::LedgerFull(_)
            | Self::IdSpaceExhausted
            | Self::CatalogFull(_)
            | Self::DirectoryFull(_)
            | Self::EventLogFull(_) => ErrorKind::Capacity,
            Self::Io(_) | Self::Unsaved(_) => ErrorKind::Persistence,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(v1), Self::Io(v2)) => v1.kind() == v2.kind(),
            (Self::InvalidDate(v1), Self::InvalidDate(v2)) => v1 == v2,
            (Self::InvalidTimespan, Self::InvalidTimespan) => true,
            (Self::PastCheckIn(v1), Self::PastCheckIn(v2)) => v1 == v2,
            (Self::InvalidRoom(v1), Self::InvalidRoom(v2)) => v1 == v2,
            (Self::InvalidUser(v1), Self::InvalidUser(v2)) => v1 == v2,
            (Self::InvalidQuery(v1), Self::InvalidQuery(v2)) => v1 == v2,
            (Self::Parse(v1), Self::Parse(v2)) => v1 == v2,
            (Self::BookingNotFound(v1), Self::BookingNotFound(v2)) => v1 == v2,
            (Self::RoomNotFound(v1), Self::RoomNotFound(v2)) => v1 == v2,
            (Self::UserNotFound(v1), Self::UserNotFound(v2)) => v1 == v2,
            (Self::RoomUnavailable(v1), Self::RoomUnavailable(v2)) => v1 == v2,
            (Self::RoomInactive(v1), Self::RoomInactive(v2)) => v1 == v2,
            (Self::NotOwner(v1), Self::NotOwner(v2)) => v1 == v2,
            (
                Self::WrongState {
                    id: i1,
                    expected: e1,
                    actual: a1,
                },
                Self::WrongState {
                    id: i2,
                    expected: e2,
                    actual: a2,
                },
            ) => i1 == i2 && e1 == e2 && a1 == a2,
            (
                Self::DateMismatch {
                    id: i1,
                    expected: e1,
                    actual: a1,
                },
                Self::DateMismatch {
                    id: i2,
                    expected: e2,
                    actual: a2,
                },
            ) => i1 == i2 && e1 == e2 && a1 == a2,
            (Self::UserInactive(v1), Self::UserInactive(v2)) => v1 == v2,
            (Self::NotCustomer(v1), Self::NotCustomer(v2)) => v1 == v2,
            (Self::PermissionDenied(v1), Self::PermissionDenied(v2)) => v1 == v2,
            (Self::DuplicateRoom(v1), Self::DuplicateRoom(v2)) => v1 == v2,
            (Self::DuplicateUser(v1), Self::DuplicateUser(v2)) => v1 == v2,
            (Self::ProtectedAccount(v1), Self::ProtectedAccount(v2)) => v1 == v2,
            (Self::LedgerFull(v1), Self::LedgerFull(v2)) => v1 == v2,
            (Self::IdSpaceExhausted, Self::IdSpaceExhausted) => true,
            (Self::CatalogFull(v1), Self::CatalogFull(v2)) => v1 == v2,
            (Self::DirectoryFull(v1), Self::DirectoryFull(v2)) => v1 == v2,
            (Self::EventLogFull(v1), Self::EventLogFull(v2)) => v1 == v2,
            (Self::Unsaved(v1), Self::Unsaved(v2)) => v1 == v2,
            _ => false,
        }
    }
}
