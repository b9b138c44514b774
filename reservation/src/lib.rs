mod events;
mod ledger;
mod manager;
mod rooms;
mod store;
mod users;

use std::sync::Arc;

use abi::{
    Booking, BookingId, BookingQuery, Clock, DateSpan, Error, Event, EventKind, NewRoom, NewUser,
    ReserveRequest, Room, RoomId, User,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

pub use events::EventLog;
pub use ledger::BookingLedger;
pub use rooms::{RoomCatalog, RoomSearch};
pub use store::FlatFile;
pub use users::UserDirectory;

/// Owns the ledger, the catalogs and the audit trail, and writes each of
/// them back to its flat file after every change.
pub struct ReservationManager {
    state: Mutex<manager::Hotel>,
    files: manager::DataFiles,
    clock: Arc<dyn Clock>,
}

/// Read access to rooms by id.
pub trait RoomDirectory {
    fn get_room(&self, id: RoomId) -> Option<&Room>;
}

#[async_trait]
pub trait Rsvp {
    /// make a reservation
    async fn reserve(&self, req: ReserveRequest) -> Result<Booking, Error>;
    /// cancel a reserved booking owned by user_id
    async fn cancel(&self, id: BookingId, user_id: &str) -> Result<Booking, Error>;
    /// check in, only on the booked check-in date
    async fn check_in(&self, id: BookingId, user_id: &str) -> Result<Booking, Error>;
    /// check out a checked-in booking
    async fn check_out(&self, id: BookingId, user_id: &str) -> Result<Booking, Error>;
    /// cancel every reservation whose check-in date has passed
    async fn auto_cancel(&self) -> Result<Vec<BookingId>, Error>;
    /// get booking by id
    async fn get(&self, id: BookingId) -> Result<Booking, Error>;
    /// query bookings
    async fn query(&self, query: BookingQuery) -> Result<Vec<Booking>, Error>;
    /// whether a single room is free for the span
    async fn is_available(&self, room_id: RoomId, span: DateSpan) -> Result<bool, Error>;
    /// active rooms free for the whole span
    async fn available_rooms(&self, span: DateSpan) -> Result<Vec<Room>, Error>;
}

#[async_trait]
pub trait RoomAdmin {
    async fn add_room(&self, room: NewRoom) -> Result<Room, Error>;
    async fn remove_room(&self, id: RoomId) -> Result<Room, Error>;
    async fn set_room_active(&self, id: RoomId, active: bool) -> Result<Room, Error>;
    async fn set_room_rate(&self, id: RoomId, rate: f32) -> Result<Room, Error>;
    async fn room(&self, id: RoomId) -> Result<Room, Error>;
    async fn search_rooms(&self, search: RoomSearch) -> Result<Vec<Room>, Error>;
}

#[async_trait]
pub trait UserAdmin {
    async fn authenticate(&self, id: &str, password: &str) -> Option<User>;
    async fn register(&self, user: NewUser) -> Result<User, Error>;
    async fn remove_user(&self, id: &str) -> Result<User, Error>;
    async fn set_password(&self, id: &str, password: &str) -> Result<User, Error>;
    async fn set_user_active(&self, id: &str, active: bool) -> Result<User, Error>;
    async fn user(&self, id: &str) -> Result<User, Error>;
    async fn active_customer(&self, id: &str) -> Result<User, Error>;
}

#[async_trait]
pub trait Audit {
    /// append a login or logout stamped with the current time
    async fn record(&self, user_id: &str, kind: EventKind) -> Result<Event, Error>;
    async fn events_by_user(&self, user_id: &str) -> Result<Vec<Event>, Error>;
    async fn events_between(&self, start: &str, end: &str) -> Result<Vec<Event>, Error>;
}
