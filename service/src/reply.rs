use std::fmt;

use abi::{Booking, BookingId, Event, Room, RoomType, User};

use crate::{command::USAGE, Session};

/// What a command produced, rendered as text for the terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Welcome(Session),
    Goodbye(String),
    Usage,
    Message(String),
    Reserved(Booking),
    Booking(Booking),
    Bookings(Vec<Booking>),
    Swept(Vec<BookingId>),
    Room(Room),
    Rooms(Vec<Room>),
    User(User),
    Events(Vec<Event>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Welcome(session) => write!(
                f,
                "Welcome {}, you are logged in as {}.",
                session.user_id, session.role
            ),
            Reply::Goodbye(user_id) => write!(f, "Goodbye {}.", user_id),
            Reply::Usage => f.write_str(USAGE),
            Reply::Message(msg) => f.write_str(msg),
            Reply::Reserved(b) => {
                writeln!(f, "Reservation made, your booking id is {}.", b.id)?;
                write_booking(f, b)
            }
            Reply::Booking(b) => write_booking(f, b),
            Reply::Bookings(bookings) if bookings.is_empty() => f.write_str("No bookings found."),
            Reply::Bookings(bookings) => {
                for (i, b) in bookings.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write_booking(f, b)?;
                }
                Ok(())
            }
            Reply::Swept(ids) if ids.is_empty() => f.write_str("No overdue reservations."),
            Reply::Swept(ids) => {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                write!(f, "Cancelled overdue reservations: {}", ids.join(", "))
            }
            Reply::Room(room) => write_room(f, room),
            Reply::Rooms(rooms) if rooms.is_empty() => f.write_str("No rooms found."),
            Reply::Rooms(rooms) => {
                for (i, room) in rooms.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write_room(f, room)?;
                }
                Ok(())
            }
            Reply::User(user) => {
                writeln!(f, "Name: {}", user.name)?;
                writeln!(f, "ID: {}", user.id)?;
                writeln!(f, "Role: {}", user.role)?;
                write!(f, "Status: {}", active_label(user.active))
            }
            Reply::Events(events) if events.is_empty() => f.write_str("No events found."),
            Reply::Events(events) => {
                for (i, e) in events.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{:>3}. {} {:<6} {}", e.seq, e.timestamp, e.kind, e.user_id)?;
                }
                Ok(())
            }
        }
    }
}

fn write_booking(f: &mut fmt::Formatter<'_>, b: &Booking) -> fmt::Result {
    writeln!(f, "Booking ID: {}", b.id)?;
    writeln!(f, "User ID: {}", b.user_id)?;
    writeln!(f, "Room ID: {}", b.room_id)?;
    writeln!(f, "Status: {}", b.status)?;
    writeln!(f, "Booking Date: {}", b.booking_date)?;
    writeln!(f, "Check-In Date: {}", b.check_in)?;
    write!(f, "Check-Out Date: {}", b.check_out)
}

fn write_room(f: &mut fmt::Formatter<'_>, room: &Room) -> fmt::Result {
    writeln!(f, "ID: {}", room.id)?;
    writeln!(f, "Type: {}", room.room_type)?;
    writeln!(f, "Bed type: {}", room.bed)?;
    writeln!(f, "Room size: {:.2}", room.size)?;
    if room.room_type == RoomType::Suite {
        writeln!(f, "Amenities: {}", room.amenities.join(", "))?;
    }
    writeln!(f, "Rate: {:.2} RM", room.rate)?;
    write!(f, "Status: {}", active_label(room.active))
}

fn active_label(active: bool) -> &'static str {
    if active {
        "Active"
    } else {
        "Inactive"
    }
}
