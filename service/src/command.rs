use std::str::FromStr;

use abi::{
    BedType, BookingId, Date, DateSpan, Error, NewRoom, NewUser, Role, RoomId, RoomType,
};
use reservation::RoomSearch;

/// One line of terminal input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { id: String, password: String },
    Logout,
    Exit,
    Help,
    /// Active rooms free for the whole span.
    Available(DateSpan),
    Search(RoomSearch),
    /// `customer` is only given by staff booking on someone's behalf.
    Reserve {
        customer: Option<String>,
        room_id: RoomId,
        span: DateSpan,
    },
    Cancel {
        customer: Option<String>,
        id: BookingId,
    },
    CheckIn { id: BookingId, customer: String },
    CheckOut { id: BookingId, customer: String },
    /// One booking in full. Customers only see their own.
    ShowBooking(BookingId),
    Current,
    History,
    /// Bookings made between two dates, both inclusive, optionally for one
    /// room.
    Bookings {
        start: Date,
        end: Date,
        room_id: Option<RoomId>,
    },
    Sweep,
    AddUser(NewUser),
    RemoveUser(String),
    SetPassword { id: String, password: String },
    SetUserActive { id: String, active: bool },
    ShowUser(String),
    AddRoom(NewRoom),
    RemoveRoom(RoomId),
    SetRoomActive { id: RoomId, active: bool },
    SetRoomRate { id: RoomId, rate: f32 },
    ShowRoom(RoomId),
    EventsByUser(String),
    EventsBetween { start: String, end: String },
}

pub const USAGE: &str = "\
anyone:
  login <id> <password>
  available <start> <end>
  search type <standard|suite> | bed <single|double> | rate <min> <max>
  help | exit
customer:
  reserve <room> <check-in> <check-out>
  cancel <booking>
  booking <booking>
  current | history | logout
hotel staff:
  reserve <customer> <room> <check-in> <check-out>
  cancel <customer> <booking>
  checkin <booking> <customer> | checkout <booking> <customer>
  booking <booking>
  bookings <start> <end> [room]
  sweep | logout
administrator:
  user add <staff|customer> <id> <password> <name>
  user remove <id> | user password <id> <new> | user status <id> <active|inactive>
  user show <id>
  room add standard <id> <single|double> <size> <rate>
  room add suite <id> <single|double> <size> <rate> <amenity|amenity|...>
  room remove <id> | room status <id> <active|inactive> | room rate <id> <rate>
  room show <id>
  events user <id> | events between <start> <end>
  logout";

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (name, args) = match words.split_first() {
            Some((name, args)) => (name.to_ascii_lowercase(), args),
            None => return Err(usage("empty command")),
        };

        match (name.as_str(), args) {
            ("login", [id, password]) => Ok(Command::Login {
                id: id.to_string(),
                password: password.to_string(),
            }),
            ("logout", []) => Ok(Command::Logout),
            ("exit" | "quit", []) => Ok(Command::Exit),
            ("help", []) => Ok(Command::Help),
            ("available", [start, end]) => Ok(Command::Available(DateSpan::parse(start, end)?)),
            ("search", args) => parse_search(args),
            ("reserve", [room, check_in, check_out]) => Ok(Command::Reserve {
                customer: None,
                room_id: parse_num(room, "room id")?,
                span: DateSpan::parse(check_in, check_out)?,
            }),
            ("reserve", [customer, room, check_in, check_out]) => Ok(Command::Reserve {
                customer: Some(customer.to_string()),
                room_id: parse_num(room, "room id")?,
                span: DateSpan::parse(check_in, check_out)?,
            }),
            ("cancel", [id]) => Ok(Command::Cancel {
                customer: None,
                id: parse_num(id, "booking id")?,
            }),
            ("cancel", [customer, id]) => Ok(Command::Cancel {
                customer: Some(customer.to_string()),
                id: parse_num(id, "booking id")?,
            }),
            ("checkin", [id, customer]) => Ok(Command::CheckIn {
                id: parse_num(id, "booking id")?,
                customer: customer.to_string(),
            }),
            ("checkout", [id, customer]) => Ok(Command::CheckOut {
                id: parse_num(id, "booking id")?,
                customer: customer.to_string(),
            }),
            ("booking", [id]) => Ok(Command::ShowBooking(parse_num(id, "booking id")?)),
            ("current", []) => Ok(Command::Current),
            ("history", []) => Ok(Command::History),
            ("bookings", [start, end]) => Ok(Command::Bookings {
                start: start.parse()?,
                end: end.parse()?,
                room_id: None,
            }),
            ("bookings", [start, end, room]) => Ok(Command::Bookings {
                start: start.parse()?,
                end: end.parse()?,
                room_id: Some(parse_num(room, "room id")?),
            }),
            ("sweep", []) => Ok(Command::Sweep),
            ("user", args) => parse_user(line, args),
            ("room", args) => parse_room(line, args),
            ("events", args) => parse_events(args),
            (other, _) => Err(usage(&format!("unrecognised command '{}'", other))),
        }
    }
}

fn parse_search(args: &[&str]) -> Result<Command, Error> {
    let search = match args {
        ["type", kind] => RoomSearch::Type(kind.parse::<RoomType>()?),
        ["bed", bed] => RoomSearch::Bed(bed.parse::<BedType>()?),
        ["rate", min, max] => {
            let min: f32 = parse_num(min, "minimum rate")?;
            let max: f32 = parse_num(max, "maximum rate")?;
            if min > max {
                return Err(Error::InvalidQuery(format!(
                    "minimum rate {:.2} is above maximum rate {:.2}",
                    min, max
                )));
            }
            RoomSearch::Rate { min, max }
        }
        _ => return Err(usage("search type <kind> | bed <bed> | rate <min> <max>")),
    };
    Ok(Command::Search(search))
}

fn parse_user(line: &str, args: &[&str]) -> Result<Command, Error> {
    match args {
        ["add", role, id, password, name @ ..] if !name.is_empty() => {
            let role = role.parse::<Role>()?;
            Ok(Command::AddUser(NewUser::new(
                rest_after(line, 5),
                *id,
                *password,
                role,
            )))
        }
        ["remove", id] => Ok(Command::RemoveUser(id.to_string())),
        ["password", id, password] => Ok(Command::SetPassword {
            id: id.to_string(),
            password: password.to_string(),
        }),
        ["status", id, status] => Ok(Command::SetUserActive {
            id: id.to_string(),
            active: parse_status(status)?,
        }),
        ["show", id] => Ok(Command::ShowUser(id.to_string())),
        _ => Err(usage("user add|remove|password|status|show ...")),
    }
}

fn parse_room(line: &str, args: &[&str]) -> Result<Command, Error> {
    match args {
        ["add", kind, id, bed, size, rate, rest @ ..] => {
            let id = parse_num(id, "room id")?;
            let bed = bed.parse::<BedType>()?;
            let size = parse_num(size, "room size")?;
            let rate = parse_num(rate, "room rate")?;
            let room = match (kind.parse::<RoomType>()?, rest) {
                (RoomType::Standard, []) => NewRoom::standard(id, bed, size, rate),
                (RoomType::Suite, [_, ..]) => {
                    let amenities = rest_after(line, 7);
                    NewRoom::suite(id, bed, size, rate, amenities.split('|').map(str::trim))
                }
                (RoomType::Standard, _) => {
                    return Err(usage("standard rooms take no amenities"))
                }
                (RoomType::Suite, []) => {
                    return Err(usage("suites need amenities separated by '|'"))
                }
            };
            Ok(Command::AddRoom(room))
        }
        ["remove", id] => Ok(Command::RemoveRoom(parse_num(id, "room id")?)),
        ["status", id, status] => Ok(Command::SetRoomActive {
            id: parse_num(id, "room id")?,
            active: parse_status(status)?,
        }),
        ["rate", id, rate] => Ok(Command::SetRoomRate {
            id: parse_num(id, "room id")?,
            rate: parse_num(rate, "room rate")?,
        }),
        ["show", id] => Ok(Command::ShowRoom(parse_num(id, "room id")?)),
        _ => Err(usage("room add|remove|status|rate|show ...")),
    }
}

/// Bounds are either bare dates or `date time` pairs.
fn parse_events(args: &[&str]) -> Result<Command, Error> {
    match args {
        ["user", id] => Ok(Command::EventsByUser(id.to_string())),
        ["between", start, end] => Ok(Command::EventsBetween {
            start: start.to_string(),
            end: end.to_string(),
        }),
        ["between", start_date, start_time, end_date, end_time] => Ok(Command::EventsBetween {
            start: format!("{} {}", start_date, start_time),
            end: format!("{} {}", end_date, end_time),
        }),
        _ => Err(usage("events user <id> | events between <start> <end>")),
    }
}

fn parse_num<T: FromStr>(s: &str, what: &str) -> Result<T, Error> {
    s.parse()
        .map_err(|_| Error::InvalidQuery(format!("{} '{}' is not a number", what, s)))
}

fn parse_status(s: &str) -> Result<bool, Error> {
    match s.to_ascii_lowercase().as_str() {
        "active" | "1" => Ok(true),
        "inactive" | "0" => Ok(false),
        _ => Err(usage("status is 'active' or 'inactive'")),
    }
}

/// Everything after the first `n` words of `line`, with inner spacing kept.
fn rest_after(line: &str, n: usize) -> String {
    let mut rest = line.trim_start();
    for _ in 0..n {
        rest = rest
            .find(char::is_whitespace)
            .map_or("", |i| &rest[i..])
            .trim_start();
    }
    rest.trim_end().to_string()
}

fn usage(msg: &str) -> Error {
    Error::InvalidQuery(format!("{}, type 'help' for usage", msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn reserve_should_take_optional_customer() {
        let span = DateSpan::parse("2025-06-01", "2025-06-05").unwrap();
        assert_eq!(
            parse("reserve 101 2025-06-01 2025-06-05"),
            Command::Reserve {
                customer: None,
                room_id: 101,
                span: span.clone(),
            }
        );
        assert_eq!(
            parse("RESERVE bob 101 2025-06-01 2025-06-05"),
            Command::Reserve {
                customer: Some("bob".into()),
                room_id: 101,
                span,
            }
        );
    }

    #[test]
    fn reserve_should_reject_bad_dates() {
        assert_eq!(
            "reserve 101 2025-06-05 2025-06-01"
                .parse::<Command>()
                .unwrap_err(),
            Error::InvalidTimespan
        );
        assert_eq!(
            "reserve 101 2025-6-1 2025-06-05"
                .parse::<Command>()
                .unwrap_err(),
            Error::InvalidDate("2025-6-1".into())
        );
        assert!("reserve abc 2025-06-01 2025-06-05".parse::<Command>().is_err());
    }

    #[test]
    fn user_add_should_keep_full_name() {
        assert_eq!(
            parse("user add customer alice pw  Alice  Tan "),
            Command::AddUser(NewUser::new("Alice  Tan", "alice", "pw", Role::Customer))
        );
        assert!("user add customer alice pw".parse::<Command>().is_err());
        assert!("user add boss alice pw Alice".parse::<Command>().is_err());
    }

    #[test]
    fn room_add_should_split_amenities() {
        assert_eq!(
            parse("room add suite 150 double 30 800 Sea View|Jacuzzi"),
            Command::AddRoom(NewRoom::suite(
                150,
                BedType::Double,
                30.0,
                800.0,
                ["Sea View", "Jacuzzi"]
            ))
        );
        assert_eq!(
            parse("room add standard 101 single 16 120"),
            Command::AddRoom(NewRoom::standard(101, BedType::Single, 16.0, 120.0))
        );
        assert!("room add suite 150 double 30 800".parse::<Command>().is_err());
        assert!("room add standard 101 single 16 120 TV"
            .parse::<Command>()
            .is_err());
    }

    #[test]
    fn search_should_parse_each_kind() {
        assert_eq!(
            parse("search type suite"),
            Command::Search(RoomSearch::Type(RoomType::Suite))
        );
        assert_eq!(
            parse("search bed single"),
            Command::Search(RoomSearch::Bed(BedType::Single))
        );
        assert_eq!(
            parse("search rate 100 250.5"),
            Command::Search(RoomSearch::Rate {
                min: 100.0,
                max: 250.5
            })
        );
        assert!("search rate 300 100".parse::<Command>().is_err());
    }

    #[test]
    fn events_between_should_accept_times() {
        assert_eq!(
            parse("events between 2025-01-09 08:00:00 2025-01-10 23:59:59"),
            Command::EventsBetween {
                start: "2025-01-09 08:00:00".into(),
                end: "2025-01-10 23:59:59".into(),
            }
        );
        assert_eq!(
            parse("events between 2025-01-09 2025-01-10"),
            Command::EventsBetween {
                start: "2025-01-09".into(),
                end: "2025-01-10".into(),
            }
        );
    }

    #[test]
    fn status_should_accept_words_and_flags() {
        assert_eq!(
            parse("room status 101 inactive"),
            Command::SetRoomActive {
                id: 101,
                active: false
            }
        );
        assert_eq!(
            parse("user status bob 1"),
            Command::SetUserActive {
                id: "bob".into(),
                active: true
            }
        );
        assert!("user status bob maybe".parse::<Command>().is_err());
    }

    #[test]
    fn bookings_should_take_optional_room() {
        assert_eq!(
            parse("bookings 2025-05-01 2025-05-31 150"),
            Command::Bookings {
                start: "2025-05-01".parse().unwrap(),
                end: "2025-05-31".parse().unwrap(),
                room_id: Some(150),
            }
        );
        assert!(matches!(
            parse("bookings 2025-05-01 2025-05-31"),
            Command::Bookings { room_id: None, .. }
        ));
        assert_eq!(parse("booking 412"), Command::ShowBooking(412));
    }

    #[test]
    fn unknown_commands_should_fail() {
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
        assert!("cancel".parse::<Command>().is_err());
    }

    #[test]
    fn rest_after_should_skip_words() {
        assert_eq!(rest_after("  a b   c d ", 2), "c d");
        assert_eq!(rest_after("a b", 5), "");
    }
}
