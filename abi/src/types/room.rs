use std::{fmt, str::FromStr};

use super::{flag, has_digit, is_blank, parse_field, parse_flag, split_fields};
use crate::{Error, Record, RoomId, MAX_AMENITIES, MAX_FIELD_LEN};

pub const MIN_ROOM_ID: RoomId = 101;
pub const MAX_ROOM_ID: RoomId = 151;
pub const MIN_ROOM_SIZE: f32 = 15.0;
pub const MAX_ROOM_SIZE: f32 = 35.0;
pub const MIN_ROOM_RATE: f32 = 100.0;
pub const MAX_ROOM_RATE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomType {
    Standard,
    Suite,
}

impl RoomType {
    fn code(self) -> u8 {
        match self {
            RoomType::Standard => 0,
            RoomType::Suite => 1,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomType::Standard => write!(f, "Standard"),
            RoomType::Suite => write!(f, "Suite"),
        }
    }
}

impl FromStr for RoomType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "0" => Ok(Self::Standard),
            "suite" | "1" => Ok(Self::Suite),
            other => Err(Error::InvalidRoom(format!("unknown room type {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BedType {
    Single,
    Double,
}

impl fmt::Display for BedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BedType::Single => write!(f, "Single"),
            BedType::Double => write!(f, "Double"),
        }
    }
}

impl FromStr for BedType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            other => Err(Error::InvalidRoom(format!("unknown bed type {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub seq: u32,
    pub id: RoomId,
    pub room_type: RoomType,
    pub bed: BedType,
    /// Square meters.
    pub size: f32,
    pub rate: f32,
    /// Only suites carry amenities.
    pub amenities: Vec<String>,
    pub active: bool,
}

impl Room {
    pub fn new(seq: u32, room: NewRoom) -> Self {
        Self {
            seq,
            id: room.id,
            room_type: room.room_type,
            bed: room.bed,
            size: room.size,
            rate: room.rate,
            amenities: room.amenities,
            active: true,
        }
    }
}

impl Record for Room {
    fn to_line(&self) -> String {
        match self.room_type {
            RoomType::Standard => format!(
                "{}, {}, {}, {}, {:.2}, {:.2}, {}",
                self.seq,
                self.id,
                self.room_type.code(),
                self.bed,
                self.rate,
                self.size,
                flag(self.active)
            ),
            RoomType::Suite => format!(
                "{}, {}, {}, {}, {:.2}, {:.2}, {}, {}",
                self.seq,
                self.id,
                self.room_type.code(),
                self.bed,
                self.rate,
                self.size,
                self.amenities.join("|"),
                flag(self.active)
            ),
        }
    }

    fn from_line(line: &str) -> Result<Self, Error> {
        let room_type: RoomType = line
            .split(',')
            .nth(2)
            .ok_or_else(|| Error::Parse(line.to_string()))?
            .parse()
            .map_err(|_| Error::Parse(line.to_string()))?;
        let f = match room_type {
            RoomType::Standard => split_fields(line, 7)?,
            RoomType::Suite => split_fields(line, 8)?,
        };
        let amenities = match room_type {
            RoomType::Standard => vec![],
            RoomType::Suite => f[6].split('|').map(|a| a.trim().to_string()).collect(),
        };
        Ok(Self {
            seq: parse_field(line, f[0])?,
            id: parse_field(line, f[1])?,
            room_type,
            bed: f[3].parse().map_err(|_| Error::Parse(line.to_string()))?,
            rate: parse_field(line, f[4])?,
            size: parse_field(line, f[5])?,
            amenities,
            active: parse_flag(line, f[f.len() - 1])?,
        })
    }
}

/// A room as submitted for addition to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub id: RoomId,
    pub room_type: RoomType,
    pub bed: BedType,
    pub size: f32,
    pub rate: f32,
    pub amenities: Vec<String>,
}

impl NewRoom {
    pub fn standard(id: RoomId, bed: BedType, size: f32, rate: f32) -> Self {
        Self {
            id,
            room_type: RoomType::Standard,
            bed,
            size,
            rate,
            amenities: vec![],
        }
    }

    pub fn suite(
        id: RoomId,
        bed: BedType,
        size: f32,
        rate: f32,
        amenities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id,
            room_type: RoomType::Suite,
            bed,
            size,
            rate,
            amenities: amenities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_room_id(self.id)?;
        if !(MIN_ROOM_SIZE..=MAX_ROOM_SIZE).contains(&self.size) {
            return Err(Error::InvalidRoom(format!(
                "size must be between {:.1} and {:.1} square meters",
                MIN_ROOM_SIZE, MAX_ROOM_SIZE
            )));
        }
        validate_rate(self.rate)?;
        match self.room_type {
            RoomType::Standard if !self.amenities.is_empty() => Err(Error::InvalidRoom(
                "standard rooms carry no amenities".into(),
            )),
            RoomType::Standard => Ok(()),
            RoomType::Suite => validate_amenities(&self.amenities),
        }
    }
}

pub fn validate_room_id(id: RoomId) -> Result<(), Error> {
    if !(MIN_ROOM_ID..=MAX_ROOM_ID).contains(&id) {
        return Err(Error::InvalidRoom(format!(
            "room id must be between {} and {}",
            MIN_ROOM_ID, MAX_ROOM_ID
        )));
    }
    Ok(())
}

pub fn validate_rate(rate: f32) -> Result<(), Error> {
    if !(MIN_ROOM_RATE..=MAX_ROOM_RATE).contains(&rate) {
        return Err(Error::InvalidRoom(format!(
            "rate must be between {:.1} and {:.1}",
            MIN_ROOM_RATE, MAX_ROOM_RATE
        )));
    }
    Ok(())
}

fn validate_amenities(amenities: &[String]) -> Result<(), Error> {
    if amenities.is_empty() || amenities.len() > MAX_AMENITIES {
        return Err(Error::InvalidRoom(format!(
            "a suite needs 1 to {} amenities",
            MAX_AMENITIES
        )));
    }
    for amenity in amenities {
        if is_blank(amenity) {
            return Err(Error::InvalidRoom("amenity cannot be empty".into()));
        }
        if amenity.contains(',') || amenity.contains('|') {
            return Err(Error::InvalidRoom(format!(
                "amenity {} cannot contain a comma",
                amenity
            )));
        }
        if has_digit(amenity) {
            return Err(Error::InvalidRoom(format!(
                "amenity {} cannot contain numeric characters",
                amenity
            )));
        }
        if amenity.chars().count() > MAX_FIELD_LEN {
            return Err(Error::InvalidRoom(format!(
                "amenity {} is longer than {} characters",
                amenity, MAX_FIELD_LEN
            )));
        }
    }
    Ok(())
}
