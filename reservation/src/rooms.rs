use abi::{validate_rate, BedType, Error, NewRoom, Room, RoomId, RoomType, MAX_ROOMS};
use tracing::info;

use crate::RoomDirectory;

/// Ways to narrow the catalog. Every search only returns active rooms.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomSearch {
    Type(RoomType),
    Bed(BedType),
    /// Inclusive on both ends.
    Rate { min: f32, max: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

impl RoomCatalog {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn records(&self) -> &[Room] {
        &self.rooms
    }

    pub fn find_by_id(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn list_active(&self) -> Vec<&Room> {
        self.rooms.iter().filter(|r| r.active).collect()
    }

    pub fn is_active(&self, id: RoomId) -> bool {
        self.find_by_id(id).map_or(false, |r| r.active)
    }

    pub fn add(&mut self, room: NewRoom) -> Result<Room, Error> {
        room.validate()?;
        if self.find_by_id(room.id).is_some() {
            return Err(Error::DuplicateRoom(room.id));
        }
        if self.rooms.len() >= MAX_ROOMS {
            return Err(Error::CatalogFull(MAX_ROOMS));
        }
        let room = Room::new(self.rooms.len() as u32 + 1, room);
        info!("room {} added as {} {}", room.id, room.bed, room.room_type);
        self.rooms.push(room.clone());
        Ok(room)
    }

    pub fn remove(&mut self, id: RoomId) -> Result<Room, Error> {
        let pos = self
            .rooms
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::RoomNotFound(id))?;
        let room = self.rooms.remove(pos);
        for (i, r) in self.rooms.iter_mut().enumerate() {
            r.seq = i as u32 + 1;
        }
        info!("room {} removed", id);
        Ok(room)
    }

    pub fn set_active(&mut self, id: RoomId, active: bool) -> Result<Room, Error> {
        let room = self.find_mut(id)?;
        room.active = active;
        info!("room {} is now {}", id, if active { "active" } else { "inactive" });
        Ok(room.clone())
    }

    pub fn set_rate(&mut self, id: RoomId, rate: f32) -> Result<Room, Error> {
        validate_rate(rate)?;
        let room = self.find_mut(id)?;
        room.rate = rate;
        info!("room {} rate set to {:.2}", id, rate);
        Ok(room.clone())
    }

    pub fn search(&self, search: &RoomSearch) -> Vec<&Room> {
        self.rooms
            .iter()
            .filter(|r| r.active)
            .filter(|r| match search {
                RoomSearch::Type(t) => r.room_type == *t,
                RoomSearch::Bed(b) => r.bed == *b,
                RoomSearch::Rate { min, max } => r.rate >= *min && r.rate <= *max,
            })
            .collect()
    }

    fn find_mut(&mut self, id: RoomId) -> Result<&mut Room, Error> {
        self.rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::RoomNotFound(id))
    }
}

impl RoomDirectory for RoomCatalog {
    fn get_room(&self, id: RoomId) -> Option<&Room> {
        self.find_by_id(id)
    }
}
