use std::sync::Arc;

use abi::{
    Booking, BookingId, BookingQuery, Clock, Config, DataConfig, Date, DateSpan, Error, Event,
    EventKind, NewRoom, NewUser, ReserveRequest, Room, RoomId, SystemClock, User,
};
use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

use crate::{
    Audit, BookingLedger, EventLog, FlatFile, ReservationManager, RoomAdmin, RoomCatalog,
    RoomSearch, Rsvp, UserAdmin, UserDirectory,
};

pub(crate) struct Hotel {
    ledger: BookingLedger,
    rooms: RoomCatalog,
    users: UserDirectory,
    events: EventLog,
    rng: StdRng,
    unsaved: bool,
}

pub(crate) struct DataFiles {
    users: FlatFile,
    rooms: FlatFile,
    bookings: FlatFile,
    events: FlatFile,
}

impl DataFiles {
    fn new(config: &DataConfig) -> Self {
        Self {
            users: FlatFile::new(config.users_path()),
            rooms: FlatFile::new(config.rooms_path()),
            bookings: FlatFile::new(config.bookings_path()),
            events: FlatFile::new(config.events_path()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Users,
    Rooms,
    Bookings,
    Events,
}

#[async_trait]
impl Rsvp for ReservationManager {
    async fn reserve(&self, req: ReserveRequest) -> Result<Booking, Error> {
        let today = self.clock.today();
        let mut guard = self.state.lock().await;
        let hotel = &mut *guard;
        let booking = hotel
            .ledger
            .reserve(&req, &today, &hotel.rooms, &mut hotel.rng)?;
        self.persist(hotel, Table::Bookings).await?;
        Ok(booking)
    }

    async fn cancel(&self, id: BookingId, user_id: &str) -> Result<Booking, Error> {
        let mut hotel = self.state.lock().await;
        let booking = hotel.ledger.cancel(id, user_id)?;
        self.persist(&mut hotel, Table::Bookings).await?;
        Ok(booking)
    }

    async fn check_in(&self, id: BookingId, user_id: &str) -> Result<Booking, Error> {
        let today = self.clock.today();
        let mut hotel = self.state.lock().await;
        let booking = hotel.ledger.check_in(id, user_id, &today)?;
        self.persist(&mut hotel, Table::Bookings).await?;
        Ok(booking)
    }

    async fn check_out(&self, id: BookingId, user_id: &str) -> Result<Booking, Error> {
        let mut hotel = self.state.lock().await;
        let booking = hotel.ledger.check_out(id, user_id)?;
        self.persist(&mut hotel, Table::Bookings).await?;
        Ok(booking)
    }

    async fn auto_cancel(&self) -> Result<Vec<BookingId>, Error> {
        let today = self.clock.today();
        let mut hotel = self.state.lock().await;
        let cancelled = hotel.ledger.auto_cancel_sweep(&today);
        if !cancelled.is_empty() {
            self.persist(&mut hotel, Table::Bookings).await?;
        }
        Ok(cancelled)
    }

    async fn get(&self, id: BookingId) -> Result<Booking, Error> {
        let hotel = self.state.lock().await;
        hotel
            .ledger
            .get(id)
            .cloned()
            .ok_or(Error::BookingNotFound(id))
    }

    async fn query(&self, query: BookingQuery) -> Result<Vec<Booking>, Error> {
        let hotel = self.state.lock().await;
        hotel.ledger.query(&query)
    }

    async fn is_available(&self, room_id: RoomId, span: DateSpan) -> Result<bool, Error> {
        let hotel = self.state.lock().await;
        let room = hotel
            .rooms
            .find_by_id(room_id)
            .ok_or(Error::RoomNotFound(room_id))?;
        Ok(room.active
            && hotel
                .ledger
                .check_availability(room_id, &span.start, &span.end))
    }

    async fn available_rooms(&self, span: DateSpan) -> Result<Vec<Room>, Error> {
        let hotel = self.state.lock().await;
        Ok(hotel
            .ledger
            .available_rooms(hotel.rooms.iter(), &span)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoomAdmin for ReservationManager {
    async fn add_room(&self, room: NewRoom) -> Result<Room, Error> {
        let mut hotel = self.state.lock().await;
        let room = hotel.rooms.add(room)?;
        self.persist(&mut hotel, Table::Rooms).await?;
        Ok(room)
    }

    async fn remove_room(&self, id: RoomId) -> Result<Room, Error> {
        let mut hotel = self.state.lock().await;
        let room = hotel.rooms.remove(id)?;
        self.persist(&mut hotel, Table::Rooms).await?;
        Ok(room)
    }

    async fn set_room_active(&self, id: RoomId, active: bool) -> Result<Room, Error> {
        let mut hotel = self.state.lock().await;
        let room = hotel.rooms.set_active(id, active)?;
        self.persist(&mut hotel, Table::Rooms).await?;
        Ok(room)
    }

    async fn set_room_rate(&self, id: RoomId, rate: f32) -> Result<Room, Error> {
        let mut hotel = self.state.lock().await;
        let room = hotel.rooms.set_rate(id, rate)?;
        self.persist(&mut hotel, Table::Rooms).await?;
        Ok(room)
    }

    async fn room(&self, id: RoomId) -> Result<Room, Error> {
        let hotel = self.state.lock().await;
        hotel
            .rooms
            .find_by_id(id)
            .cloned()
            .ok_or(Error::RoomNotFound(id))
    }

    async fn search_rooms(&self, search: RoomSearch) -> Result<Vec<Room>, Error> {
        let hotel = self.state.lock().await;
        Ok(hotel.rooms.search(&search).into_iter().cloned().collect())
    }
}

#[async_trait]
impl UserAdmin for ReservationManager {
    async fn authenticate(&self, id: &str, password: &str) -> Option<User> {
        let hotel = self.state.lock().await;
        hotel.users.authenticate(id, password).cloned()
    }

    async fn register(&self, user: NewUser) -> Result<User, Error> {
        let mut hotel = self.state.lock().await;
        let user = hotel.users.register(user)?;
        self.persist(&mut hotel, Table::Users).await?;
        Ok(user)
    }

    async fn remove_user(&self, id: &str) -> Result<User, Error> {
        let mut hotel = self.state.lock().await;
        let user = hotel.users.remove(id)?;
        self.persist(&mut hotel, Table::Users).await?;
        Ok(user)
    }

    async fn set_password(&self, id: &str, password: &str) -> Result<User, Error> {
        let mut hotel = self.state.lock().await;
        let user = hotel.users.set_password(id, password)?;
        self.persist(&mut hotel, Table::Users).await?;
        Ok(user)
    }

    async fn set_user_active(&self, id: &str, active: bool) -> Result<User, Error> {
        let mut hotel = self.state.lock().await;
        let user = hotel.users.set_active(id, active)?;
        self.persist(&mut hotel, Table::Users).await?;
        Ok(user)
    }

    async fn user(&self, id: &str) -> Result<User, Error> {
        let hotel = self.state.lock().await;
        hotel
            .users
            .find(id)
            .cloned()
            .ok_or_else(|| Error::UserNotFound(id.to_string()))
    }

    async fn active_customer(&self, id: &str) -> Result<User, Error> {
        let hotel = self.state.lock().await;
        hotel.users.active_customer(id).cloned()
    }
}

#[async_trait]
impl Audit for ReservationManager {
    async fn record(&self, user_id: &str, kind: EventKind) -> Result<Event, Error> {
        let now = self.clock.now();
        let mut hotel = self.state.lock().await;
        let event = hotel.events.record(user_id, kind, now)?;
        self.persist(&mut hotel, Table::Events).await?;
        Ok(event)
    }

    async fn events_by_user(&self, user_id: &str) -> Result<Vec<Event>, Error> {
        let hotel = self.state.lock().await;
        Ok(hotel.events.by_user(user_id))
    }

    async fn events_between(&self, start: &str, end: &str) -> Result<Vec<Event>, Error> {
        let hotel = self.state.lock().await;
        hotel.events.between(start, end)
    }
}

impl ReservationManager {
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        Self::open(config, Arc::new(SystemClock)).await
    }

    /// Load every data file, restore the administrator if needed and sweep
    /// overdue reservations, so availability answers are trustworthy from
    /// the first call.
    pub async fn open(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        fs::create_dir_all(config.data.dir()).await?;
        let files = DataFiles::new(&config.data);

        let mut users = UserDirectory::new(files.users.load().await);
        let rooms = RoomCatalog::new(files.rooms.load().await);
        let mut ledger = BookingLedger::new(files.bookings.load().await)
            .with_limits(config.ledger.id_retry_limit, config.ledger.max_bookings);
        let events = EventLog::new(files.events.load().await);

        if users.ensure_admin() {
            files.users.save(users.records()).await?;
        }
        let cancelled = ledger.auto_cancel_sweep(&clock.today());
        if !cancelled.is_empty() {
            files.bookings.save(ledger.records()).await?;
        }

        info!(
            "hotel opened with {} user(s), {} room(s), {} booking(s), {} event(s)",
            users.len(),
            rooms.len(),
            ledger.len(),
            events.len()
        );

        Ok(Self {
            state: Mutex::new(Hotel {
                ledger,
                rooms,
                users,
                events,
                rng: StdRng::from_entropy(),
                unsaved: false,
            }),
            files,
            clock,
        })
    }

    /// Make booking id generation reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.state.get_mut().rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Whether some change is only held in memory because a save failed.
    pub async fn is_unsaved(&self) -> bool {
        self.state.lock().await.unsaved
    }

    /// Rewrite every data file from memory.
    pub async fn flush(&self) -> Result<(), Error> {
        let mut hotel = self.state.lock().await;
        for table in [Table::Users, Table::Rooms, Table::Bookings, Table::Events] {
            self.save(&hotel, table).await?;
        }
        hotel.unsaved = false;
        info!("all data files flushed");
        Ok(())
    }

    async fn save(&self, hotel: &Hotel, table: Table) -> Result<(), Error> {
        match table {
            Table::Users => self.files.users.save(hotel.users.records()).await,
            Table::Rooms => self.files.rooms.save(hotel.rooms.records()).await,
            Table::Bookings => self.files.bookings.save(hotel.ledger.records()).await,
            Table::Events => self.files.events.save(hotel.events.records()).await,
        }
    }

    /// Save after a mutation. On failure the change stays in memory, the
    /// manager is marked unsaved and the caller gets [`Error::Unsaved`].
    async fn persist(&self, hotel: &mut Hotel, table: Table) -> Result<(), Error> {
        if let Err(e) = self.save(hotel, table).await {
            warn!("failed to save {:?}, change kept in memory only: {}", table, e);
            hotel.unsaved = true;
            return Err(Error::Unsaved(e.to_string()));
        }
        Ok(())
    }
}
