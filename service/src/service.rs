use abi::{
    BookingQuery, BookingQueryBuilder, Config, Error, EventKind, ReserveRequest, Role,
};
use reservation::{Audit, ReservationManager, RoomAdmin, Rsvp, UserAdmin};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::{Command, HotelService, Reply, Session};

impl HotelService {
    pub fn new(manager: ReservationManager) -> Self {
        Self { manager }
    }

    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(ReservationManager::from_config(config).await?))
    }

    pub fn manager(&self) -> &ReservationManager {
        &self.manager
    }

    /// Inactive accounts are turned away even with the right password.
    pub async fn login(&self, id: &str, password: &str) -> Result<Session, Error> {
        let user = self
            .manager
            .authenticate(id, password)
            .await
            .ok_or_else(|| Error::PermissionDenied("invalid user id or password".into()))?;
        if !user.active {
            return Err(Error::UserInactive(user.id));
        }
        self.audit(&user.id, EventKind::Login).await;
        info!("{} logged in as {}", user.id, user.role);
        Ok(Session {
            user_id: user.id,
            role: user.role,
        })
    }

    pub async fn logout(&self, session: &Session) -> Reply {
        self.audit(&session.user_id, EventKind::Logout).await;
        info!("{} logged out", session.user_id);
        Reply::Goodbye(session.user_id.clone())
    }

    /// Commands open to everyone, logged in or not.
    pub async fn execute_anonymous(&self, command: Command) -> Result<Reply, Error> {
        match command {
            Command::Help => Ok(Reply::Usage),
            Command::Available(span) => {
                if span.start < self.manager.today() {
                    return Err(Error::PastCheckIn(span.start));
                }
                Ok(Reply::Rooms(self.manager.available_rooms(span).await?))
            }
            Command::Search(search) => Ok(Reply::Rooms(self.manager.search_rooms(search).await?)),
            _ => Err(Error::PermissionDenied("please log in first".into())),
        }
    }

    pub async fn execute(&self, session: &Session, command: Command) -> Result<Reply, Error> {
        match command {
            command @ (Command::Help | Command::Available(_) | Command::Search(_)) => {
                self.execute_anonymous(command).await
            }
            Command::Login { .. } => Err(Error::PermissionDenied(format!(
                "already logged in as {}",
                session.user_id
            ))),
            Command::Logout | Command::Exit => Ok(self.logout(session).await),

            Command::Reserve {
                customer,
                room_id,
                span,
            } => {
                let user_id = self.acting_for(session, customer).await?;
                let req = ReserveRequest::new(
                    room_id,
                    user_id,
                    self.manager.today(),
                    span.start,
                    span.end,
                );
                Ok(Reply::Reserved(self.manager.reserve(req).await?))
            }
            Command::Cancel { customer, id } => {
                let user_id = self.acting_for(session, customer).await?;
                self.manager.cancel(id, &user_id).await?;
                Ok(Reply::Message(format!("Booking {} cancelled.", id)))
            }
            Command::CheckIn { id, customer } => {
                require(session, Role::HotelStaff, "check guests in")?;
                self.manager.check_in(id, &customer).await?;
                Ok(Reply::Message(format!(
                    "Check-in successful for booking {}.",
                    id
                )))
            }
            Command::CheckOut { id, customer } => {
                require(session, Role::HotelStaff, "check guests out")?;
                self.manager.check_out(id, &customer).await?;
                Ok(Reply::Message(format!(
                    "Check-out successful for booking {}.",
                    id
                )))
            }
            Command::ShowBooking(id) => {
                let booking = self.manager.get(id).await?;
                match session.role {
                    Role::Customer if booking.user_id != session.user_id => {
                        Err(Error::NotOwner(id))
                    }
                    Role::Customer | Role::HotelStaff => Ok(Reply::Booking(booking)),
                    Role::Administrator => Err(Error::PermissionDenied(
                        "administrators do not handle bookings".into(),
                    )),
                }
            }
            Command::Current => {
                require(session, Role::Customer, "list current bookings")?;
                let query = BookingQuery::current_for(session.user_id.as_str());
                Ok(Reply::Bookings(self.manager.query(query).await?))
            }
            Command::History => {
                require(session, Role::Customer, "list booking history")?;
                let query = BookingQuery::history_for(session.user_id.as_str());
                Ok(Reply::Bookings(self.manager.query(query).await?))
            }
            Command::Bookings {
                start,
                end,
                room_id,
            } => {
                require(session, Role::HotelStaff, "list bookings by date")?;
                let mut builder = BookingQueryBuilder::default();
                builder.booked_from(start).booked_to(end);
                if let Some(room_id) = room_id {
                    builder.room_id(room_id);
                }
                let query = builder
                    .build()
                    .map_err(|e| Error::InvalidQuery(e.to_string()))?;
                Ok(Reply::Bookings(self.manager.query(query).await?))
            }
            Command::Sweep => {
                require(session, Role::HotelStaff, "cancel overdue reservations")?;
                Ok(Reply::Swept(self.manager.auto_cancel().await?))
            }

            Command::AddUser(user) => {
                require(session, Role::Administrator, "register users")?;
                let user = self.manager.register(user).await?;
                Ok(Reply::Message(format!(
                    "User {} registered as {}.",
                    user.id, user.role
                )))
            }
            Command::RemoveUser(id) => {
                require(session, Role::Administrator, "remove users")?;
                self.manager.remove_user(&id).await?;
                Ok(Reply::Message(format!("User {} removed.", id)))
            }
            Command::SetPassword { id, password } => {
                require(session, Role::Administrator, "change passwords")?;
                self.manager.set_password(&id, &password).await?;
                Ok(Reply::Message(format!("Password updated for {}.", id)))
            }
            Command::SetUserActive { id, active } => {
                require(session, Role::Administrator, "change user status")?;
                Ok(Reply::User(self.manager.set_user_active(&id, active).await?))
            }
            Command::ShowUser(id) => {
                require(session, Role::Administrator, "look up users")?;
                Ok(Reply::User(self.manager.user(&id).await?))
            }
            Command::AddRoom(room) => {
                require(session, Role::Administrator, "add rooms")?;
                Ok(Reply::Room(self.manager.add_room(room).await?))
            }
            Command::RemoveRoom(id) => {
                require(session, Role::Administrator, "remove rooms")?;
                self.manager.remove_room(id).await?;
                Ok(Reply::Message(format!("Room {} removed.", id)))
            }
            Command::SetRoomActive { id, active } => {
                require(session, Role::Administrator, "change room status")?;
                Ok(Reply::Room(self.manager.set_room_active(id, active).await?))
            }
            Command::SetRoomRate { id, rate } => {
                require(session, Role::Administrator, "change room rates")?;
                Ok(Reply::Room(self.manager.set_room_rate(id, rate).await?))
            }
            Command::ShowRoom(id) => {
                require(session, Role::Administrator, "look up rooms")?;
                Ok(Reply::Room(self.manager.room(id).await?))
            }
            Command::EventsByUser(id) => {
                require(session, Role::Administrator, "read the event log")?;
                Ok(Reply::Events(self.manager.events_by_user(&id).await?))
            }
            Command::EventsBetween { start, end } => {
                require(session, Role::Administrator, "read the event log")?;
                Ok(Reply::Events(self.manager.events_between(&start, &end).await?))
            }
        }
    }

    /// Read commands line by line until `exit` or end of input, writing one
    /// reply per command.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<(), Error>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut session: Option<Session> = None;
        let mut lines = input.lines();

        output.write_all(b"Hotel booking system. Type 'help' for commands.\n").await?;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let result = match line.parse::<Command>() {
                Err(e) => Err(e),
                Ok(Command::Exit) => break,
                Ok(Command::Login { id, password }) => {
                    match session.as_ref().map(|s| s.user_id.clone()) {
                        Some(current) => Err(Error::PermissionDenied(format!(
                            "already logged in as {}",
                            current
                        ))),
                        None => self.login(&id, &password).await.map(|s| {
                            session = Some(s.clone());
                            Reply::Welcome(s)
                        }),
                    }
                }
                Ok(Command::Logout) => match session.take() {
                    Some(s) => Ok(self.logout(&s).await),
                    None => Err(Error::PermissionDenied("not logged in".into())),
                },
                Ok(command) => match &session {
                    Some(s) => self.execute(s, command).await,
                    None => self.execute_anonymous(command).await,
                },
            };

            let text = match result {
                Ok(reply) => format!("{}\n", reply),
                Err(e) => format!("Error: {}\n", e),
            };
            output.write_all(text.as_bytes()).await?;
        }

        if let Some(s) = session.take() {
            let reply = self.logout(&s).await;
            output.write_all(format!("{}\n", reply).as_bytes()).await?;
        }
        output.flush().await?;
        Ok(())
    }

    /// The customer a booking command acts for: customers act for
    /// themselves, staff must name an active customer.
    async fn acting_for(&self, session: &Session, customer: Option<String>) -> Result<String, Error> {
        match (session.role, customer) {
            (Role::Customer, None) => Ok(session.user_id.clone()),
            (Role::Customer, Some(_)) => Err(Error::PermissionDenied(
                "customers can only book for themselves".into(),
            )),
            (Role::HotelStaff, Some(customer)) => {
                Ok(self.manager.active_customer(&customer).await?.id)
            }
            (Role::HotelStaff, None) => Err(Error::InvalidQuery(
                "name the customer you are booking for".into(),
            )),
            (Role::Administrator, _) => Err(Error::PermissionDenied(
                "administrators do not handle bookings".into(),
            )),
        }
    }

    /// A failed audit write never blocks a login or logout.
    async fn audit(&self, user_id: &str, kind: EventKind) {
        if let Err(e) = self.manager.record(user_id, kind).await {
            warn!("failed to record {} for {}: {}", kind, user_id, e);
        }
    }
}

fn require(session: &Session, role: Role, action: &str) -> Result<(), Error> {
    if session.role != role {
        return Err(Error::PermissionDenied(format!(
            "{} cannot {}",
            session.role, action
        )));
    }
    Ok(())
}
