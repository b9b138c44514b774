use std::collections::HashSet;

use abi::{
    Booking, BookingId, BookingQuery, BookingStatus, Date, DateSpan, Error, ReservationConflict,
    ReservationWindow, ReserveRequest, Room, RoomId, MAX_BOOKINGS, MAX_BOOKING_ID,
    MIN_BOOKING_ID,
};
use rand::Rng;
use tracing::{debug, info};

use crate::RoomDirectory;

const ID_SPACE: usize = (MAX_BOOKING_ID - MIN_BOOKING_ID + 1) as usize;

/// The authoritative, ordered collection of bookings.
///
/// Records are kept in creation order and are never removed: cancelled and
/// checked-out bookings stay as history and keep their ids reserved.
#[derive(Debug, Clone)]
pub struct BookingLedger {
    bookings: Vec<Booking>,
    id_retry_limit: usize,
    max_bookings: usize,
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl BookingLedger {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self {
            bookings,
            id_retry_limit: 10_000,
            max_bookings: MAX_BOOKINGS,
        }
    }

    pub fn with_limits(mut self, id_retry_limit: usize, max_bookings: usize) -> Self {
        self.id_retry_limit = id_retry_limit;
        self.max_bookings = max_bookings;
        self
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn records(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// First live booking on `room_id` that a stay of
    /// `[check_in, check_out)` would collide with.
    pub fn find_conflict(
        &self,
        room_id: RoomId,
        check_in: &Date,
        check_out: &Date,
    ) -> Option<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.room_id == room_id && b.is_active())
            .find(|b| b.overlaps(check_in, check_out))
    }

    pub fn check_availability(&self, room_id: RoomId, check_in: &Date, check_out: &Date) -> bool {
        self.find_conflict(room_id, check_in, check_out).is_none()
    }

    /// Draw a booking id in `[100, 999]` that no booking, in any status,
    /// has ever used.
    pub fn generate_unique_id<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BookingId, Error> {
        let taken: HashSet<BookingId> = self.bookings.iter().map(|b| b.id).collect();
        if taken.len() >= ID_SPACE {
            return Err(Error::IdSpaceExhausted);
        }
        for _ in 0..self.id_retry_limit {
            let id = rng.gen_range(MIN_BOOKING_ID..=MAX_BOOKING_ID);
            if !taken.contains(&id) {
                return Ok(id);
            }
        }
        Err(Error::IdSpaceExhausted)
    }

    pub fn reserve<R: Rng + ?Sized>(
        &mut self,
        req: &ReserveRequest,
        today: &Date,
        rooms: &impl RoomDirectory,
        rng: &mut R,
    ) -> Result<Booking, Error> {
        req.validate()?;
        if req.check_in < *today {
            return Err(Error::PastCheckIn(req.check_in.clone()));
        }

        let room = rooms
            .get_room(req.room_id)
            .ok_or(Error::RoomNotFound(req.room_id))?;
        if !room.active {
            return Err(Error::RoomInactive(room.id));
        }

        if let Some(old) = self.find_conflict(req.room_id, &req.check_in, &req.check_out) {
            return Err(Error::RoomUnavailable(ReservationConflict {
                new: ReservationWindow::requested(
                    req.room_id,
                    req.check_in.clone(),
                    req.check_out.clone(),
                ),
                old: old.into(),
            }));
        }

        if self.bookings.len() >= self.max_bookings {
            return Err(Error::LedgerFull(self.max_bookings));
        }
        let id = self.generate_unique_id(rng)?;
        let booking = Booking::new_reserved(id, self.bookings.len() as u32 + 1, req);
        self.bookings.push(booking.clone());
        self.renumber();

        info!(
            "booking {} reserved room {} for {} [{}, {})",
            id, req.room_id, req.user_id, req.check_in, req.check_out
        );
        Ok(booking)
    }

    /// Cancel a reserved booking on behalf of its owner. The record stays in
    /// the ledger and keeps its sequence number.
    pub fn cancel(&mut self, id: BookingId, user_id: &str) -> Result<Booking, Error> {
        let booking = self.owned_in_state(id, user_id, BookingStatus::Reserved)?;
        booking.status = BookingStatus::Cancelled;
        info!("booking {} cancelled by {}", id, user_id);
        Ok(booking.clone())
    }

    /// Cancel every reservation whose check-in date has already passed.
    pub fn auto_cancel_sweep(&mut self, today: &Date) -> Vec<BookingId> {
        let mut cancelled = vec![];
        for b in self
            .bookings
            .iter_mut()
            .filter(|b| b.status == BookingStatus::Reserved && b.check_in < *today)
        {
            b.status = BookingStatus::Cancelled;
            cancelled.push(b.id);
        }
        if !cancelled.is_empty() {
            info!(
                "auto-cancelled {} overdue reservation(s) before {}: {:?}",
                cancelled.len(),
                today,
                cancelled
            );
        }
        cancelled
    }

    /// Check in on the booked date only; arriving early or late is refused.
    pub fn check_in(&mut self, id: BookingId, user_id: &str, today: &Date) -> Result<Booking, Error> {
        let booking = self.owned_in_state(id, user_id, BookingStatus::Reserved)?;
        if booking.check_in != *today {
            return Err(Error::DateMismatch {
                id,
                expected: booking.check_in.clone(),
                actual: today.clone(),
            });
        }
        booking.status = BookingStatus::CheckedIn;
        info!("booking {} checked in", id);
        Ok(booking.clone())
    }

    pub fn check_out(&mut self, id: BookingId, user_id: &str) -> Result<Booking, Error> {
        let booking = self.owned_in_state(id, user_id, BookingStatus::CheckedIn)?;
        booking.status = BookingStatus::CheckedOut;
        info!("booking {} checked out", id);
        Ok(booking.clone())
    }

    pub fn query(&self, query: &BookingQuery) -> Result<Vec<Booking>, Error> {
        query.validate()?;
        let found: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        debug!("query {:?} matched {} booking(s)", query, found.len());
        Ok(found)
    }

    pub fn current_for(&self, user_id: &str) -> Vec<Booking> {
        self.filtered(&BookingQuery::current_for(user_id))
    }

    pub fn history_for(&self, user_id: &str) -> Vec<Booking> {
        self.filtered(&BookingQuery::history_for(user_id))
    }

    /// Bookings made between `start` and `end`, both inclusive.
    pub fn booked_between(&self, start: &Date, end: &Date) -> Vec<Booking> {
        self.filtered(&BookingQuery::booked_between(start.clone(), end.clone()))
    }

    /// Active rooms free for the whole span.
    pub fn available_rooms<'a>(
        &self,
        rooms: impl IntoIterator<Item = &'a Room>,
        span: &DateSpan,
    ) -> Vec<&'a Room> {
        rooms
            .into_iter()
            .filter(|r| r.active && self.check_availability(r.id, &span.start, &span.end))
            .collect()
    }

    fn filtered(&self, query: &BookingQuery) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| query.matches(b))
            .cloned()
            .collect()
    }

    fn renumber(&mut self) {
        for (i, b) in self.bookings.iter_mut().enumerate() {
            b.seq = i as u32 + 1;
        }
    }

    fn owned_in_state(
        &mut self,
        id: BookingId,
        user_id: &str,
        expected: BookingStatus,
    ) -> Result<&mut Booking, Error> {
        let booking = self
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(Error::BookingNotFound(id))?;
        if booking.status != expected {
            return Err(Error::WrongState {
                id,
                expected,
                actual: booking.status,
            });
        }
        if booking.user_id != user_id {
            return Err(Error::NotOwner(id));
        }
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::{BedType, NewRoom, Record};
    use rand::{rngs::StdRng, SeedableRng};

    use crate::RoomCatalog;

    const TODAY: &str = "2025-05-20";

    fn d(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn catalog() -> RoomCatalog {
        let mut rooms = RoomCatalog::default();
        rooms
            .add(NewRoom::standard(101, BedType::Double, 20.0, 200.0))
            .unwrap();
        rooms
            .add(NewRoom::suite(150, BedType::Single, 30.0, 800.0, ["Sea View"]))
            .unwrap();
        rooms
    }

    fn request(room: RoomId, user: &str, check_in: &str, check_out: &str) -> ReserveRequest {
        ReserveRequest::new(room, user, d(TODAY), d(check_in), d(check_out))
    }

    fn reserve(
        ledger: &mut BookingLedger,
        room: RoomId,
        user: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<Booking, Error> {
        let mut rng = StdRng::seed_from_u64(7);
        ledger.reserve(
            &request(room, user, check_in, check_out),
            &d(TODAY),
            &catalog(),
            &mut rng,
        )
    }

    fn reserve_with(
        ledger: &mut BookingLedger,
        rooms: &RoomCatalog,
        rng: &mut StdRng,
        check_in: &str,
        check_out: &str,
    ) -> Result<Booking, Error> {
        ledger.reserve(
            &request(101, "tyr", check_in, check_out),
            &d(TODAY),
            rooms,
            rng,
        )
    }

    #[test]
    fn reserve_should_work_for_valid_window() {
        let mut ledger = BookingLedger::default();
        let b = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        assert!((MIN_BOOKING_ID..=MAX_BOOKING_ID).contains(&b.id));
        assert_eq!(b.seq, 1);
        assert_eq!(b.status, BookingStatus::Reserved);
        assert_eq!(b.booking_date, d(TODAY));
        assert_eq!(ledger.get(b.id), Some(&b));
    }

    #[test]
    fn reserve_conflict_reservation_should_reject() {
        let mut ledger = BookingLedger::default();
        let old = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        let err = reserve(&mut ledger, 101, "alice", "2025-06-04", "2025-06-06").unwrap_err();
        assert_eq!(
            err,
            Error::RoomUnavailable(ReservationConflict {
                new: ReservationWindow::requested(101, d("2025-06-04"), d("2025-06-06")),
                old: (&old).into(),
            })
        );
    }

    #[test]
    fn reserve_should_allow_turnover_on_both_sides() {
        let mut ledger = BookingLedger::default();
        let mut rng = StdRng::seed_from_u64(1);
        let rooms = catalog();
        reserve_with(&mut ledger, &rooms, &mut rng, "2025-06-01", "2025-06-05").unwrap();
        reserve_with(&mut ledger, &rooms, &mut rng, "2025-06-05", "2025-06-08").unwrap();
        reserve_with(&mut ledger, &rooms, &mut rng, "2025-05-30", "2025-06-01").unwrap();
        assert_eq!(ledger.len(), 3);
        assert!(reserve_with(&mut ledger, &rooms, &mut rng, "2025-06-07", "2025-06-09").is_err());
    }

    #[test]
    fn reserve_should_reject_enclosing_stay() {
        let mut ledger = BookingLedger::default();
        reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        let err = reserve(&mut ledger, 101, "alice", "2025-05-25", "2025-06-10").unwrap_err();
        assert!(matches!(err, Error::RoomUnavailable(_)));
    }

    #[test]
    fn reserve_should_ignore_other_rooms_and_dead_bookings() {
        let mut ledger = BookingLedger::default();
        let b = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        reserve(&mut ledger, 150, "tyr", "2025-06-01", "2025-06-05").unwrap();
        ledger.cancel(b.id, "tyr").unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        ledger
            .reserve(
                &request(101, "alice", "2025-06-02", "2025-06-04"),
                &d(TODAY),
                &catalog(),
                &mut rng,
            )
            .unwrap();
    }

    #[test]
    fn reserve_should_validate_dates() {
        let mut ledger = BookingLedger::default();
        assert_eq!(
            reserve(&mut ledger, 101, "tyr", "2025-06-05", "2025-06-05").unwrap_err(),
            Error::InvalidTimespan
        );
        assert_eq!(
            reserve(&mut ledger, 101, "tyr", "2025-05-19", "2025-06-05").unwrap_err(),
            Error::PastCheckIn(d("2025-05-19"))
        );
        assert!(reserve(&mut ledger, 101, "tyr", TODAY, "2025-05-21").is_ok());
    }

    #[test]
    fn reserve_should_reject_user_ids_unfit_for_the_ledger_file() {
        let mut ledger = BookingLedger::default();
        for user in ["eve, x", " eve", "eve "] {
            assert!(matches!(
                reserve(&mut ledger, 101, user, "2025-06-01", "2025-06-05"),
                Err(Error::InvalidUser(_))
            ));
        }
        assert!(ledger.is_empty());
        let b = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        let reloaded = Booking::from_line(&b.to_line()).unwrap();
        assert_eq!(reloaded, b);
    }

    #[test]
    fn reserve_should_reject_missing_or_inactive_room() {
        let mut ledger = BookingLedger::default();
        let mut rooms = catalog();
        rooms.set_active(150, false).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let err = ledger
            .reserve(
                &request(150, "tyr", "2025-06-01", "2025-06-02"),
                &d(TODAY),
                &rooms,
                &mut rng,
            )
            .unwrap_err();
        assert_eq!(err, Error::RoomInactive(150));
        let err = ledger
            .reserve(
                &request(120, "tyr", "2025-06-01", "2025-06-02"),
                &d(TODAY),
                &rooms,
                &mut rng,
            )
            .unwrap_err();
        assert_eq!(err, Error::RoomNotFound(120));
        assert!(ledger.is_empty());
    }

    #[test]
    fn reserve_should_stop_at_capacity() {
        let mut ledger = BookingLedger::default().with_limits(10_000, 1);
        reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-02").unwrap();
        assert_eq!(
            reserve(&mut ledger, 150, "tyr", "2025-06-01", "2025-06-02").unwrap_err(),
            Error::LedgerFull(1)
        );
    }

    #[test]
    fn generate_unique_id_should_skip_taken_ids() {
        // every id but 555 is taken, in every status
        let statuses = [
            BookingStatus::Reserved,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
        ];
        let bookings = (MIN_BOOKING_ID..=MAX_BOOKING_ID)
            .filter(|id| *id != 555)
            .enumerate()
            .map(|(i, id)| Booking {
                seq: i as u32 + 1,
                id,
                user_id: "u".into(),
                room_id: 101,
                status: statuses[i % statuses.len()],
                booking_date: d("2025-01-01"),
                check_in: d("2025-01-02"),
                check_out: d("2025-01-03"),
            })
            .collect();
        let ledger = BookingLedger::new(bookings).with_limits(1_000_000, 2000);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(ledger.generate_unique_id(&mut rng).unwrap(), 555);
    }

    #[test]
    fn generate_unique_id_should_fail_when_exhausted() {
        let bookings = (MIN_BOOKING_ID..=MAX_BOOKING_ID)
            .map(|id| Booking {
                seq: 1,
                id,
                user_id: "u".into(),
                room_id: 101,
                status: BookingStatus::Cancelled,
                booking_date: d("2025-01-01"),
                check_in: d("2025-01-02"),
                check_out: d("2025-01-03"),
            })
            .collect();
        let ledger = BookingLedger::new(bookings);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            ledger.generate_unique_id(&mut rng).unwrap_err(),
            Error::IdSpaceExhausted
        );
    }

    #[test]
    fn generated_ids_should_never_repeat() {
        let mut ledger = BookingLedger::default().with_limits(10_000, 1000);
        let mut rooms = RoomCatalog::default();
        rooms
            .add(NewRoom::standard(101, BedType::Single, 20.0, 200.0))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let days: Vec<Date> = (1..=12)
            .flat_map(|m| (1..=28).map(move |day| d(&format!("2026-{:02}-{:02}", m, day))))
            .collect();
        for night in days.windows(2).take(300) {
            ledger
                .reserve(
                    &ReserveRequest::new(101, "tyr", d(TODAY), night[0].clone(), night[1].clone()),
                    &d(TODAY),
                    &rooms,
                    &mut rng,
                )
                .unwrap();
        }
        let ids: HashSet<BookingId> = ledger.records().iter().map(|b| b.id).collect();
        assert_eq!(ledger.len(), 300);
        assert_eq!(ids.len(), 300);
        assert_eq!(ledger.records().last().unwrap().seq, 300);
    }

    #[test]
    fn cancel_should_only_apply_to_owner_reservation() {
        let mut ledger = BookingLedger::default();
        let b = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        assert_eq!(ledger.cancel(b.id, "alice").unwrap_err(), Error::NotOwner(b.id));
        assert_eq!(ledger.cancel(1, "tyr").unwrap_err(), Error::BookingNotFound(1));

        let cancelled = ledger.cancel(b.id, "tyr").unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.seq, b.seq);
        assert_eq!(
            ledger.cancel(b.id, "tyr").unwrap_err(),
            Error::WrongState {
                id: b.id,
                expected: BookingStatus::Reserved,
                actual: BookingStatus::Cancelled,
            }
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn auto_cancel_sweep_should_cancel_overdue_reservations_only() {
        let booking = |id, status, check_in: &str| Booking {
            seq: 1,
            id,
            user_id: "tyr".into(),
            room_id: 101,
            status,
            booking_date: d("2025-01-01"),
            check_in: d(check_in),
            check_out: d("2025-02-01"),
        };
        let mut ledger = BookingLedger::new(vec![
            booking(100, BookingStatus::Reserved, "2025-01-09"),
            booking(101, BookingStatus::Reserved, "2025-01-10"),
            booking(102, BookingStatus::Reserved, "2025-01-11"),
            booking(103, BookingStatus::CheckedIn, "2025-01-05"),
            booking(104, BookingStatus::Reserved, "2024-12-31"),
        ]);
        let cancelled = ledger.auto_cancel_sweep(&d("2025-01-10"));
        assert_eq!(cancelled, vec![100, 104]);
        let status = |id| ledger.get(id).unwrap().status;
        assert_eq!(status(100), BookingStatus::Cancelled);
        assert_eq!(status(101), BookingStatus::Reserved);
        assert_eq!(status(102), BookingStatus::Reserved);
        assert_eq!(status(103), BookingStatus::CheckedIn);
        assert_eq!(status(104), BookingStatus::Cancelled);
        assert!(ledger.auto_cancel_sweep(&d("2025-01-10")).is_empty());
    }

    #[test]
    fn check_in_should_require_exact_date() {
        let mut ledger = BookingLedger::default();
        let b = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        for day in ["2025-05-31", "2025-06-02"] {
            assert_eq!(
                ledger.check_in(b.id, "tyr", &d(day)).unwrap_err(),
                Error::DateMismatch {
                    id: b.id,
                    expected: d("2025-06-01"),
                    actual: d(day),
                }
            );
        }
        assert_eq!(
            ledger.check_in(b.id, "alice", &d("2025-06-01")).unwrap_err(),
            Error::NotOwner(b.id)
        );
        let checked_in = ledger.check_in(b.id, "tyr", &d("2025-06-01")).unwrap();
        assert_eq!(checked_in.status, BookingStatus::CheckedIn);
        assert!(matches!(
            ledger.check_in(b.id, "tyr", &d("2025-06-01")),
            Err(Error::WrongState {
                actual: BookingStatus::CheckedIn,
                ..
            })
        ));
    }

    #[test]
    fn check_out_should_follow_check_in() {
        let mut ledger = BookingLedger::default();
        let b = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        assert!(matches!(
            ledger.check_out(b.id, "tyr"),
            Err(Error::WrongState {
                expected: BookingStatus::CheckedIn,
                actual: BookingStatus::Reserved,
                ..
            })
        ));
        ledger.check_in(b.id, "tyr", &d("2025-06-01")).unwrap();
        assert_eq!(ledger.check_out(b.id, "alice").unwrap_err(), Error::NotOwner(b.id));
        let done = ledger.check_out(b.id, "tyr").unwrap();
        assert_eq!(done.status, BookingStatus::CheckedOut);
        assert!(ledger.cancel(b.id, "tyr").is_err());
        assert!(ledger.check_availability(101, &d("2025-06-01"), &d("2025-06-05")));
    }

    #[test]
    fn queries_should_split_current_and_history() {
        let mut ledger = BookingLedger::default();
        let a = reserve(&mut ledger, 101, "tyr", "2025-06-01", "2025-06-05").unwrap();
        let b = reserve(&mut ledger, 150, "tyr", "2025-06-01", "2025-06-05").unwrap();
        reserve(&mut ledger, 101, "alice", "2025-07-01", "2025-07-05").unwrap();
        ledger.cancel(a.id, "tyr").unwrap();

        let current = ledger.current_for("tyr");
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, b.id);
        let history = ledger.history_for("tyr");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, a.id);

        assert_eq!(ledger.booked_between(&d(TODAY), &d(TODAY)).len(), 3);
        assert!(ledger
            .booked_between(&d("2025-05-21"), &d("2025-06-30"))
            .is_empty());
    }

    #[test]
    fn available_rooms_should_skip_inactive_and_booked() {
        let mut ledger = BookingLedger::default();
        reserve(&mut ledger, 150, "tyr", "2025-06-01", "2025-06-05").unwrap();
        let mut rooms = catalog();
        rooms
            .add(NewRoom::standard(102, BedType::Single, 18.0, 150.0))
            .unwrap();
        rooms.set_active(102, false).unwrap();

        let span = DateSpan::parse("2025-06-03", "2025-06-04").unwrap();
        let free = ledger.available_rooms(rooms.iter(), &span);
        assert_eq!(free.iter().map(|r| r.id).collect::<Vec<_>>(), vec![101]);

        let span = DateSpan::parse("2025-06-05", "2025-06-06").unwrap();
        assert_eq!(ledger.available_rooms(rooms.iter(), &span).len(), 2);
    }

    #[test]
    fn at_most_one_live_booking_per_overlapping_span() {
        let mut ledger = BookingLedger::default();
        let rooms = catalog();
        let mut rng = StdRng::seed_from_u64(11);
        let days = [
            "2025-06-01", "2025-06-02", "2025-06-03", "2025-06-04", "2025-06-05", "2025-06-06",
        ];
        for (i, start) in days.iter().enumerate() {
            for end in &days[i + 1..] {
                let _ = reserve_with(&mut ledger, &rooms, &mut rng, start, end);
            }
        }
        let live: Vec<&Booking> = ledger.records().iter().filter(|b| b.is_active()).collect();
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                assert!(!a.overlaps(&b.check_in, &b.check_out));
            }
        }
    }
}
