//! Live subscription to the blocked slots of one clinic, day and pet.

use std::collections::BTreeSet;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::booking_service::{BookingService, SlotQuery};
use crate::domain::{LedgerEvent, Slot};
use crate::error::GatewayError;

/// Stream of blocked-slot sets for a [`SlotQuery`].
///
/// Created by [`BookingService::watch_blocked_slots`]. Each call to
/// [`SlotWatch::next`] waits for a ledger event that can affect the
/// query, recomputes the set and yields it if it differs from the last one.
/// Dropping the watch drops its event bus receiver.
#[derive(Debug)]
pub struct SlotWatch {
    service: BookingService,
    query: SlotQuery,
    receiver: broadcast::Receiver<LedgerEvent>,
    current: BTreeSet<Slot>,
}

impl SlotWatch {
    pub(crate) fn new(
        service: BookingService,
        query: SlotQuery,
        receiver: broadcast::Receiver<LedgerEvent>,
        initial: BTreeSet<Slot>,
    ) -> Self {
        Self {
            service,
            query,
            receiver,
            current: initial,
        }
    }

    /// The query this watch tracks.
    #[must_use]
    pub fn query(&self) -> &SlotQuery {
        &self.query
    }

    /// The most recently computed blocked set.
    #[must_use]
    pub fn current(&self) -> &BTreeSet<Slot> {
        &self.current
    }

    /// Waits until the blocked set changes and returns the new set.
    ///
    /// Returns `None` once the event bus is closed. A lagged receiver
    /// triggers an immediate recomputation since events were missed.
    pub async fn next(&mut self) -> Option<Result<BTreeSet<Slot>, GatewayError>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if !event.affects(&self.query.clinic_id, self.query.date) {
                        continue;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(
                        clinic_id = %self.query.clinic_id,
                        skipped = n,
                        "slot watch lagged, recomputing"
                    );
                }
                Err(RecvError::Closed) => return None,
            }

            match self.service.compute_blocked_slots(&self.query).await {
                Ok(blocked) if blocked == self.current => continue,
                Ok(blocked) => {
                    self.current.clone_from(&blocked);
                    return Some(Ok(blocked));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::service::booking_service::tests::{
        clinic_id, june_first, make_service, pet_id, request, slot,
    };

    fn query(clinic: &str, pet: &str) -> SlotQuery {
        SlotQuery {
            clinic_id: clinic_id(clinic),
            date: june_first(),
            pet_id: pet_id(pet),
        }
    }

    #[tokio::test]
    async fn watch_starts_with_current_set() {
        let service = make_service("2025-05-01 08:00", &[("vet-1", Some(1))]).await;
        tokio_test::assert_ok!(service.submit_booking(request("vet-1", "pet-a", "u1", "10:00")).await);

        let Ok(watch) = service.watch_blocked_slots(query("vet-1", "pet-x")).await else {
            panic!("watch should open");
        };
        assert_eq!(watch.current(), &BTreeSet::from([slot("10:00")]));
    }

    #[tokio::test]
    async fn booking_pushes_new_set() {
        let service = make_service("2025-05-01 08:00", &[("vet-1", Some(1))]).await;
        let Ok(mut watch) = service.watch_blocked_slots(query("vet-1", "pet-x")).await else {
            panic!("watch should open");
        };

        tokio_test::assert_ok!(service.submit_booking(request("vet-1", "pet-a", "u1", "12:00")).await);

        let Ok(Some(Ok(blocked))) =
            tokio::time::timeout(Duration::from_secs(1), watch.next()).await
        else {
            panic!("expected a pushed set");
        };
        assert_eq!(blocked, BTreeSet::from([slot("12:00")]));
    }

    #[tokio::test]
    async fn cancel_frees_the_slot() {
        let service = make_service("2025-05-01 08:00", &[("vet-1", Some(1))]).await;
        let Ok(record) = service.submit_booking(request("vet-1", "pet-a", "u1", "12:00")).await else {
            panic!("booking should be admitted");
        };
        let Ok(mut watch) = service.watch_blocked_slots(query("vet-1", "pet-x")).await else {
            panic!("watch should open");
        };

        tokio_test::assert_ok!(service.cancel_booking(record.id).await);

        let Ok(Some(Ok(blocked))) =
            tokio::time::timeout(Duration::from_secs(1), watch.next()).await
        else {
            panic!("expected a pushed set");
        };
        assert!(blocked.is_empty());
    }

    #[tokio::test]
    async fn other_dates_do_not_wake_the_watch() {
        let service = make_service("2025-05-01 08:00", &[("vet-1", Some(1))]).await;
        let Ok(mut watch) = service.watch_blocked_slots(query("vet-1", "pet-x")).await else {
            panic!("watch should open");
        };

        let mut other_day = request("vet-1", "pet-a", "u1", "12:00");
        other_day.date = june_first().succ_opt().unwrap_or(june_first());
        tokio_test::assert_ok!(service.submit_booking(other_day).await);

        let waited = tokio::time::timeout(Duration::from_millis(100), watch.next()).await;
        assert!(waited.is_err());
    }
}
