//! Decision rules of the booking coordinator.
//!
//! Repositories gather a [`SlotSnapshot`] (or the cancellation inputs) inside
//! their transaction, ask this module what to do, and then apply the returned
//! plan before committing. The SQLite and PostgreSQL adapters share these rules.

use crate::domain::models::{availability::{Availability, SlotKey}, waitlist::WaitlistEntry};
use crate::error::AppError;

/// What the create path observed for one (patient, doctor, date, slot).
#[derive(Debug, Default)]
pub struct SlotSnapshot {
    /// The patient already holds an appointment at this date and slot, with any doctor.
    pub patient_busy: bool,
    /// The doctor already has an appointment at this date and slot.
    pub doctor_busy: bool,
    /// The patient's existing waitlist entry for this key, if any.
    pub queued: Option<WaitlistEntry>,
    /// The matching availability, only if it is currently bookable.
    pub open_availability: Option<Availability>,
}

#[derive(Debug)]
pub enum BookingPlan {
    /// Insert the appointment and mark this availability as taken.
    Confirm { availability_id: String },
    /// Insert a new waitlist entry.
    Enqueue,
    /// Nothing to write.
    AlreadyQueued(WaitlistEntry),
}

pub fn plan_booking(snapshot: SlotSnapshot) -> Result<BookingPlan, AppError> {
    if snapshot.patient_busy {
        return Err(AppError::Conflict("Patient already has an appointment at this time".into()));
    }

    if snapshot.doctor_busy {
        return Ok(match snapshot.queued {
            Some(entry) => BookingPlan::AlreadyQueued(entry),
            None => BookingPlan::Enqueue,
        });
    }

    match snapshot.open_availability {
        Some(availability) => Ok(BookingPlan::Confirm { availability_id: availability.id }),
        None => Err(AppError::Validation("The requested time slot is not available".into())),
    }
}

#[derive(Debug)]
pub enum CancellationPlan {
    /// Flip the availability back to bookable.
    Release { availability_id: String },
    /// Hand the slot to this waitlist entry's patient; availability stays taken.
    Promote { availability_id: String, entry: WaitlistEntry },
}

/// `availability` is the row for the cancelled appointment's key regardless of
/// its flag. `next_in_line` is the earliest waitlist entry whose patient is free
/// at that time.
pub fn plan_cancellation(
    key: &SlotKey,
    availability: Option<Availability>,
    next_in_line: Option<WaitlistEntry>,
) -> Result<CancellationPlan, AppError> {
    let availability = availability.ok_or_else(|| AppError::Invariant(format!(
        "appointment exists without availability for doctor {} on {} slot {}",
        key.doctor_id, key.date, key.time_slot_id
    )))?;

    Ok(match next_in_line {
        Some(entry) => CancellationPlan::Promote { availability_id: availability.id, entry },
        None => CancellationPlan::Release { availability_id: availability.id },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key() -> SlotKey {
        SlotKey {
            doctor_id: "doc".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time_slot_id: "slot".into(),
        }
    }

    fn availability() -> Availability {
        let k = key();
        Availability::new(k.doctor_id, k.date, k.time_slot_id)
    }

    #[test]
    fn free_slot_is_confirmed() {
        let open = availability();
        let expected = open.id.clone();
        let plan = plan_booking(SlotSnapshot { open_availability: Some(open), ..Default::default() }).unwrap();

        match plan {
            BookingPlan::Confirm { availability_id } => assert_eq!(availability_id, expected),
            other => panic!("expected confirm, got {:?}", other),
        }
    }

    #[test]
    fn patient_conflict_wins_over_everything_else() {
        let err = plan_booking(SlotSnapshot {
            patient_busy: true,
            doctor_busy: true,
            open_availability: Some(availability()),
            ..Default::default()
        }).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn taken_slot_enqueues_once() {
        let plan = plan_booking(SlotSnapshot { doctor_busy: true, ..Default::default() }).unwrap();
        assert!(matches!(plan, BookingPlan::Enqueue));

        let entry = WaitlistEntry::new("pat".into(), &key());
        let plan = plan_booking(SlotSnapshot {
            doctor_busy: true,
            queued: Some(entry.clone()),
            ..Default::default()
        }).unwrap();

        match plan {
            BookingPlan::AlreadyQueued(existing) => assert_eq!(existing.id, entry.id),
            other => panic!("expected already queued, got {:?}", other),
        }
    }

    #[test]
    fn unpublished_or_reserved_slot_is_rejected() {
        let err = plan_booking(SlotSnapshot::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn cancellation_promotes_next_in_line() {
        let entry = WaitlistEntry::new("pat".into(), &key());
        let plan = plan_cancellation(&key(), Some(availability()), Some(entry.clone())).unwrap();

        match plan {
            CancellationPlan::Promote { entry: promoted, .. } => assert_eq!(promoted.id, entry.id),
            other => panic!("expected promotion, got {:?}", other),
        }
    }

    #[test]
    fn cancellation_without_waitlist_releases() {
        let plan = plan_cancellation(&key(), Some(availability()), None).unwrap();
        assert!(matches!(plan, CancellationPlan::Release { .. }));
    }

    #[test]
    fn missing_availability_is_an_invariant_violation() {
        let err = plan_cancellation(&key(), None, None).unwrap_err();
        assert!(matches!(err, AppError::Invariant(_)));
    }
}
