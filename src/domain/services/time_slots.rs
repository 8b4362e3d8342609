use chrono::{Duration, NaiveTime};
use crate::domain::models::time_slot::TimeSlot;

pub const DAY_START: (u32, u32) = (9, 0);
pub const DAY_END: (u32, u32) = (21, 0);
pub const SLOT_MINUTES: i64 = 30;

/// Builds the fixed daily catalog: half-hour intervals from 09:00 up to 21:00.
pub fn daily_catalog() -> Vec<TimeSlot> {
    let (Some(start), Some(end)) = (
        NaiveTime::from_hms_opt(DAY_START.0, DAY_START.1, 0),
        NaiveTime::from_hms_opt(DAY_END.0, DAY_END.1, 0),
    ) else {
        return Vec::new();
    };

    let step = Duration::minutes(SLOT_MINUTES);
    let mut slots = Vec::new();
    let mut current = start;

    while current < end {
        let next = current + step;
        slots.push(TimeSlot::new(current, next));
        current = next;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_nine_to_nine_in_half_hours() {
        let slots = daily_catalog();

        assert_eq!(slots.len(), 24);
        assert_eq!(slots[0].start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(slots[0].end_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(slots[23].start_time, NaiveTime::from_hms_opt(20, 30, 0).unwrap());
        assert_eq!(slots[23].end_time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());

        for pair in slots.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
    }
}
