//! Slot validation for the public booking flow.
//!
//! Kept as a pure function over already-fetched state: the handler queries
//! whether the slot is held by a pending/confirmed appointment and passes the
//! answer in, so the rules themselves need no database.

use chrono::NaiveDate;
use thiserror::Error;

pub const MIN_PHONE_DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingRejection {
    #[error("Patient name is required.")]
    NameRequired,
    #[error("Patient phone is required.")]
    PhoneRequired,
    #[error("Please enter a valid phone number.")]
    InvalidPhone,
    #[error("Cannot book an appointment for a past date.")]
    PastDate,
    #[error("This time is already taken for the selected doctor. Please choose another time.")]
    SlotTaken,
}

fn digit_count(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Decide whether a proposed booking is acceptable.
///
/// `today` is the server-local date; `slot_taken` is whether a pending or
/// confirmed appointment already holds (doctor, date, time). `date == today`
/// is allowed. The digit check is a weak sanity check only: separators and a
/// leading `+` are ignored, not rejected.
pub fn validate_booking(
    patient_name: &str,
    patient_phone: &str,
    date: NaiveDate,
    today: NaiveDate,
    slot_taken: bool,
) -> Result<(), BookingRejection> {
    if patient_name.trim().is_empty() {
        return Err(BookingRejection::NameRequired);
    }
    let phone = patient_phone.trim();
    if phone.is_empty() {
        return Err(BookingRejection::PhoneRequired);
    }
    if digit_count(phone) < MIN_PHONE_DIGITS {
        return Err(BookingRejection::InvalidPhone);
    }
    if date < today {
        return Err(BookingRejection::PastDate);
    }
    if slot_taken {
        return Err(BookingRejection::SlotTaken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const TODAY: &str = "2026-03-10";

    fn ok_booking(name: &str, phone: &str, date: &str, slot_taken: bool) -> Result<(), BookingRejection> {
        validate_booking(name, phone, d(date), d(TODAY), slot_taken)
    }

    #[test]
    fn accepts_a_valid_future_booking() {
        assert_eq!(ok_booking("Anna Petrova", "+7 900 123-45-67", "2099-01-01", false), Ok(()));
    }

    #[test]
    fn rejects_blank_name_and_phone() {
        assert_eq!(
            ok_booking("   ", "123456", "2099-01-01", false),
            Err(BookingRejection::NameRequired)
        );
        assert_eq!(
            ok_booking("Anna", "  ", "2099-01-01", false),
            Err(BookingRejection::PhoneRequired)
        );
    }

    #[test]
    fn counts_only_digit_characters_in_phone() {
        // four digits among separators: too few
        assert_eq!(
            ok_booking("Anna", "+1-2-3-4", "2099-01-01", false),
            Err(BookingRejection::InvalidPhone)
        );
        // exactly five digits among non-digits is enough
        assert_eq!(ok_booking("Anna", "abc1-2-3-4-5", "2099-01-01", false), Ok(()));
    }

    #[test]
    fn rejects_past_dates_but_allows_today() {
        assert_eq!(
            ok_booking("Anna", "123456", "2026-03-09", false),
            Err(BookingRejection::PastDate)
        );
        assert_eq!(ok_booking("Anna", "123456", TODAY, false), Ok(()));
    }

    #[test]
    fn rejects_a_taken_slot() {
        assert_eq!(
            ok_booking("Anna", "123456", "2099-01-01", true),
            Err(BookingRejection::SlotTaken)
        );
    }

    #[test]
    fn checks_run_in_order_name_first() {
        // everything wrong at once still reports the name
        assert_eq!(
            ok_booking("", "", "2000-01-01", true),
            Err(BookingRejection::NameRequired)
        );
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        assert_eq!(
            BookingRejection::PastDate.to_string(),
            "Cannot book an appointment for a past date."
        );
        assert_eq!(
            BookingRejection::SlotTaken.to_string(),
            "This time is already taken for the selected doctor. Please choose another time."
        );
    }
}
