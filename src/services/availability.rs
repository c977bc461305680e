use std::fmt;

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use crate::models::bookings::BookedStay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    StartNotBeforeEnd,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::StartNotBeforeEnd => write!(f, "start date must be before end date"),
        }
    }
}

impl std::error::Error for RangeError {}

pub struct AvailabilityService;

impl AvailabilityService {
    /// Inclusive interval overlap. Ranges that merely touch at an endpoint
    /// conflict: a stay ending on the 5th blocks one starting on the 5th.
    pub fn ranges_overlap(
        a_start: NaiveDate,
        a_end: NaiveDate,
        b_start: NaiveDate,
        b_end: NaiveDate,
    ) -> bool {
        a_start <= b_end && b_start <= a_end
    }

    /// Whether `[start, end]` is free of conflicts against the existing
    /// stays held for the same listing. Stays for other listings are
    /// ignored; the scan stops at the first conflict. Requires
    /// `start < end`.
    pub fn is_range_available(
        listing_id: &ObjectId,
        start: NaiveDate,
        end: NaiveDate,
        existing: &[BookedStay],
    ) -> Result<bool, RangeError> {
        if start >= end {
            return Err(RangeError::StartNotBeforeEnd);
        }

        let conflict = existing
            .iter()
            .filter(|stay| stay.listing_id == *listing_id)
            .any(|stay| Self::ranges_overlap(start, end, stay.start_date, stay.end_date));

        Ok(!conflict)
    }
}
