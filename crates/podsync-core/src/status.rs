//! Pod and booking status vocabularies.
//!
//! The wire form is the upper-case name (`"OCCUPIED"`, `"CONFIRMED"`),
//! matching what the booking backend stores.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Occupancy state of a pod.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PodStatus {
    Available,
    Reserved,
    Occupied,
    Maintenance,
}

impl PodStatus {
    pub const ALL: [PodStatus; 4] = [
        PodStatus::Available,
        PodStatus::Reserved,
        PodStatus::Occupied,
        PodStatus::Maintenance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PodStatus::Available => "AVAILABLE",
            PodStatus::Reserved => "RESERVED",
            PodStatus::Occupied => "OCCUPIED",
            PodStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PodStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PodStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus {
                kind: "pod",
                value: s.to_string(),
            })
    }
}

/// Lifecycle state of a booking.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Active,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus {
                kind: "booking",
                value: s.to_string(),
            })
    }
}
