//! Mock registration state.
//!
//! # States
//! - Closed: registrations closed (startup value)
//! - Open: registrations open
//! - Warning: registrations about to open
//!
//! Any state may follow any other; only the set endpoint writes.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationState {
    #[default]
    Closed = 0,
    Open = 1,
    Warning = 2,
}

impl RegistrationState {
    pub const ALL: [RegistrationState; 3] = [
        RegistrationState::Closed,
        RegistrationState::Open,
        RegistrationState::Warning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationState::Closed => "closed",
            RegistrationState::Open => "open",
            RegistrationState::Warning => "warning",
        }
    }
}

impl From<u8> for RegistrationState {
    fn from(val: u8) -> Self {
        match val {
            1 => RegistrationState::Open,
            2 => RegistrationState::Warning,
            _ => RegistrationState::Closed,
        }
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state")]
pub struct InvalidState;

impl FromStr for RegistrationState {
    type Err = InvalidState;

    /// Exact, case-sensitive match on the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or(InvalidState)
    }
}

/// The process-wide state cell.
///
/// Reads and writes are single atomic byte operations, so a reader never
/// observes a partial write.
#[derive(Debug, Default)]
pub struct StateCell {
    value: AtomicU8,
}

impl StateCell {
    pub fn new(initial: RegistrationState) -> Self {
        Self {
            value: AtomicU8::new(initial as u8),
        }
    }

    pub fn get(&self) -> RegistrationState {
        RegistrationState::from(self.value.load(Ordering::Acquire))
    }

    /// Replace the state, returning the previous one.
    pub fn set(&self, next: RegistrationState) -> RegistrationState {
        RegistrationState::from(self.value.swap(next as u8, Ordering::AcqRel))
    }
}
