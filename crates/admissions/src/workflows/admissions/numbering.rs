use std::sync::atomic::{AtomicU16, Ordering};

use chrono::NaiveDate;
use rand::Rng;

const SUFFIX_MIN: u16 = 1000;
const SUFFIX_MAX: u16 = 9999;

pub fn format_application_number(date: NaiveDate, suffix: u16) -> String {
    format!("APP-{}-{suffix:04}", date.format("%Y%m%d"))
}

/// Produces candidate application numbers. Uniqueness is enforced by the store, which
/// rejects duplicates so the caller can draw again.
pub trait ApplicationNumberGenerator: Send + Sync {
    fn next_number(&self, date: NaiveDate) -> String;
}

/// Random four digit suffix in `1000..=9999`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomApplicationNumbers;

impl ApplicationNumberGenerator for RandomApplicationNumbers {
    fn next_number(&self, date: NaiveDate) -> String {
        let suffix = rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX);
        format_application_number(date, suffix)
    }
}

/// Deterministic suffixes counting up from a starting value, wrapping inside the valid range.
#[derive(Debug)]
pub struct SequentialApplicationNumbers {
    next: AtomicU16,
}

impl SequentialApplicationNumbers {
    pub fn starting_at(start: u16) -> Self {
        Self {
            next: AtomicU16::new(start.clamp(SUFFIX_MIN, SUFFIX_MAX)),
        }
    }
}

impl Default for SequentialApplicationNumbers {
    fn default() -> Self {
        Self::starting_at(SUFFIX_MIN)
    }
}

impl ApplicationNumberGenerator for SequentialApplicationNumbers {
    fn next_number(&self, date: NaiveDate) -> String {
        let suffix = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(if current >= SUFFIX_MAX {
                    SUFFIX_MIN
                } else {
                    current + 1
                })
            })
            .unwrap_or(SUFFIX_MIN);
        format_application_number(date, suffix)
    }
}
