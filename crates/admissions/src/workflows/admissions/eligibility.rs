use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::EducationalLevel;

/// Inclusive age window accepted for an educational level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBand {
    pub min: i32,
    pub max: i32,
}

impl AgeBand {
    pub const fn for_level(level: EducationalLevel) -> Self {
        match level {
            EducationalLevel::JuniorSecondary => Self { min: 10, max: 15 },
            EducationalLevel::SeniorSecondary => Self { min: 13, max: 18 },
            _ => Self { min: 10, max: 18 },
        }
    }
}

/// Result of checking an applicant's age against the band for their level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EligibilityCheck {
    pub level: EducationalLevel,
    pub eligible: bool,
    pub age: i32,
    pub min_age: i32,
    pub max_age: i32,
}

impl EligibilityCheck {
    pub fn ensure(&self) -> Result<(), EligibilityError> {
        if self.age < self.min_age {
            return Err(EligibilityError::TooYoung {
                min: self.min_age,
                level: self.level,
            });
        }
        if self.age > self.max_age {
            return Err(EligibilityError::TooOld {
                max: self.max_age,
                level: self.level,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("Student must be at least {min} years old for {level}")]
    TooYoung { min: i32, level: EducationalLevel },
    #[error("Student cannot be older than {max} years for {level}")]
    TooOld { max: i32, level: EducationalLevel },
}

/// Whole years elapsed since `date_of_birth`, counting a year only once its anniversary passes.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

pub fn check_eligibility(
    date_of_birth: NaiveDate,
    level: EducationalLevel,
    today: NaiveDate,
) -> EligibilityCheck {
    let band = AgeBand::for_level(level);
    let age = age_on(date_of_birth, today);
    EligibilityCheck {
        level,
        eligible: (band.min..=band.max).contains(&age),
        age,
        min_age: band.min,
        max_age: band.max,
    }
}
