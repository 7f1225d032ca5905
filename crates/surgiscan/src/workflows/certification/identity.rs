//! National identity number handling.
//!
//! A 13 digit identity number is laid out as `YYMMDD SSSS C A Z`: date of birth, a
//! gender sequence (>= 5000 is male), a citizenship digit, a legacy digit and the
//! checksum digit.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::Gender;

const ID_LENGTH: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdNumberError {
    #[error("ID number must be exactly 13 digits (found {0} characters)")]
    InvalidLength(usize),
    #[error("ID number may only contain digits")]
    NonDigit,
    #[error("ID number checksum digit is invalid (expected {expected}, found {found})")]
    Checksum { expected: u8, found: u8 },
    #[error("ID number does not encode a valid date of birth")]
    InvalidBirthDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Citizenship {
    Citizen,
    PermanentResident,
    Unknown,
}

/// Computes the check digit over the first twelve digits.
///
/// Digits whose distance from the check digit is even are doubled, and doubled
/// values above nine have their two digits summed.
pub fn checksum_digit(digits: &[u8; 12]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, &digit)| {
            let position = 12 - index;
            let value = u32::from(digit);
            if position % 2 == 0 {
                let doubled = value * 2;
                if doubled > 9 {
                    doubled / 10 + doubled % 10
                } else {
                    doubled
                }
            } else {
                value
            }
        })
        .sum();

    ((10 - (sum % 10)) % 10) as u8
}

fn parse_digits(raw: &str) -> Result<[u8; ID_LENGTH], IdNumberError> {
    let length = raw.chars().count();
    if length != ID_LENGTH {
        return Err(IdNumberError::InvalidLength(length));
    }

    let mut digits = [0u8; ID_LENGTH];
    for (slot, ch) in digits.iter_mut().zip(raw.chars()) {
        *slot = ch.to_digit(10).ok_or(IdNumberError::NonDigit)? as u8;
    }
    Ok(digits)
}

/// Structural and checksum validation only.
pub fn verify_checksum(raw: &str) -> Result<(), IdNumberError> {
    let digits = parse_digits(raw)?;
    let mut body = [0u8; 12];
    body.copy_from_slice(&digits[..12]);

    let expected = checksum_digit(&body);
    let found = digits[12];
    if expected == found {
        Ok(())
    } else {
        Err(IdNumberError::Checksum { expected, found })
    }
}

pub fn is_valid_id_number(raw: &str) -> bool {
    verify_checksum(raw).is_ok()
}

/// A checksum-valid identity number with its decoded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaIdNumber {
    value: String,
    date_of_birth: NaiveDate,
    gender: Gender,
    citizenship: Citizenship,
}

impl SaIdNumber {
    /// Parses and decodes an ID number. Two-digit birth years are placed in the
    /// latest century that does not put the birth date after `reference`.
    pub fn parse(raw: &str, reference: NaiveDate) -> Result<Self, IdNumberError> {
        verify_checksum(raw)?;
        let digits = parse_digits(raw)?;

        let number = |range: std::ops::Range<usize>| -> u32 {
            digits[range]
                .iter()
                .fold(0u32, |acc, digit| acc * 10 + u32::from(*digit))
        };

        let year_in_century = number(0..2) as i32;
        let month = number(2..4);
        let day = number(4..6);

        let current_century = reference.year() - reference.year().rem_euclid(100);
        let mut date_of_birth =
            NaiveDate::from_ymd_opt(current_century + year_in_century, month, day);
        if date_of_birth.map(|dob| dob > reference).unwrap_or(true) {
            date_of_birth =
                NaiveDate::from_ymd_opt(current_century - 100 + year_in_century, month, day);
        }
        let date_of_birth = date_of_birth.ok_or(IdNumberError::InvalidBirthDate)?;

        let gender = if number(6..10) >= 5000 {
            Gender::Male
        } else {
            Gender::Female
        };

        let citizenship = match digits[10] {
            0 => Citizenship::Citizen,
            1 => Citizenship::PermanentResident,
            _ => Citizenship::Unknown,
        };

        Ok(Self {
            value: raw.to_string(),
            date_of_birth,
            gender,
            citizenship,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn citizenship(&self) -> Citizenship {
        self.citizenship
    }

    /// Completed years of age on `date`; zero before the date of birth.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.date_of_birth).unwrap_or(0)
    }
}

/// Whether a captured date of birth agrees with the `YYMMDD` prefix of an ID number.
pub(crate) fn birth_date_matches(raw: &str, date_of_birth: NaiveDate) -> bool {
    let prefix: String = raw.chars().take(6).collect();
    prefix == date_of_birth.format("%y%m%d").to_string()
}
