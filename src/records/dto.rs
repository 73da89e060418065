use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::records::repo::Record;
use crate::validate::{check_range, is_valid_time, Validate};

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn check_month(month: &str) -> Result<(), ApiError> {
    if MONTHS.contains(&month) {
        Ok(())
    } else {
        Err(ApiError::validation("month", "must be an English month name"))
    }
}

fn check_time(time: &str) -> Result<(), ApiError> {
    if is_valid_time(time) {
        Ok(())
    } else {
        Err(ApiError::validation("time", "must match HH:MM"))
    }
}

fn check_dosage(dosage: i32) -> Result<(), ApiError> {
    if dosage < 1 {
        Err(ApiError::validation("dosage", "must be at least 1"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub dosage: i32,
    pub time: String,
    pub day: i32,
    pub month: String,
    pub year: i32,
}

impl Validate for CreateRecordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_dosage(self.dosage)?;
        check_time(&self.time)?;
        check_range("day", self.day as i64, 1, 31)?;
        check_month(&self.month)?;
        check_range("year", self.year as i64, 1970, 9999)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub dosage: i32,
    pub time: String,
}

impl Validate for UpdateRecordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_dosage(self.dosage)?;
        check_time(&self.time)
    }
}

/// Month selector for the aggregated listing.
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
    pub year: Option<i32>,
}

impl Validate for MonthQuery {
    fn validate(&self) -> Result<(), ApiError> {
        check_month(&self.month)?;
        if let Some(year) = self.year {
            check_range("year", year as i64, 1970, 9999)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: i32,
    pub month: String,
    pub year: i32,
}

impl Validate for DayQuery {
    fn validate(&self) -> Result<(), ApiError> {
        check_range("day", self.day as i64, 1, 31)?;
        check_month(&self.month)?;
        check_range("year", self.year as i64, 1970, 9999)
    }
}

/// Compact record shape used by the today listing and single-record reads.
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub id: Uuid,
    pub dosage: i32,
    pub time: String,
}

impl From<Record> for RecordView {
    fn from(r: Record) -> Self {
        Self {
            id: r.id,
            dosage: r.dosage,
            time: r.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_valid_record() {
        let req = CreateRecordRequest {
            dosage: 250,
            time: "08:30".into(),
            day: 12,
            month: "June".into(),
            year: 2024,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_rejects_zero_dosage() {
        let req = CreateRecordRequest {
            dosage: 0,
            time: "08:30".into(),
            day: 12,
            month: "June".into(),
            year: 2024,
        };
        assert_eq!(req.validate().unwrap_err().to_string(), "dosage must be at least 1");
    }

    #[test]
    fn create_rejects_day_out_of_range() {
        let req = CreateRecordRequest {
            dosage: 100,
            time: "08:30".into(),
            day: 32,
            month: "June".into(),
            year: 2024,
        };
        assert!(req.validate().unwrap_err().to_string().starts_with("day"));
    }

    #[test]
    fn month_enum_accepts_all_twelve_and_nothing_else() {
        for month in MONTHS {
            assert!(check_month(month).is_ok(), "{month} should be accepted");
        }
        assert!(check_month("june").is_err());
        assert!(check_month("Juin").is_err());
        assert!(check_month("").is_err());
    }

    #[test]
    fn update_rejects_bad_time() {
        let req = UpdateRecordRequest {
            dosage: 100,
            time: "7:5".into(),
        };
        assert_eq!(req.validate().unwrap_err().to_string(), "time must match HH:MM");
    }

    #[test]
    fn month_query_year_is_optional() {
        let query = MonthQuery {
            month: "March".into(),
            year: None,
        };
        assert!(query.validate().is_ok());
    }
}
