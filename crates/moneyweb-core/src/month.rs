//! Calendar month ranges and the year/month timeline

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// First day of the month and first day of the following month
pub fn month_range(year: i32, month: u32) -> CoreResult<(NaiveDate, NaiveDate)> {
    let invalid = || CoreError::ValidationError {
        message: format!("Invalid month: {}-{}", year, month),
    };

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((start, end))
}

/// Resolve optional query values against today's date
pub fn resolve_month(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> (i32, u32) {
    (year.unwrap_or(today.year()), month.unwrap_or(today.month()))
}

/// One month entry in the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMonth {
    pub start: NaiveDate,
    /// Month lies after today (rendered disabled)
    pub is_future: bool,
}

/// Year navigation plus the twelve months of the displayed year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub year: i32,
    pub current_month: u32,
    /// Previous year and whether it starts after today
    pub previous_year: (i32, bool),
    /// Next year and whether it starts after today
    pub next_year: (i32, bool),
    pub months: Vec<TimelineMonth>,
}

impl Timeline {
    pub fn build(year: i32, month: u32, today: NaiveDate) -> CoreResult<Self> {
        month_range(year, month)?;

        let year_start = |y: i32| {
            NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(|| CoreError::ValidationError {
                message: format!("Invalid year: {}", y),
            })
        };
        let previous_start = year_start(year - 1)?;
        let next_start = year_start(year + 1)?;

        let months = (1..=12)
            .map(|m| {
                let (start, _) = month_range(year, m)?;
                Ok(TimelineMonth { start, is_future: start > today })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            year,
            current_month: month,
            previous_year: (year - 1, previous_start > today),
            next_year: (year + 1, next_start > today),
            months,
        })
    }
}
