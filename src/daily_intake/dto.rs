use serde::{Deserialize, Serialize};
use time::{
    format_description::FormatItem,
    macros::{date, format_description},
    Date, Duration, OffsetDateTime,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    nutrients::{NutrientProgress, NutrientVector},
};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Days covered by a range query with no explicit bounds, today included.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Earliest and latest dates accepted from clients. Both fit a Postgres `DATE`.
pub const MIN_DATE: Date = date!(0001 - 01 - 01);
pub const MAX_DATE: Date = date!(9999 - 12 - 31);

pub fn parse_date(field: &str, raw: &str) -> Result<Date, ApiError> {
    let d = Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a YYYY-MM-DD date")))?;
    if !(MIN_DATE..=MAX_DATE).contains(&d) {
        return Err(ApiError::BadRequest(format!(
            "{field} must be between 0001-01-01 and 9999-12-31"
        )));
    }
    Ok(d)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogIntakeRequest {
    pub meal_id: Option<Uuid>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeQuery {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl IntakeQuery {
    /// Inclusive date range selected by the query.
    ///
    /// `date` wins over a range. A missing end defaults to `today`, a
    /// missing start to the 30 days ending at the end date, cut off at
    /// `MIN_DATE`.
    pub fn range(&self, today: Date) -> Result<(Date, Date), ApiError> {
        if let Some(d) = self.date.as_deref() {
            let d = parse_date("date", d)?;
            return Ok((d, d));
        }
        let end = match self.end_date.as_deref() {
            Some(raw) => parse_date("endDate", raw)?,
            None => today,
        };
        let start = match self.start_date.as_deref() {
            Some(raw) => parse_date("startDate", raw)?,
            None => end
                .checked_sub(Duration::days(DEFAULT_RANGE_DAYS - 1))
                .map_or(MIN_DATE, |d| d.max(MIN_DATE)),
        };
        if start > end {
            return Err(ApiError::BadRequest("startDate must not be after endDate".into()));
        }
        Ok((start, end))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyIntakeResponse {
    pub id: Uuid,
    pub date: String,
    pub meals: Vec<Uuid>,
    pub total_nutrients: NutrientVector,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSummaryResponse {
    pub date: String,
    pub total_nutrients: NutrientVector,
    pub target: NutrientVector,
    pub progress: NutrientProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_dates() {
        let d = parse_date("date", "2024-03-07").unwrap();
        assert_eq!(d, date!(2024 - 03 - 07));
        assert_eq!(format_date(d), "2024-03-07");
        assert!(parse_date("date", "07/03/2024").is_err());
        assert!(parse_date("date", "2024-02-30").is_err());
    }

    #[test]
    fn single_date_wins_over_range() {
        let q = IntakeQuery {
            date: Some("2024-05-01".into()),
            start_date: Some("2024-01-01".into()),
            end_date: None,
        };
        let d = date!(2024 - 05 - 01);
        assert_eq!(q.range(date!(2024 - 06 - 01)).unwrap(), (d, d));
    }

    #[test]
    fn default_range_is_last_thirty_days() {
        let today = date!(2024 - 03 - 31);
        let (start, end) = IntakeQuery::default().range(today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, date!(2024 - 03 - 02));
        assert_eq!((end - start).whole_days() + 1, DEFAULT_RANGE_DAYS);
    }

    #[test]
    fn dates_outside_the_storable_range_are_rejected() {
        for raw in ["-9999-01-01", "0000-12-31", "+10000-01-01"] {
            let err = parse_date("endDate", raw).unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST, "{raw}");
        }
        assert_eq!(parse_date("date", "0001-01-01").unwrap(), MIN_DATE);
        assert_eq!(parse_date("date", "9999-12-31").unwrap(), MAX_DATE);

        let q = IntakeQuery {
            end_date: Some("-9999-01-01".into()),
            ..Default::default()
        };
        assert!(q.range(date!(2024 - 03 - 31)).is_err());
    }

    #[test]
    fn default_range_stops_at_the_earliest_date() {
        let q = IntakeQuery {
            end_date: Some("0001-01-10".into()),
            ..Default::default()
        };
        assert_eq!(
            q.range(date!(2024 - 03 - 31)).unwrap(),
            (MIN_DATE, date!(0001 - 01 - 10))
        );
    }

    #[test]
    fn explicit_range_and_inverted_range() {
        let q = IntakeQuery {
            date: None,
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-10".into()),
        };
        assert_eq!(
            q.range(date!(2024 - 06 - 01)).unwrap(),
            (date!(2024 - 01 - 01), date!(2024 - 01 - 10))
        );

        let inverted = IntakeQuery {
            date: None,
            start_date: Some("2024-02-01".into()),
            end_date: Some("2024-01-01".into()),
        };
        assert!(inverted.range(date!(2024 - 06 - 01)).is_err());
    }

    #[test]
    fn request_accepts_optional_date() {
        let id = Uuid::new_v4();
        let r: LogIntakeRequest = serde_json::from_str(&format!(r#"{{"mealId":"{id}"}}"#)).unwrap();
        assert_eq!(r.meal_id, Some(id));
        assert!(r.date.is_none());
    }
}
