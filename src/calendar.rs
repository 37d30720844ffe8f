use chrono::{DateTime, FixedOffset, NaiveDate, Offset, SecondsFormat, Utc};

use crate::records::RecordError;

/// Turkey has stayed on UTC+3 all year since 2016.
const ISTANBUL_OFFSET_SECS: i32 = 3 * 3600;

pub const MACKOLIK_DATE_FMT: &str = "%d.%m.%Y";
pub const SOFASCORE_DATE_FMT: &str = "%Y-%m-%d";

pub fn istanbul_offset() -> FixedOffset {
    FixedOffset::east_opt(ISTANBUL_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn istanbul_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&istanbul_offset())
}

pub fn istanbul_today() -> NaiveDate {
    istanbul_now().date_naive()
}

/// ISO-8601 timestamp with the Istanbul offset, for output documents.
pub fn istanbul_now_iso() -> String {
    istanbul_now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn parse_mackolik_date(raw: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(raw.trim(), MACKOLIK_DATE_FMT).map_err(|_| {
        RecordError::InvalidDate {
            raw: raw.to_string(),
            expected: "DD.MM.YYYY",
        }
    })
}

pub fn format_mackolik_date(date: NaiveDate) -> String {
    date.format(MACKOLIK_DATE_FMT).to_string()
}

pub fn format_sofascore_date(date: NaiveDate) -> String {
    date.format(SOFASCORE_DATE_FMT).to_string()
}

/// Past days are never reconciled again.
pub fn is_current_or_future(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}
