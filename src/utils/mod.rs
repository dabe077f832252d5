use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

/// Supplies "now" for period comparisons. Aggregation functions take the
/// timestamp as a parameter instead of reading the system clock, so screens
/// inject a clock once and statistics stay deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed two-decimal display of an amount in cents. Stored amounts stay in
/// cents; only display goes through here.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parses a decimal amount ("12.50", also "12,50") into cents.
pub fn parse_amount(value: &str) -> Result<i64> {
    let normalized = value.trim().replace(',', ".");
    let parsed = normalized
        .parse::<f64>()
        .map_err(|e| anyhow!("Parse amount: {}", e))?;
    if !parsed.is_finite() {
        return Err(anyhow!("Parse amount: not a finite number"));
    }
    Ok((parsed * 100.0).round() as i64)
}

pub fn is_same_billing_month(date: DateTime<Utc>, reference: DateTime<Utc>) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

pub fn is_same_billing_year(date: DateTime<Utc>, reference: DateTime<Utc>) -> bool {
    date.year() == reference.year()
}

/// Converts the textual date shapes seen at the boundary into the canonical
/// UTC timestamp. Date-only inputs land at midnight UTC.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d", "%Y.%m.%d"];
    for fmt in formats.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date.and_time(NaiveTime::MIN).and_utc());
        }
    }
    Err(anyhow!("Unrecognized date: {}", raw))
}
