// core/src/pricing.rs

//! Price totals and warranty windows.

use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::model::Warranty;

/// `totalAmount` is always recomputed from the quoted price and the delivery fee.
pub fn total_amount(price: f64, delivery_fee: f64) -> f64 {
  price + delivery_fee
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarrantyWindow {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl WarrantyWindow {
  pub fn into_warranty(self, days: u32) -> Warranty {
    Warranty {
      enabled: true,
      duration: Some(format_duration(days)),
      start_date: Some(self.start),
      end_date: Some(self.end),
    }
  }
}

pub fn format_duration(days: u32) -> String {
  if days == 1 {
    "1 day".to_string()
  } else {
    format!("{days} days")
  }
}

/// Warranty starts at local midnight of `now`'s day and ends at the last
/// millisecond of the day `days` later, both in `now`'s timezone. `None`
/// when the end falls outside the representable calendar.
pub fn warranty_window<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> Option<WarrantyWindow> {
  let tz = now.timezone();
  let today = now.date_naive();
  let last_day = today.checked_add_days(Days::new(u64::from(days)))?;

  let start = resolve_local(&tz, today.and_time(NaiveTime::default())).unwrap_or_else(|| now.with_timezone(&Utc));
  let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
  let end = match resolve_local(&tz, last_day.and_time(end_of_day)) {
    Some(end) => end,
    None => start.checked_add_signed(TimeDelta::try_days(i64::from(days))?)?,
  };

  Some(WarrantyWindow { start, end })
}

// A local wall-clock time can be skipped or repeated around DST changes.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
  tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc))
}
