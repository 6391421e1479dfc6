//! Plain-text rendering of API responses.

use std::fmt::Write as _;

use chrono::{Datelike as _, NaiveDate, Timelike as _};
use lcsc_core::{
  availability::AvailabilitySlot,
  event::{EventShape, RawEvent, wall_clock},
};

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One row per day, one column per hour; each cell is the number of people
/// available in that slot.
pub fn availability_grid(slots: &[AvailabilitySlot]) -> String {
  let Some(first) = slots.first() else {
    return "no slots\n".to_string();
  };

  let mut hours: Vec<u32> = slots.iter().map(|s| s.start_date.hour()).collect();
  hours.sort_unstable();
  hours.dedup();

  let mut out = String::new();
  let _ = writeln!(
    out,
    "role: {}  eligible: {}",
    first.role, first.max_people_available
  );
  out.push_str("              ");
  for h in &hours {
    let _ = write!(out, "{h:>4}");
  }
  out.push('\n');

  let mut current: Option<NaiveDate> = None;
  for slot in slots {
    let date = slot.start_date.date_naive();
    if current != Some(date) {
      if current.is_some() {
        out.push('\n');
      }
      let day = DAY_NAMES[date.weekday().num_days_from_sunday() as usize];
      let _ = write!(out, "{day} {date}");
      // Skip columns for hours missing at the start of the day.
      let hour = slot.start_date.hour();
      let offset = hours.iter().take_while(|h| **h < hour).count();
      for _ in 0..offset {
        out.push_str("    ");
      }
      current = Some(date);
    }
    let _ = write!(out, "{:>4}", slot.number_of_people);
  }
  out.push('\n');
  out
}

/// One line per event.
pub fn schedule(events: &[RawEvent]) -> String {
  if events.is_empty() {
    return "no events\n".to_string();
  }
  let mut out = String::new();
  for event in events {
    let title = event.title.as_deref().unwrap_or("");
    let line = match event.shape() {
      Ok(EventShape::Permanent { day_of_week, start_time, end_time }) => format!(
        "every {} {}-{}",
        DAY_NAMES.get(usize::from(day_of_week)).copied().unwrap_or("?"),
        wall_clock::format(&start_time),
        wall_clock::format(&end_time),
      ),
      Ok(EventShape::Temporary { start_date, end_date }) => {
        format!("{} -> {}", start_date.to_rfc3339(), end_date.to_rfc3339())
      }
      Err(e) => format!("unreadable ({e})"),
    };
    let _ = writeln!(out, "{}  {line}  {title}", event.event_id);
  }
  out
}
