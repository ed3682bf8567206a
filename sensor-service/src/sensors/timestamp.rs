use serde::Serializer;
use time::{macros::format_description, Date, Month, PrimitiveDateTime};

/// Parse the portal's reading time, `%m/%d/%y %I:%M %p` (e.g. `11/26/24 3:00 AM`).
///
/// Two-digit years 69..=99 fall in the 1900s and the rest in the 2000s. The
/// result carries no offset; the portal reports local time.
pub fn parse_reading_time(s: &str) -> Option<PrimitiveDateTime> {
    let mut parts = s.split_whitespace();
    let (date, clock, period) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let mut date_parts = date.split('/');
    let month: u8 = number(date_parts.next()?)?;
    let day: u8 = number(date_parts.next()?)?;
    let year: i32 = number(date_parts.next()?)?;
    if date_parts.next().is_some() {
        return None;
    }
    let year = match year {
        0..=68 => 2000 + year,
        69..=99 => 1900 + year,
        _ => return None,
    };

    let (hour, minute) = clock.split_once(':')?;
    let hour: u8 = number(hour)?;
    let minute: u8 = number(minute)?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match period.to_ascii_uppercase().as_str() {
        "AM" => hour % 12,
        "PM" => hour % 12 + 12,
        _ => return None,
    };

    Date::from_calendar_date(year, Month::try_from(month).ok()?, day)
        .ok()?
        .with_hms(hour, minute, 0)
        .ok()
}

/// One or two ASCII digits.
fn number<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

pub(super) fn serialize<S: Serializer>(ts: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let formatted = ts.format(&format).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}
