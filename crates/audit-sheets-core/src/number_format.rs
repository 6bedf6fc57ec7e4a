//! Number formats and date display text
//!
//! Only the part of number formatting that column inference depends on is
//! implemented: telling date formats apart from plain numbers, and rendering
//! a date serial through a date format code.

use crate::cell::{format_general, CellValue};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 14 - short date
    pub const ID_DATE_SHORT: u32 = 14;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// Create a number format from a format string
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        NumberFormat::Custom(format.into())
    }

    /// Create a built-in format by ID
    pub fn from_id(id: u32) -> Self {
        if id == 0 {
            NumberFormat::General
        } else {
            NumberFormat::BuiltIn(id)
        }
    }

    /// Get the format string
    ///
    /// Built-in 14 is locale dependent; the en-US rendering is used.
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(s) => {
                let code = strip_literals(first_section(s)).to_ascii_lowercase();
                code.chars()
                    .any(|c| matches!(c, 'y' | 'm' | 'd' | 'h' | 's'))
            }
            NumberFormat::General => false,
        }
    }

    /// Display text for a value under this format
    pub fn format_value(&self, value: &CellValue) -> String {
        match value {
            CellValue::Number(n) if self.is_date_format() => {
                format_date_serial(*n, self.format_string())
                    .unwrap_or_else(|| format_general(*n))
            }
            other => other.to_string(),
        }
    }
}

fn builtin_format_string(id: u32) -> &'static str {
    match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yyyy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yyyy h:mm",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        49 => "@",
        _ => "General",
    }
}

fn first_section(code: &str) -> &str {
    code.split(';').next().unwrap_or(code)
}

/// Remove quoted literals, bracketed sections and escaped characters.
fn strip_literals(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '[' => {
                for q in chars.by_ref() {
                    if q == ']' {
                        break;
                    }
                }
            }
            '\\' => {
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Spreadsheet day zero (serial 0), with the 1900 leap-year bug folded in.
fn epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert a date serial to a date-time.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor();
    let mut seconds = ((serial - days) * 86_400.0).round() as u32;
    let mut days = days as u64;
    if seconds >= 86_400 {
        seconds -= 86_400;
        days += 1;
    }
    let date = epoch()?.checked_add_days(Days::new(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(NaiveDateTime::new(date, time))
}

/// Date serial as ISO `YYYY-MM-DD` text.
pub fn serial_to_iso_date(serial: f64) -> Option<String> {
    serial_to_datetime(serial).map(|dt| dt.format("%Y-%m-%d").to_string())
}

const MONTHS: [&str; 12] = [
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

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Year(usize),
    Month(usize),
    Minute(usize),
    Day(usize),
    Hour(usize),
    Second(usize),
    AmPm,
    Literal(String),
}

fn tokenize(code: &str) -> Vec<Token> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let lower = c.to_ascii_lowercase();
        match lower {
            'y' | 'm' | 'd' | 'h' | 's' => {
                let start = i;
                while i < chars.len() && chars[i].to_ascii_lowercase() == lower {
                    i += 1;
                }
                let n = i - start;
                tokens.push(match lower {
                    'y' => Token::Year(n),
                    'm' => Token::Month(n),
                    'd' => Token::Day(n),
                    'h' => Token::Hour(n),
                    _ => Token::Second(n),
                });
                continue;
            }
            'a' if chars[i..].iter().take(5).collect::<String>().eq_ignore_ascii_case("am/pm") => {
                tokens.push(Token::AmPm);
                i += 5;
                continue;
            }
            '"' => {
                let mut lit = String::new();
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    lit.push(chars[i]);
                    i += 1;
                }
                tokens.push(Token::Literal(lit));
            }
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    tokens.push(Token::Literal(next.to_string()));
                }
                i += 1;
            }
            _ => tokens.push(Token::Literal(c.to_string())),
        }
        i += 1;
    }

    // `m` right after an hour or right before a second means minutes
    for idx in 0..tokens.len() {
        if let Token::Month(n) = tokens[idx] {
            let prev_is_hour = tokens[..idx]
                .iter()
                .rev()
                .find(|t| !matches!(t, Token::Literal(_)))
                .is_some_and(|t| matches!(t, Token::Hour(_)));
            let next_is_second = tokens[idx + 1..]
                .iter()
                .find(|t| !matches!(t, Token::Literal(_)))
                .is_some_and(|t| matches!(t, Token::Second(_)));
            if prev_is_hour || next_is_second {
                tokens[idx] = Token::Minute(n);
            }
        }
    }

    tokens
}

/// Render a date serial through a date format code.
///
/// Returns `None` when the serial is outside the representable range.
pub fn format_date_serial(serial: f64, code: &str) -> Option<String> {
    let dt = serial_to_datetime(serial)?;
    let tokens = tokenize(first_section(code));
    let twelve_hour = tokens.contains(&Token::AmPm);
    let mut out = String::new();

    for token in tokens {
        match token {
            Token::Year(n) if n <= 2 => out.push_str(&format!("{:02}", dt.year() % 100)),
            Token::Year(_) => out.push_str(&format!("{:04}", dt.year())),
            Token::Month(1) => out.push_str(&dt.month().to_string()),
            Token::Month(2) => out.push_str(&format!("{:02}", dt.month())),
            Token::Month(3) => out.push_str(&MONTHS[dt.month0() as usize][..3]),
            Token::Month(4) => out.push_str(MONTHS[dt.month0() as usize]),
            Token::Month(_) => out.push_str(&MONTHS[dt.month0() as usize][..1]),
            Token::Day(1) => out.push_str(&dt.day().to_string()),
            Token::Day(2) => out.push_str(&format!("{:02}", dt.day())),
            Token::Day(3) => {
                out.push_str(&WEEKDAYS[dt.weekday().num_days_from_monday() as usize][..3])
            }
            Token::Day(_) => {
                out.push_str(WEEKDAYS[dt.weekday().num_days_from_monday() as usize])
            }
            Token::Hour(n) => {
                let hour = if twelve_hour {
                    match dt.hour() % 12 {
                        0 => 12,
                        h => h,
                    }
                } else {
                    dt.hour()
                };
                if n >= 2 {
                    out.push_str(&format!("{:02}", hour));
                } else {
                    out.push_str(&hour.to_string());
                }
            }
            Token::Minute(1) => out.push_str(&dt.minute().to_string()),
            Token::Minute(_) => out.push_str(&format!("{:02}", dt.minute())),
            Token::Second(1) => out.push_str(&dt.second().to_string()),
            Token::Second(_) => out.push_str(&format!("{:02}", dt.second())),
            Token::AmPm => out.push_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            Token::Literal(s) => out.push_str(&s),
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_date_format() {
        assert!(NumberFormat::BuiltIn(14).is_date_format());
        assert!(NumberFormat::BuiltIn(22).is_date_format());
        assert!(!NumberFormat::BuiltIn(2).is_date_format());
        assert!(!NumberFormat::General.is_date_format());
        assert!(NumberFormat::from_string("dd/mm/yyyy").is_date_format());
        assert!(NumberFormat::from_string("[$-409]mmm d, yyyy").is_date_format());
        assert!(!NumberFormat::from_string("0.00\"days\"").is_date_format());
        assert!(!NumberFormat::from_string("#,##0").is_date_format());
    }

    #[test]
    fn test_from_id_zero_is_general() {
        assert_eq!(NumberFormat::from_id(0), NumberFormat::General);
        assert_eq!(NumberFormat::from_id(14), NumberFormat::BuiltIn(14));
    }

    #[test]
    fn test_serial_to_iso_date() {
        assert_eq!(serial_to_iso_date(45292.0).as_deref(), Some("2024-01-01"));
        assert_eq!(serial_to_iso_date(1.0).as_deref(), Some("1899-12-31"));
        assert_eq!(serial_to_iso_date(61.0).as_deref(), Some("1900-03-01"));
        assert_eq!(serial_to_iso_date(-1.0), None);
        assert_eq!(serial_to_iso_date(f64::NAN), None);
    }

    #[test]
    fn test_format_short_date() {
        let fmt = NumberFormat::BuiltIn(14);
        assert_eq!(fmt.format_value(&CellValue::Number(45306.0)), "1/15/2024");
        assert_eq!(fmt.format_value(&CellValue::Number(45580.0)), "10/15/2024");
    }

    #[test]
    fn test_format_custom_codes() {
        assert_eq!(
            format_date_serial(45306.0, "dd-mm-yyyy").as_deref(),
            Some("15-01-2024")
        );
        assert_eq!(
            format_date_serial(45306.0, "d-mmm-yy").as_deref(),
            Some("15-Jan-24")
        );
        assert_eq!(
            format_date_serial(45306.75, "h:mm AM/PM").as_deref(),
            Some("6:00 PM")
        );
        assert_eq!(
            format_date_serial(45306.5, "yyyy-mm-dd hh:mm:ss").as_deref(),
            Some("2024-01-15 12:00:00")
        );
    }

    #[test]
    fn test_non_date_values_render_general() {
        let fmt = NumberFormat::BuiltIn(2);
        assert_eq!(fmt.format_value(&CellValue::Number(45306.0)), "45306");
        assert_eq!(fmt.format_value(&CellValue::from("abc")), "abc");
    }
}
