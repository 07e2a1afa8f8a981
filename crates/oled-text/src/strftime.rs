//! strftime-style token translation for clock widgets (spec.md §4.8, §9).
//!
//! Widgets accept strftime tokens (`%H,%M,%S,%I,%p,%Y,%m,%d,%e,%l`) in their
//! `text.format` string. This module formats a broken-down wall-clock time
//! against those tokens without depending on a datetime crate -- the core
//! only needs a handful of fields, which callers supply directly rather than
//! this crate depending on a system clock.

/// The minimal broken-down time a clock widget formats from. Callers are
/// responsible for deriving this from whatever system time source they use;
/// this crate performs no clock reads itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub year: i32,
    pub month: u32,  // 1..=12
    pub day: u32,    // 1..=31
    pub hour: u32,   // 0..=23
    pub minute: u32, // 0..=59
    pub second: u32, // 0..=59
}

impl WallTime {
    pub fn hour12(&self) -> u32 {
        let h = self.hour % 12;
        if h == 0 { 12 } else { h }
    }

    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }
}

/// Translates strftime tokens in `format` against `time`. Unknown `%x`
/// sequences pass through verbatim (spec.md §9).
pub fn format_strftime(format: &str, time: &WallTime) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('H') => out.push_str(&format!("{:02}", time.hour)),
            Some('M') => out.push_str(&format!("{:02}", time.minute)),
            Some('S') => out.push_str(&format!("{:02}", time.second)),
            Some('I') => out.push_str(&format!("{:02}", time.hour12())),
            Some('l') => out.push_str(&format!("{:2}", time.hour12())),
            Some('p') => out.push_str(if time.is_pm() { "PM" } else { "AM" }),
            Some('Y') => out.push_str(&format!("{:04}", time.year)),
            Some('m') => out.push_str(&format!("{:02}", time.month)),
            Some('d') => out.push_str(&format!("{:02}", time.day)),
            Some('e') => out.push_str(&format!("{:2}", time.day)),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WallTime {
        WallTime { year: 2026, month: 7, day: 30, hour: 14, minute: 5, second: 9 }
    }

    #[test]
    fn formats_24_hour_clock() {
        assert_eq!(format_strftime("%H:%M:%S", &sample()), "14:05:09");
    }

    #[test]
    fn formats_12_hour_clock_with_ampm() {
        assert_eq!(format_strftime("%I:%M %p", &sample()), "02:05 PM");
    }

    #[test]
    fn unknown_tokens_pass_through_verbatim() {
        assert_eq!(format_strftime("%H%q", &sample()), "14%q");
    }

    #[test]
    fn formats_date_tokens() {
        assert_eq!(format_strftime("%Y-%m-%d", &sample()), "2026-07-30");
    }

    #[test]
    fn noon_and_midnight_map_to_twelve() {
        let noon = WallTime { hour: 12, ..sample() };
        let midnight = WallTime { hour: 0, ..sample() };
        assert_eq!(noon.hour12(), 12);
        assert_eq!(midnight.hour12(), 12);
        assert!(noon.is_pm());
        assert!(!midnight.is_pm());
    }
}
