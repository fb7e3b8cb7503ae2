//! Display formatting shared by the TUI and the CLI.

use chrono::{NaiveDate, NaiveTime};

/// Format a price in reais: `R$ 45` for whole amounts, `R$ 45,50` otherwise.
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    if cents % 100 == 0 {
        format!("R$ {}{}", sign, cents / 100)
    } else {
        format!("R$ {}{},{:02}", sign, cents / 100, cents % 100)
    }
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Short weekday plus `dd/mm`, used for the day picker.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%a %d/%m").to_string()
}

/// `HH:MM`
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn format_duration(minutes: u32) -> String {
    format!("{} min", minutes)
}

/// Progress through the wizard as a whole percentage.
pub fn progress_percent(step: u8, total: u8) -> u16 {
    if total == 0 {
        return 0;
    }
    (u16::from(step) * 100) / u16::from(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(45.0), "R$ 45");
        assert_eq!(format_price(45.5), "R$ 45,50");
        assert_eq!(format_price(0.0), "R$ 0");
        assert_eq!(format_price(29.99), "R$ 29,99");
    }

    #[test]
    fn test_format_negative_price_keeps_sign() {
        assert_eq!(format_price(-0.5), "R$ -0,50");
        assert_eq!(format_price(-12.25), "R$ -12,25");
        assert_eq!(format_price(-10.0), "R$ -10");
    }

    #[test]
    fn test_format_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(format_date(date), "15/01/2024");
        assert_eq!(format_day_label(date), "Mon 15/01");
        let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(format_time(time), "14:30");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(1, 5), 20);
        assert_eq!(progress_percent(5, 5), 100);
        assert_eq!(progress_percent(3, 0), 0);
    }
}
