use chrono::NaiveDate;

/// Formats an amount in cents as US dollars, e.g. `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    let dollars = (magnitude / 100).to_string();
    let remainder = magnitude % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{remainder:02}")
}

/// Formats an issue date for tables, e.g. `Oct 18, 2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Renders cents back into the decimal string an amount input expects.
pub fn cents_to_input(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0), "$0.00");
        assert_eq!(format_currency(4550), "$45.50");
        assert_eq!(format_currency(123_456_789), "$1,234,567.89");
        assert_eq!(format_currency(100_000), "$1,000.00");
        assert_eq!(format_currency(-250), "-$2.50");
    }

    #[test]
    fn date_uses_short_month_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 8).expect("valid date");
        assert_eq!(format_date(date), "Oct 8, 2026");
    }

    #[test]
    fn cents_round_trip_to_input_value() {
        assert_eq!(cents_to_input(4550), "45.50");
        assert_eq!(cents_to_input(5), "0.05");
    }
}
