use chrono::{Datelike, NaiveDate};

const OVERVIEW_LIMIT: usize = 200;

/// `125` -> `"2h 5m"`. Zero means unknown and is not displayed.
pub fn format_runtime(minutes: u32) -> Option<String> {
    if minutes == 0 {
        return None;
    }
    Some(format!("{}h {}m", minutes / 60, minutes % 60))
}

/// Whole US dollars with en-US digit grouping: `150000000` -> `"$150,000,000"`.
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_rating(vote_average: f64) -> String {
    format!("{vote_average:.1}")
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// `"1999-10-15"` -> `"10/15/1999"`.
pub fn format_release_date(date: &str) -> Option<String> {
    parse_date(date).map(|d| d.format("%-m/%-d/%Y").to_string())
}

pub fn release_year(date: &str) -> Option<i32> {
    parse_date(date).map(|d| d.year())
}

pub fn truncate_overview(overview: &str) -> String {
    if overview.chars().count() <= OVERVIEW_LIMIT {
        return overview.to_string();
    }
    let cut: String = overview.chars().take(OVERVIEW_LIMIT).collect();
    format!("{cut}...")
}
