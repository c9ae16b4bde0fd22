//! Locale-aware parsing of amounts and dates from free-text fragments.
//!
//! Scanned policy documents mix Uruguayan numeric conventions (`1.234,56`)
//! with standard ones (`1,234.56`) and several date layouts, often behind
//! label text ("Prima: $ ..."). Both parsers are pure functions over text.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    AMOUNT_BARE, AMOUNT_UY, AMOUNT_UY_GROUPED, AMOUNT_US, AMOUNT_US_GROUPED, DATE_DMY_DASH,
    DATE_DMY_SLASH, DATE_YMD, LABEL_TOKENS,
};
use crate::error::ValueError;

/// Parse a monetary amount out of a text fragment.
///
/// Tries, in order: thousand-dot/decimal-comma, thousand-comma/decimal-dot,
/// grouped integers without decimals, then any bare numeric token. The first
/// matching convention wins.
pub fn parse_amount(text: &str) -> Result<Decimal, ValueError> {
    let cleaned = LABEL_TOKENS.replace_all(text, " ");

    if let Some(caps) = AMOUNT_UY.captures(&cleaned) {
        let integer = caps[1].replace('.', "");
        return decimal_from_parts(&integer, &caps[2], text);
    }

    if let Some(caps) = AMOUNT_US.captures(&cleaned) {
        let integer = caps[1].replace(',', "");
        return decimal_from_parts(&integer, &caps[2], text);
    }

    if let Some(caps) = AMOUNT_UY_GROUPED.captures(&cleaned) {
        let integer = caps[1].replace('.', "");
        return decimal_from_parts(&integer, "00", text);
    }

    if let Some(caps) = AMOUNT_US_GROUPED.captures(&cleaned) {
        let integer = caps[1].replace(',', "");
        return decimal_from_parts(&integer, "00", text);
    }

    if let Some(caps) = AMOUNT_BARE.captures(&cleaned) {
        let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or("0");
        return decimal_from_parts(&caps[1], fraction, text);
    }

    Err(ValueError::NotFound)
}

fn decimal_from_parts(integer: &str, fraction: &str, raw: &str) -> Result<Decimal, ValueError> {
    Decimal::from_str(&format!("{}.{}", integer, fraction))
        .map_err(|_| ValueError::Format(raw.to_string()))
}

/// Parse a calendar date out of a text fragment.
///
/// Tries `DD/MM/YYYY`, `YYYY-MM-DD`, `DD-MM-YYYY` in that order. Two-digit
/// years are normalized to the 2000s.
pub fn parse_date(text: &str) -> Result<NaiveDate, ValueError> {
    if let Some(caps) = DATE_DMY_SLASH.captures(text) {
        if let Some(date) = date_from_dmy(&caps[1], &caps[2], &caps[3]) {
            return Ok(date);
        }
    }

    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
    }

    if let Some(caps) = DATE_DMY_DASH.captures(text) {
        if let Some(date) = date_from_dmy(&caps[1], &caps[2], &caps[3]) {
            return Ok(date);
        }
    }

    Err(ValueError::NotFound)
}

/// Build a date from day/month/year slots.
///
/// Recovery heuristic: OCR occasionally emits the slots in reversed order,
/// so a "day" above 31 paired with a "year" at or below 31 is treated as a
/// swapped pair.
fn date_from_dmy(d: &str, m: &str, y: &str) -> Option<NaiveDate> {
    let mut day: i64 = d.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    let mut year: i64 = y.parse().ok()?;

    if day > 31 && year <= 31 {
        std::mem::swap(&mut day, &mut year);
    }

    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year as i32, month, u32::try_from(day).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_uruguayan_format() {
        assert_eq!(parse_amount("1.234,56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("12.345.678,90"), Ok(dec("12345678.90")));
        assert_eq!(parse_amount("1234,56"), Ok(dec("1234.56")));
    }

    #[test]
    fn test_parse_amount_standard_format() {
        assert_eq!(parse_amount("1,234.56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Ok(dec("1234.56")));
    }

    #[test]
    fn test_both_conventions_agree() {
        assert_eq!(parse_amount("1.234,56"), parse_amount("1,234.56"));
    }

    #[test]
    fn test_parse_amount_strips_labels_and_currency() {
        assert_eq!(parse_amount("Prima: $ 1.234,56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("Total: UYU 45.000"), Ok(dec("45000.00")));
        assert_eq!(parse_amount("U$S 980,00"), Ok(dec("980.00")));
    }

    #[test]
    fn test_parse_amount_bare_fallback() {
        assert_eq!(parse_amount("cuota de 1500"), Ok(dec("1500.0")));
        assert_eq!(parse_amount("45,5"), Ok(dec("45.5")));
    }

    #[test]
    fn test_parse_amount_not_found() {
        assert_eq!(parse_amount("sin datos"), Err(ValueError::NotFound));
        assert_eq!(parse_amount(""), Err(ValueError::NotFound));
    }

    #[test]
    fn test_parse_date_formats_in_order() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("15/01/2024"), Ok(expected));
        assert_eq!(parse_date("2024-01-15"), Ok(expected));
        assert_eq!(parse_date("15-01-2024"), Ok(expected));
    }

    #[test]
    fn test_parse_date_two_digit_year() {
        assert_eq!(
            parse_date("15/01/24"),
            Ok(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_date_embedded_in_text() {
        assert_eq!(
            parse_date("Vigencia desde: 01/07/2024 hasta"),
            Ok(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
        );
    }

    // Recovery heuristic for reversed day/year OCR fields, not a guaranteed
    // business rule.
    #[test]
    fn test_parse_date_day_year_swap_heuristic() {
        assert_eq!(
            parse_date("2024/05/15"),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_parse_date_not_found() {
        assert_eq!(parse_date("no date here"), Err(ValueError::NotFound));
    }

    #[test]
    fn test_parse_date_invalid_calendar_day() {
        assert_eq!(parse_date("32/01/2024"), Err(ValueError::NotFound));
    }
}
