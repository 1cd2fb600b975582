//! Brazilian-locale formatting of money, dates and month names.

use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Portuguese month names, January first.
const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Formats an amount as Brazilian reais: `R$ 1.234,56`, negatives as
/// `-R$ 1.234,56`. Rounds half away from zero to cents.
#[inline]
#[must_use]
pub fn brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }
    format!("{sign}R$ {grouped},{cents}")
}

/// Formats a date as `dd/MM/yyyy`.
#[inline]
#[must_use]
pub fn date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Portuguese name of `month` (1-12).
#[inline]
#[must_use]
pub fn month_name_pt(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTHS_PT.get(index).copied()
}

/// Parses a user-typed amount, accepting both `1234.56` and the Brazilian
/// `1.234,56` notation.
#[inline]
#[must_use]
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim().trim_start_matches("R$").trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_owned()
    };
    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brl_groups_thousands() {
        assert_eq!(brl(Decimal::new(123_456, 2)), "R$ 1.234,56");
        assert_eq!(brl(Decimal::new(100_000_000, 2)), "R$ 1.000.000,00");
        assert_eq!(brl(Decimal::from(5)), "R$ 5,00");
        assert_eq!(brl(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn brl_negative_and_rounding() {
        assert_eq!(brl(Decimal::new(-123_456, 2)), "-R$ 1.234,56");
        assert_eq!(brl(Decimal::new(10_005, 3)), "R$ 10,01");
        assert_eq!(brl(Decimal::new(-1, 3)), "R$ 0,00");
    }

    #[test]
    fn date_is_day_first() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(date_br(date), "02/01/2025");
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name_pt(1), Some("janeiro"));
        assert_eq!(month_name_pt(3), Some("março"));
        assert_eq!(month_name_pt(12), Some("dezembro"));
        assert_eq!(month_name_pt(0), None);
        assert_eq!(month_name_pt(13), None);
    }

    #[test]
    fn parse_both_notations() {
        assert_eq!(parse_amount("1234.56"), Some(Decimal::new(123_456, 2)));
        assert_eq!(parse_amount("1.234,56"), Some(Decimal::new(123_456, 2)));
        assert_eq!(parse_amount("R$ 40,00"), Some(Decimal::from(40)));
        assert_eq!(parse_amount("abc"), None);
    }
}
