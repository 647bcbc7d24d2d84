//! Amount normalization service
//!
//! Sources publish the UF in different number conventions ("39224.63",
//! "39.224,63", "39,224.63"). Everything is parsed into `f64` here and
//! rendered back in es-CL style for display.

/// Parse a number written with either separator convention.
///
/// Rules for deciding which separator is the decimal one:
/// - both `.` and `,` present: the last one is decimal
/// - one separator repeated: it is grouping
/// - one separator once: grouping when it follows 1-3 digits and is
///   followed by exactly 3 digits, decimal otherwise
///
/// # Examples
/// - "39.224,63" → 39224.63
/// - "39,224.63" → 39224.63
/// - "$ 39224.63" → 39224.63
/// - "39.224" → 39224.0
/// - "0,5" → 0.5
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = rest.trim_start().trim_start_matches('$').trim();

    if digits.is_empty()
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let canonical = canonicalize(digits)?;
    let value: f64 = canonical.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Strip grouping separators and turn the decimal separator into '.'
fn canonicalize(digits: &str) -> Option<String> {
    let decimal_sep = match (digits.rfind('.'), digits.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) => single_kind_decimal(digits, '.'),
        (None, Some(_)) => single_kind_decimal(digits, ','),
        (None, None) => None,
    };

    let mut out = String::with_capacity(digits.len());
    match decimal_sep {
        Some(sep) => {
            let pos = digits.rfind(sep)?;
            let (int_part, frac_part) = (&digits[..pos], &digits[pos + 1..]);
            // "1.2.3" with '.' as decimal is ambiguous
            if int_part.contains(sep) {
                return None;
            }
            out.extend(int_part.chars().filter(|c| c.is_ascii_digit()));
            if out.is_empty() {
                out.push('0');
            }
            if !frac_part.is_empty() {
                out.push('.');
                out.push_str(frac_part);
            }
        }
        None => out.extend(digits.chars().filter(|c| c.is_ascii_digit())),
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Decide whether a lone separator kind is decimal (Some) or grouping (None)
fn single_kind_decimal(digits: &str, sep: char) -> Option<char> {
    if digits.matches(sep).count() > 1 {
        return None;
    }
    let pos = digits.find(sep)?;
    let int_len = pos;
    let frac_len = digits.len() - pos - 1;

    if (1..=3).contains(&int_len) && frac_len == 3 {
        None
    } else {
        Some(sep)
    }
}

/// Format a value es-CL style: '.' groups thousands, ',' separates decimals.
///
/// # Examples
/// - (39500.12, 2) → "39.500,12"
/// - (1000000.0, 0) → "1.000.000"
/// - (-1234.5, 2) → "-1.234,50"
pub fn format_amount(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    // -0,00 reads as 0,00
    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    let mut out = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Format a value as a peso amount, e.g. "$39.224,63"
pub fn format_currency(value: f64) -> String {
    format!("${}", format_amount(value, 2))
}

/// Round half away from zero to the given number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should parse");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    // ========== Parsing: separator conventions ==========

    #[test]
    fn test_parse_plain_decimal() {
        assert_close(parse_amount("39224.63"), 39224.63);
    }

    #[test]
    fn test_parse_es_cl_format() {
        assert_close(parse_amount("39.224,63"), 39224.63);
    }

    #[test]
    fn test_parse_en_us_format() {
        assert_close(parse_amount("39,224.63"), 39224.63);
    }

    #[test]
    fn test_parse_comma_decimal_only() {
        assert_close(parse_amount("39224,63"), 39224.63);
    }

    #[test]
    fn test_parse_single_group_separator() {
        // "39.224" is thirty-nine thousand in Chile
        assert_close(parse_amount("39.224"), 39224.0);
    }

    #[test]
    fn test_parse_long_integer_part_is_decimal() {
        assert_close(parse_amount("39224.633"), 39224.633);
    }

    #[test]
    fn test_parse_repeated_grouping() {
        assert_close(parse_amount("1.000.000"), 1_000_000.0);
        assert_close(parse_amount("1,000,000"), 1_000_000.0);
    }

    #[test]
    fn test_parse_leading_fraction() {
        assert_close(parse_amount("0,5"), 0.5);
        assert_close(parse_amount(",5"), 0.5);
    }

    // ========== Parsing: decorations ==========

    #[test]
    fn test_parse_currency_symbol_and_spaces() {
        assert_close(parse_amount("  $ 39.224,63 "), 39224.63);
    }

    #[test]
    fn test_parse_negative() {
        assert_close(parse_amount("-1.234,50"), -1234.5);
        assert_close(parse_amount("-$1.234,50"), -1234.5);
    }

    // ========== Parsing: rejects ==========

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$"), None);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("39.224,63 UF"), None);
    }

    #[test]
    fn test_parse_ambiguous_decimal() {
        assert_eq!(parse_amount("1,2.3.4"), None);
    }

    // ========== Formatting ==========

    #[test]
    fn test_format_two_decimals() {
        assert_eq!(format_amount(39500.12, 2), "39.500,12");
    }

    #[test]
    fn test_format_no_decimals() {
        assert_eq!(format_amount(1_000_000.0, 0), "1.000.000");
    }

    #[test]
    fn test_format_small_value() {
        assert_eq!(format_amount(25.4942, 2), "25,49");
        assert_eq!(format_amount(0.0, 2), "0,00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_amount(-1234.5, 2), "-1.234,50");
        assert_eq!(format_amount(-0.001, 2), "0,00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(39224.63), "$39.224,63");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1_000_000.0 / 39224.63, 2), 25.49);
        assert_eq!(round_to(39224.634, 2), 39224.63);
    }

    // ========== Round trip ==========

    #[test]
    fn test_format_then_parse_within_tolerance() {
        for value in [30000.0, 39224.63, 39500.125, 49999.999, 0.01, 1234567.891] {
            let parsed = parse_amount(&format_amount(value, 2)).unwrap();
            assert!(
                (parsed - value).abs() <= 0.01,
                "{} round-tripped to {}",
                value,
                parsed
            );
        }
    }
}
