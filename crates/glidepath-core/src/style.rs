//! Numeric readers for computed-style strings.
//!
//! Computed styles come back as strings such as `"12.5px"` or
//! `"matrix(1, 0, 0, 1, 35, 0)"`. Readers never fail: anything that does not
//! parse reads as zero.

/// Read the integral pixel value of a length such as `"12.7px"`.
///
/// Everything after the first `.` is dropped and every remaining non-digit is
/// stripped, so the sign is not preserved (`"-4px"` reads as 4).
pub fn parse_number(raw: &str) -> f64 {
    let integral = raw.split('.').next().unwrap_or("");
    let digits: String = integral.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<f64>().unwrap_or(0.0)
}

/// Read the horizontal translation of a computed `transform` matrix.
///
/// `matrix(a, b, c, d, tx, ty)` yields `tx`; `none` and anything without a
/// fifth component yields zero.
pub fn parse_transform_x(raw: &str) -> f64 {
    raw.split(',').nth(4).map(parse_number).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_px() {
        assert_eq!(parse_number("42px"), 42.0);
        assert_eq!(parse_number("12.7px"), 12.0);
        assert_eq!(parse_number("0px"), 0.0);
    }

    #[test]
    fn test_parse_number_garbage() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("auto"), 0.0);
        assert_eq!(parse_number(".5px"), 0.0);
    }

    #[test]
    fn test_parse_number_drops_sign() {
        assert_eq!(parse_number("-4px"), 4.0);
    }

    #[test]
    fn test_parse_transform_x() {
        assert_eq!(parse_transform_x("matrix(1, 0, 0, 1, 35, 0)"), 35.0);
        assert_eq!(parse_transform_x("matrix(1, 0, 0, 1, 35.6, 0)"), 35.0);
        assert_eq!(parse_transform_x("none"), 0.0);
        assert_eq!(parse_transform_x(""), 0.0);
    }
}
