//! `ADM<year><seq>` numbers shared by applications and admission numbers.
//!
//! Each namespace keeps its own sequence per year. The next number is the
//! current maximum plus one; a unique index catches concurrent writers and the
//! caller retries with a fresh maximum.

/// Bound on insert attempts when a freshly computed number collides.
pub const MAX_NUMBER_ATTEMPTS: u32 = 5;

const PREFIX: &str = "ADM";

/// `ADM2026` for 2026.
pub fn year_prefix(year: i32) -> String {
    format!("{}{}", PREFIX, year)
}

/// Formats a sequence, zero-padded to four digits.
pub fn format_number(year: i32, sequence: u32) -> String {
    format!("{}{:04}", year_prefix(year), sequence)
}

/// Extracts the sequence from a number issued for `year`, if it is one.
pub fn parse_sequence(number: &str, year: i32) -> Option<u32> {
    let rest = number.strip_prefix(&year_prefix(year))?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Next number after the current maximum sequence.
pub fn next_number(year: i32, current_max: Option<u32>) -> String {
    format_number(year, current_max.unwrap_or(0) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_zero_padded() {
        assert_eq!(format_number(2026, 1), "ADM20260001");
        assert_eq!(format_number(2026, 42), "ADM20260042");
        assert_eq!(format_number(2026, 12345), "ADM202612345");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("ADM20260007", 2026), Some(7));
        assert_eq!(parse_sequence("ADM20250007", 2026), None);
        assert_eq!(parse_sequence("ADM2026", 2026), None);
        assert_eq!(parse_sequence("ADM2026X001", 2026), None);
    }

    #[test]
    fn test_next_number_tolerates_gaps() {
        assert_eq!(next_number(2026, None), "ADM20260001");
        assert_eq!(next_number(2026, Some(9)), "ADM20260010");
    }
}
