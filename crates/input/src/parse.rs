//! Comma-separated number entry.

use tracing::debug;

use crate::error::InputError;

/// Parse `"5, 3, 1"` into `[5, 3, 1]`.
///
/// Whitespace around each item is ignored. The whole input is rejected if any
/// item fails to parse; nothing partial is returned.
pub fn parse_numbers(text: &str) -> Result<Vec<i32>, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }

    let values = text
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, token)| {
            token.parse::<i32>().map_err(|_| InputError::InvalidNumber {
                index,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = values.len(), "Parsed number list");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_surrounding_whitespace() {
        assert_eq!(parse_numbers("5,3,1").unwrap(), vec![5, 3, 1]);
        assert_eq!(parse_numbers("  5 , -3,\t1 ").unwrap(), vec![5, -3, 1]);
        assert_eq!(parse_numbers("42").unwrap(), vec![42]);
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_numbers(""), Err(InputError::Empty));
        assert_eq!(parse_numbers("   \n"), Err(InputError::Empty));
    }

    #[test]
    fn bad_token_reports_position() {
        assert_eq!(
            parse_numbers("1, two, 3"),
            Err(InputError::InvalidNumber {
                index: 1,
                token: "two".into()
            })
        );
        // Trailing separator leaves an empty item.
        assert_eq!(
            parse_numbers("1,2,"),
            Err(InputError::InvalidNumber {
                index: 2,
                token: String::new()
            })
        );
        assert!(matches!(
            parse_numbers("1.5"),
            Err(InputError::InvalidNumber { index: 0, .. })
        ));
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(parse_numbers("2147483648").is_err());
        assert_eq!(parse_numbers("-2147483648").unwrap(), vec![i32::MIN]);
    }
}
