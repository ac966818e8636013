//! Parsing of similarity cells from the transition table.
//!
//! Remaining-item similarities arrive as text such as `"[0.12 0.5  0.03]"`.
//! They are parsed exactly once, here, into numeric values. Missing values
//! (blank cells, `nan` tokens) count as similarity 0; a blank list is an
//! empty list, i.e. no competitors.

use crate::error::{CueFitError, CueFitResult};
use crate::types::SimilarityList;

/// Parse a scalar similarity cell.
///
/// Blank and `nan` cells are treated as 0.0.
pub fn parse_similarity(text: &str) -> CueFitResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    parse_token(trimmed)
}

/// Parse a bracketed, whitespace or comma delimited list of similarities.
///
/// Accepts `"[0.1 0.2]"`, `"0.1, 0.2"`, `"[ ]"`, `""`, and nested brackets
/// such as `"[[0.1 0.2]]"`. Empty input yields an empty vector.
pub fn parse_similarity_list(text: &str) -> CueFitResult<SimilarityList> {
    text.split(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | ','))
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> CueFitResult<f64> {
    let value: f64 = token
        .parse()
        .map_err(|_| CueFitError::parse(format!("'{}' is not a number", token)))?;

    if value.is_nan() {
        return Ok(0.0);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_list() {
        let values = parse_similarity_list("[0.12 0.5  0.03]").unwrap();
        assert_eq!(values, vec![0.12, 0.5, 0.03]);
    }

    #[test]
    fn test_comma_and_newline_delimited() {
        let values = parse_similarity_list("[0.1,0.2,\n 0.3]").unwrap();
        assert_eq!(values, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_scientific_notation() {
        let values = parse_similarity_list("[1e-3 2.5E-1]").unwrap();
        assert_eq!(values, vec![0.001, 0.25]);
    }

    #[test]
    fn test_empty_inputs_yield_empty_list() {
        for text in ["", " ", "[]", "[ ]", "  [  ]  ", "[[]]"] {
            assert!(
                parse_similarity_list(text).unwrap().is_empty(),
                "expected empty list for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_nan_tokens_are_zero() {
        let values = parse_similarity_list("[0.4 nan NaN]").unwrap();
        assert_eq!(values, vec![0.4, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_token_is_parse_error() {
        let err = parse_similarity_list("[0.4 abc]").unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert_eq!(err.code(), crate::error::ErrorCode::ParseInvalidNumber);
    }

    #[test]
    fn test_scalar_blank_and_nan() {
        assert_eq!(parse_similarity("").unwrap(), 0.0);
        assert_eq!(parse_similarity("  ").unwrap(), 0.0);
        assert_eq!(parse_similarity("nan").unwrap(), 0.0);
        assert_eq!(parse_similarity(" 0.75 ").unwrap(), 0.75);
        assert!(parse_similarity("high").is_err());
    }
}
