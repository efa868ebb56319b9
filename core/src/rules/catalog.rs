//! Field validation for products, episodes and user-written content.

use crate::ErrorCode;

/// Title length bound in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Keyword count bound.
pub const MAX_KEYWORDS: usize = 10;

/// Keyword length bound in characters.
pub const MAX_KEYWORD_CHARS: usize = 20;

/// Comment and review length bound in characters.
pub const MAX_CONTENT_CHARS: usize = 1000;

fn title_ok(title: &str) -> bool {
    let chars = title.trim().chars().count();
    chars > 0 && chars <= MAX_TITLE_CHARS
}

/// Validate product title and keywords.
///
/// # Errors
///
/// [`ErrorCode::InvalidProductField`] on an empty or oversized title, too
/// many keywords, or a keyword that is empty, oversized or contains `|`.
pub fn validate_product_fields(title: &str, keywords: &[String]) -> Result<(), ErrorCode> {
    if !title_ok(title) || keywords.len() > MAX_KEYWORDS {
        return Err(ErrorCode::InvalidProductField);
    }
    let bad_keyword = keywords.iter().any(|k| {
        let chars = k.trim().chars().count();
        chars == 0 || chars > MAX_KEYWORD_CHARS || k.contains('|')
    });
    if bad_keyword {
        return Err(ErrorCode::InvalidProductField);
    }
    Ok(())
}

/// Validate an episode title.
///
/// # Errors
///
/// [`ErrorCode::InvalidEpisodeField`] on an empty or oversized title.
pub fn validate_episode_title(title: &str) -> Result<(), ErrorCode> {
    if title_ok(title) {
        Ok(())
    } else {
        Err(ErrorCode::InvalidEpisodeField)
    }
}

/// Validate a comment or review body; returns it trimmed.
///
/// # Errors
///
/// [`ErrorCode::InvalidContent`] when empty or oversized.
pub fn validate_content(body: &str) -> Result<String, ErrorCode> {
    let body = body.trim();
    let chars = body.chars().count();
    if chars == 0 || chars > MAX_CONTENT_CHARS {
        return Err(ErrorCode::InvalidContent);
    }
    Ok(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_fields() {
        let kw = |n: usize| (0..n).map(|i| format!("k{i}")).collect::<Vec<_>>();
        assert!(validate_product_fields("Moonlit Swordsman", &kw(10)).is_ok());
        assert_eq!(
            validate_product_fields("  ", &[]),
            Err(ErrorCode::InvalidProductField)
        );
        assert!(validate_product_fields("t", &kw(11)).is_err());
        assert!(validate_product_fields("t", &["a|b".to_string()]).is_err());
        assert!(validate_product_fields(&"t".repeat(101), &[]).is_err());
    }

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate_content("  nice  "), Ok("nice".to_string()));
        assert_eq!(validate_content(""), Err(ErrorCode::InvalidContent));
    }
}
