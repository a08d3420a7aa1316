//! Automatic titles derived from a conversation's first user message.

/// Number of leading words kept in a derived title.
pub const TITLE_WORD_LIMIT: usize = 5;

/// Marker appended when the source text was longer than the title.
pub const TITLE_ELLIPSIS: &str = "...";

/// Derives a title from the first few words of `text`.
///
/// Returns `None` when `text` contains no words.
#[must_use]
pub fn derive_title(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let mut title = words
        .iter()
        .take(TITLE_WORD_LIMIT)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > TITLE_WORD_LIMIT {
        title.push_str(TITLE_ELLIPSIS);
    }
    Some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        assert_eq!(
            derive_title("Explain quantum computing in simple terms, please"),
            Some("Explain quantum computing in simple...".to_string())
        );
    }

    #[test]
    fn exactly_five_words_has_no_ellipsis() {
        assert_eq!(
            derive_title("one two three four five"),
            Some("one two three four five".to_string())
        );
    }

    #[test]
    fn short_text_is_kept() {
        assert_eq!(derive_title("Hello"), Some("Hello".to_string()));
    }

    #[test]
    fn irregular_whitespace_is_collapsed() {
        assert_eq!(
            derive_title("  what\tis\n the  weather "),
            Some("what is the weather".to_string())
        );
    }

    #[test]
    fn blank_text_has_no_title() {
        assert_eq!(derive_title(""), None);
        assert_eq!(derive_title(" \n\t "), None);
    }
}
