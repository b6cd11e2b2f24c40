/// Telegram's per-message text limit, in characters.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Splits `text` into consecutive pieces of at most `max_chars` characters.
///
/// Splits fall on `char` boundaries only; there is no attempt to respect words or lines.
/// Joining the pieces gives back `text`. An empty input yields no chunks and a
/// `max_chars` of zero is treated as one.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multibyte_chars_are_not_split() {
        let text = "héllo wörld ✓✓✓";
        let chunks = chunk_message(text, 4);

        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks[0], "héll");
    }

    #[test]
    fn test_zero_limit_is_treated_as_one() {
        assert_eq!(chunk_message("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_message("", TELEGRAM_MAX_MESSAGE_LEN).is_empty());
    }
}
