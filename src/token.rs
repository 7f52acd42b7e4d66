/// Estimates tokens as the number of whitespace-delimited words.
///
/// This is a deliberately crude proxy and must stay stable so that stored
/// estimates remain comparable between runs. Word boundaries are Unicode
/// whitespace plus the ASCII information separators `\x1c`..=`\x1f`.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.split(is_word_boundary)
        .filter(|word| !word.is_empty())
        .count()
}

#[inline]
fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\x1c'..='\x1f')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens(" \n\t "), 0);
    }

    #[test]
    fn test_counts_words() {
        assert_eq!(estimate_tokens("hello"), 1);
        assert_eq!(estimate_tokens("hello world"), 2);
        assert_eq!(estimate_tokens("  hello   world  "), 2);
    }

    #[test]
    fn test_punctuation_is_not_split() {
        assert_eq!(estimate_tokens("fn main() { println!(\"hi\"); }"), 5);
    }

    #[test]
    fn test_mixed_whitespace() {
        assert_eq!(estimate_tokens("a\tb\nc\r\nd\u{a0}e\u{2003}f"), 6);
        assert_eq!(estimate_tokens("a\x1cb\x1fc"), 3);
    }

    #[test]
    fn test_large_input() {
        let text = "word ".repeat(100_000);
        assert_eq!(estimate_tokens(&text), 100_000);
    }
}
