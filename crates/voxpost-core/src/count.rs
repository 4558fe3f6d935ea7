//! Language-aware effective character counting.
//!
//! Used to gate the AI rewrite on very short transcripts. CJK ideographs and
//! kana/hangul each count as one; a whole run of alphabetic codepoints counts
//! as one word-ish unit, as does a run of decimal digits; punctuation,
//! whitespace, and symbols count as nothing.

use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Blocks counted as CJK: Han (base, extensions, compatibility), Hiragana,
/// Katakana, Hangul syllables and Jamo.
const CJK_BLOCKS: [(u32, u32); 18] = [
    (0x4E00, 0x9FFF),   // CJK Unified Ideographs
    (0x3400, 0x4DBF),   // Extension A
    (0x20000, 0x2A6DF), // Extension B
    (0x2A700, 0x2B73F), // Extension C
    (0x2B740, 0x2B81F), // Extension D
    (0x2B820, 0x2CEAF), // Extension E
    (0x2CEB0, 0x2EBEF), // Extension F
    (0x30000, 0x3134F), // Extension G
    (0x31350, 0x323AF), // Extension H
    (0x2EBF0, 0x2EE5D), // Extension I
    (0xF900, 0xFAFF),   // Compatibility Ideographs
    (0x3040, 0x309F),   // Hiragana
    (0x30A0, 0x30FF),   // Katakana
    (0xAC00, 0xD7A3),   // Hangul Syllables
    (0x1100, 0x11FF),   // Hangul Jamo
    (0x3130, 0x318F),   // Hangul Compatibility Jamo
    (0xA960, 0xA97F),   // Hangul Jamo Extended-A
    (0xD7B0, 0xD7FF),   // Hangul Jamo Extended-B
];

fn is_cjk(ch: char) -> bool {
    let cp = ch as u32;
    CJK_BLOCKS.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Count effective characters in `text`.
///
/// Each CJK codepoint counts individually; a maximal run of non-CJK letters
/// counts as one; a maximal run of decimal digits counts as one; anything
/// else counts zero and terminates any in-progress run. Single forward scan,
/// no lookahead.
pub fn effective_chars(text: &str) -> usize {
    let mut count = 0;
    let mut in_letter_run = false;
    let mut in_digit_run = false;

    for ch in text.chars() {
        if is_cjk(ch) {
            count += 1;
            in_letter_run = false;
            in_digit_run = false;
        } else if ch.general_category() == GeneralCategory::DecimalNumber {
            if !in_digit_run {
                count += 1;
            }
            in_digit_run = true;
            in_letter_run = false;
        } else if ch.is_alphabetic() {
            if !in_letter_run {
                count += 1;
            }
            in_letter_run = true;
            in_digit_run = false;
        } else {
            in_letter_run = false;
            in_digit_run = false;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_cjk_letters_digits() {
        // Two CJK chars + one letter run + one digit run.
        assert_eq!(effective_chars("你好world123"), 4);
    }

    #[test]
    fn test_punctuation_and_whitespace_count_zero() {
        assert_eq!(effective_chars("  , . "), 0);
        assert_eq!(effective_chars(""), 0);
        assert_eq!(effective_chars("！？…"), 0);
    }

    #[test]
    fn test_letter_runs_collapse() {
        assert_eq!(effective_chars("hello"), 1);
        assert_eq!(effective_chars("hello world"), 2);
        assert_eq!(effective_chars("Grüße"), 1);
    }

    #[test]
    fn test_digit_runs_collapse() {
        assert_eq!(effective_chars("123456"), 1);
        assert_eq!(effective_chars("12 34"), 2);
    }

    #[test]
    fn test_letters_and_digits_are_separate_runs() {
        assert_eq!(effective_chars("abc123"), 2);
        assert_eq!(effective_chars("a1b2"), 4);
    }

    #[test]
    fn test_cjk_counts_individually() {
        assert_eq!(effective_chars("明天见"), 3);
        assert_eq!(effective_chars("こんにちは"), 5);
        assert_eq!(effective_chars("안녕"), 2);
    }

    #[test]
    fn test_extension_plane_ideographs_count_individually() {
        // Extension B and Extension I codepoints behave like any Han char.
        assert_eq!(effective_chars("\u{20000}\u{2EBF0}"), 2);
        assert_eq!(effective_chars("ab\u{2EBF0}cd"), 3);
    }

    #[test]
    fn test_cjk_splits_surrounding_runs() {
        // The ideograph breaks the letter run into two units.
        assert_eq!(effective_chars("ab中cd"), 3);
    }

    #[test]
    fn test_symbols_break_runs() {
        assert_eq!(effective_chars("one-two"), 2);
        assert_eq!(effective_chars("v1.2.3"), 4);
    }
}
