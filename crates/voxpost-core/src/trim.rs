//! Trailing punctuation and emoji trimming.
//!
//! Recognizers like to end an utterance with a period or exclamation mark,
//! and dictated emoji arrive as multi-codepoint sequences (skin-tone
//! modifiers, ZWJ chains, keycaps). This module strips a maximal trailing run
//! of punctuation and emoji so the committed text ends on real content.
//!
//! The scan walks backward one `char` at a time. A `char` is a full Unicode
//! scalar value, so a surrogate pair can never be split here.

use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Full-width CJK punctuation trimmed in addition to the Unicode punctuation
/// categories: comma, period, exclamation, question mark, semicolon,
/// enumeration comma, colon.
const CJK_PUNCTUATION: [char; 7] = ['，', '。', '！', '？', '；', '、', '：'];

/// Emoji code blocks whose codepoints are always removable.
const EMOJI_BLOCKS: [(u32, u32); 8] = [
    (0x1F600, 0x1F64F), // Emoticons
    (0x1F300, 0x1F5FF), // Miscellaneous Symbols and Pictographs
    (0x1F680, 0x1F6FF), // Transport and Map Symbols
    (0x1F900, 0x1F9FF), // Supplemental Symbols and Pictographs
    (0x1FA70, 0x1FAFF), // Symbols and Pictographs Extended-A
    (0x1F1E6, 0x1F1FF), // Regional indicator flags
    (0x2600, 0x26FF),   // Miscellaneous Symbols
    (0x2700, 0x27BF),   // Dingbats
];

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const KEYCAP_COMBINING_MARK: char = '\u{20E3}';

/// Scanner state for keycap sequences like `3️⃣` (digit + selector + U+20E3).
///
/// Removing the enclosing mark arms the scanner to also remove the digit,
/// `#`, or `*` base that precedes it. The window stays open across joiners
/// and variation selectors and closes after any other codepoint, so a bare
/// digit with no enclosing mark to its right is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    AwaitingKeycapBase,
}

fn in_emoji_block(ch: char) -> bool {
    let cp = ch as u32;
    EMOJI_BLOCKS.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Fitzpatrick skin-tone modifiers U+1F3FB..U+1F3FF.
fn is_skin_tone_modifier(ch: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&ch)
}

/// Text/emoji presentation selectors U+FE0E and U+FE0F.
fn is_variation_selector(ch: char) -> bool {
    ch == '\u{FE0E}' || ch == '\u{FE0F}'
}

/// Tag codepoints U+E0020..U+E007F, used by flag/tag sequences.
fn is_tag_codepoint(ch: char) -> bool {
    ('\u{E0020}'..='\u{E007F}').contains(&ch)
}

fn is_keycap_base(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '#' || ch == '*'
}

fn is_punctuation(ch: char) -> bool {
    ch.general_category_group() == GeneralCategoryGroup::Punctuation
        || CJK_PUNCTUATION.contains(&ch)
}

fn is_removable(ch: char, state: ScanState) -> bool {
    if is_punctuation(ch)
        || in_emoji_block(ch)
        || is_skin_tone_modifier(ch)
        || ch == ZERO_WIDTH_JOINER
        || is_variation_selector(ch)
        || is_tag_codepoint(ch)
        || ch == KEYCAP_COMBINING_MARK
    {
        return true;
    }
    state == ScanState::AwaitingKeycapBase && is_keycap_base(ch)
}

/// Strip the maximal trailing run of punctuation and emoji from `text`.
///
/// Returns a prefix subslice of the input; when nothing at the tail is
/// removable (including the empty string) the input comes back unchanged.
/// The scan stops permanently at the first non-removable codepoint, so
/// `"a!b!"` trims to `"a!b"`. Idempotent: `trim_trailing(trim_trailing(s))`
/// equals `trim_trailing(s)`.
pub fn trim_trailing(text: &str) -> &str {
    let mut cut = text.len();
    let mut state = ScanState::Normal;

    for (idx, ch) in text.char_indices().rev() {
        if !is_removable(ch, state) {
            break;
        }
        cut = idx;
        state = if ch == KEYCAP_COMBINING_MARK {
            ScanState::AwaitingKeycapBase
        } else if ch == ZERO_WIDTH_JOINER || is_variation_selector(ch) {
            // Joiners and selectors keep the keycap window open.
            state
        } else {
            ScanState::Normal
        };
    }

    &text[..cut]
}
