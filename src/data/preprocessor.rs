// ============================================================
// Layer 4: Text Preprocessor
// ============================================================
// Cleans raw social-media / web text before tokenisation.
//
// Cleaning steps (applied in order, one "pass"):
//   1. Strip URLs, including bare "domain.tld" and short links
//   2. Remove HTML tags
//   3. Remove braille art             (U+2800–U+28FF)
//   4. Remove box-drawing / dingbats  (U+2500–U+27BF)
//   5. Remove kaomoji building glyphs (fixed set)
//   6. Remove emoji (Unicode Emoji property, non-ASCII members)
//   7. Remove @handle mentions
//   8. Newlines → spaces
//   9. Collapse whitespace, trim
//
// A single pass is not idempotent on its own: deleting an emoji
// or a tag can glue two fragments into a new URL or handle
// ("example😀.com" → "example.com"). clean() therefore repeats
// the pass until the text stops changing. Every pass only
// removes characters, so the loop is bounded by the input length.
//
// Reference: regex crate docs (Unicode classes, class set ops)

use regex::Regex;
use std::sync::LazyLock;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:https?://|www\.)?[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(?:/[^\s]*[a-zA-Z0-9/_-])?")
        .expect("valid URL pattern")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid HTML pattern"));

static BRAILLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{2800}-\u{28FF}]+").expect("valid braille pattern"));

static DINGBATS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{2500}-\u{27BF}]+").expect("valid dingbat pattern"));

// ツ ᴥ ꈍ ᴗ ꈊ ・ ω ｀ ´ ╥ ﹏ ⋆ 𝜗 𝜚 ₊ ✩ ‧ ˚ ౨ ৎ 𓂃 ˖ ˳ · (Hebrew points) 𝟑 ᐟ
static KAOMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\u{30C4}\u{1D25}\u{A20D}\u{1D17}\u{A20A}\u{30FB}\u{03C9}\u{FF40}\u{00B4}",
        r"\u{2565}\u{FE4F}\u{22C6}\u{1D717}\u{1D71A}\u{208A}\u{2729}\u{2027}\u{02DA}",
        r"\u{0C68}\u{09CE}\u{13083}\u{02D6}\u{02F3}\u{00B7}\u{05B4}\u{05B6}\u{05B8}",
        r"\u{1D7D1}\u{141F}]+",
    ))
    .expect("valid kaomoji pattern")
});

// ASCII digits, '#' and '*' carry the Emoji property (keycap bases);
// they are excluded so ordinary numbers survive cleaning.
static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Emoji}--[\x00-\x7F]]|[\u{200D}\u{FE0F}\u{20E3}]")
        .expect("valid emoji pattern")
});

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("valid handle pattern"));

static NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("valid newline pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Stateless text cleaner. Kept as a type so the pipeline can hold one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw text string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        normalize(text)
    }
}

/// Clean `text` to its fixpoint under `clean_pass`.
pub fn normalize(text: &str) -> String {
    let mut current = clean_pass(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One ordered application of every cleaning rule.
fn clean_pass(text: &str) -> String {
    let text = URL.replace_all(text, "");
    let text = HTML_TAG.replace_all(&text, "");
    let text = BRAILLE.replace_all(&text, "");
    let text = DINGBATS.replace_all(&text, "");
    let text = KAOMOJI.replace_all(&text, "");
    let text = EMOJI.replace_all(&text, "");
    let text = HANDLE.replace_all(&text, "");
    let text = NEWLINES.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_full_and_bare_urls() {
        assert_eq!(normalize("see https://example.com/path/x now"), "see now");
        assert_eq!(normalize("go to www.site.org"), "go to");
        assert_eq!(normalize("short bit.ly/3xYz9 link"), "short link");
        assert_eq!(normalize("visit example.com today"), "visit today");
    }

    #[test]
    fn test_removes_html_tags() {
        assert_eq!(normalize("<p>hello <b>world</b></p>"), "hello world");
    }

    #[test]
    fn test_removes_decorative_glyphs() {
        assert_eq!(normalize("nice ⠿⠿⠿ art"), "nice art");
        assert_eq!(normalize("box ─│┌ and ✨ stars"), "box and stars");
        assert_eq!(normalize("cute (ツ) face"), "cute () face");
    }

    #[test]
    fn test_removes_emoji_but_keeps_digits() {
        assert_eq!(normalize("great job 🎉🔥 team"), "great job team");
        assert_eq!(normalize("family 👨‍👩‍👧 photo"), "family photo");
        assert_eq!(normalize("meeting at 3pm #1"), "meeting at 3pm #1");
    }

    #[test]
    fn test_removes_handles() {
        assert_eq!(normalize("thanks @some_user for this"), "thanks for this");
    }

    #[test]
    fn test_collapses_newlines_and_whitespace() {
        assert_eq!(normalize("  line one\n\n\nline   two\t\tend  "), "line one line two end");
    }

    #[test]
    fn test_empty_and_decorative_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize("⠿⠿ 🎉 ─── ツ"), "");
    }

    #[test]
    fn test_glued_fragments_are_cleaned_in_one_call() {
        // The emoji removal exposes a bare domain.
        let once = normalize("visit example🎉.com please");
        assert_eq!(once, normalize(&once));
        assert!(!once.contains(".com"));
    }

    #[test]
    fn test_preprocessor_delegates_to_normalize() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hi   <i>there</i>"), "hi there");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_handles_mixed_markup(s in "[a-z@<>./ \n🎉⠿ツ─]{0,64}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert_eq!(once.trim(), once.as_str());
        }
    }
}
