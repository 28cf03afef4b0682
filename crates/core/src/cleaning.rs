use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

// Allow-list: word characters, whitespace, CJK ideographs, and a fixed
// punctuation set (including full-width parentheses).
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s\u{4e00}-\u{9fff}.,!?;:()（）\-_]").expect("allow-list pattern compiles")
});

/// Normalizes raw extracted text: strips everything outside the
/// allow-list, collapses whitespace runs to a single space, trims the
/// ends. Stripping runs first so a removed character between two
/// spaces cannot leave a double space behind; the result is a fixpoint
/// of the function. Empty input stays empty.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let filtered = DISALLOWED.replace_all(text, "");
    let collapsed = WHITESPACE_RUN.replace_all(&filtered, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::clean_text;

    #[test]
    fn whitespace_runs_collapse_to_single_spaces() {
        assert_eq!(clean_text("A  \t  lot\nof   spacing"), "A lot of spacing");
    }

    #[test]
    fn disallowed_characters_are_stripped() {
        assert_eq!(clean_text("price: $40 @ 50% *off*"), "price: 40 50 off");
    }

    #[test]
    fn stripping_between_spaces_does_not_break_idempotence() {
        let once = clean_text("a $ b");
        assert_eq!(once, "a b");
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn unicode_word_characters_survive() {
        // \w is unicode-aware in the regex crate, so accented letters stay.
        assert_eq!(clean_text("héllo   world!!\n"), "héllo world!!");
    }

    #[test]
    fn cjk_ideographs_and_fullwidth_parens_survive() {
        assert_eq!(clean_text("停机时间（分析）报告"), "停机时间（分析）报告");
    }

    #[test]
    fn empty_input_returns_empty_output() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n\t "), "");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = clean_text("  mixed \u{00a0} content… 中文 (ok) ");
        let twice = clean_text(&once);
        assert_eq!(once, twice);
    }
}
