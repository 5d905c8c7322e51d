//! Turning model output into a postable Slack message.

use std::sync::OnceLock;

use regex::Regex;

/// Longest reply posted as-is, in characters.
pub const MAX_REPLY_CHARS: usize = 3000;
/// Truncated replies are cut at or before this offset, leaving room for the notice.
pub const TRUNCATE_AT: usize = MAX_REPLY_CHARS - 100;
pub const TRUNCATION_NOTICE: &str = "\n\n_[Response truncated due to length]_";

pub const EMPTY_RESPONSE: &str = "I couldn't generate a response. Please try again.";
pub const MODEL_ERROR_RESPONSE: &str =
    "I encountered an error while processing your request. Please try again later.";
/// Posted by the compensation path when the workflow itself fails.
pub const APOLOGY: &str = "Sorry, I encountered an error processing your request. Please try again.";

fn bold() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("static regex is valid"))
}

fn bullet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^- ").expect("static regex is valid"))
}

/// Rewrite common Markdown into Slack mrkdwn: `**bold**` becomes `*bold*`
/// and leading `- ` bullets become `• `.
pub fn format_for_slack(text: &str) -> String {
    let text = bullet().replace_all(text, "• ");
    bold().replace_all(&text, "*$1*").into_owned()
}

/// Fit `text` under [`MAX_REPLY_CHARS`].
///
/// Longer text is cut after the last `.` or before the last newline that
/// keeps the kept part within [`TRUNCATE_AT`] characters, then the notice is
/// appended. Without such a boundary the cut is made at `TRUNCATE_AT`.
pub fn truncate_for_slack(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= MAX_REPLY_CHARS {
        return text.to_string();
    }

    let window = &chars[..=TRUNCATE_AT];
    let after_period = window[..TRUNCATE_AT]
        .iter()
        .rposition(|&c| c == '.')
        .map(|i| i + 1);
    let before_newline = window.iter().rposition(|&c| c == '\n');

    let cut = match after_period.max(before_newline) {
        Some(cut) if cut > 0 => cut,
        _ => TRUNCATE_AT,
    };

    let mut out: String = chars[..cut].iter().collect();
    out.push_str(TRUNCATION_NOTICE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_bold_and_bullets_are_converted() {
        let out = format_for_slack("**Summary**\n- first\n- second with **bold**\nnot - a bullet");
        assert_eq!(
            out,
            "*Summary*\n• first\n• second with *bold*\nnot - a bullet"
        );
    }

    #[test]
    fn short_text_is_untouched() {
        let s = "a".repeat(MAX_REPLY_CHARS);
        assert_eq!(truncate_for_slack(&s), s);
    }

    #[test]
    fn long_text_is_cut_after_last_sentence() {
        // sentence ends at index 1999; index 3000 falls inside a word
        let mut s = "a".repeat(1999);
        s.push('.');
        s.push_str(&"b".repeat(1500));
        assert_eq!(s.chars().count(), 3500);

        let out = truncate_for_slack(&s);
        assert_eq!(out, format!("{}.{}", "a".repeat(1999), TRUNCATION_NOTICE));
    }

    #[test]
    fn newline_later_than_period_wins() {
        let mut s = "a".repeat(2400);
        s.push('.');
        s.push_str(&"b".repeat(99));
        s.push('\n');
        s.push_str(&"c".repeat(1000));

        let out = truncate_for_slack(&s);
        let kept = out.strip_suffix(TRUNCATION_NOTICE).unwrap();
        assert_eq!(kept.chars().count(), 2500);
        assert!(kept.ends_with('b'));
    }

    #[test]
    fn boundaries_past_the_cutoff_are_ignored() {
        let mut s = "a".repeat(2950);
        s.push('.');
        s.push_str(&"b".repeat(600));

        let out = truncate_for_slack(&s);
        assert_eq!(out, format!("{}{}", "a".repeat(TRUNCATE_AT), TRUNCATION_NOTICE));
    }

    #[test]
    fn text_without_boundaries_is_hard_cut() {
        let s = "x".repeat(3500);
        let out = truncate_for_slack(&s);
        assert_eq!(out.chars().count(), TRUNCATE_AT + TRUNCATION_NOTICE.chars().count());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let s = "é".repeat(2000);
        assert_eq!(truncate_for_slack(&s), s);
    }
}
