//! User-mention tokens (`<@U123>`, `<@U123|label>`) in message text.

use std::sync::OnceLock;

use regex::Regex;

use crate::directory::UserDirectory;

fn mention_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<@([A-Z0-9]+)(?:\|[^>]*)?>").expect("static regex is valid"))
}

struct Token {
    start: usize,
    end: usize,
    user_id: String,
}

fn tokens(text: &str) -> Vec<Token> {
    mention_token()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Token {
                start: whole.start(),
                end: whole.end(),
                user_id: caps[1].to_string(),
            })
        })
        .collect()
}

/// Rebuild `text` with each token replaced by `render(token)`.
async fn rewrite<'a, F, Fut>(text: &'a str, toks: &'a [Token], mut render: F) -> String
where
    F: FnMut(usize, &'a Token) -> Fut,
    Fut: std::future::Future<Output = String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (i, tok) in toks.iter().enumerate() {
        out.push_str(&text[last..tok.start]);
        out.push_str(&render(i, tok).await);
        last = tok.end;
    }
    out.push_str(&text[last..]);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace every user-mention token with `@<display name>`.
pub async fn resolve_mentions(text: &str, directory: &UserDirectory) -> String {
    let toks = tokens(text);
    if toks.is_empty() {
        return text.trim().to_string();
    }
    let resolved = rewrite(text, &toks, move |_, tok| async move {
        format!("@{}", directory.display_name(&tok.user_id).await)
    })
    .await;
    resolved.trim().to_string()
}

/// Normalise mention text into the user's request.
///
/// Tokens naming the bot are removed, other tokens become `@<display name>`,
/// and runs of whitespace collapse to single spaces. When the bot's id is
/// unknown, a token at the very start of the text is assumed to be the bot.
pub async fn extract_intent(
    text: &str,
    bot_user_id: Option<&str>,
    directory: &UserDirectory,
) -> String {
    let toks = tokens(text);
    let leading = text.len() - text.trim_start().len();

    let rewritten = rewrite(text, &toks, move |i, tok| async move {
        let is_bot = match bot_user_id {
            Some(bot) => tok.user_id == bot,
            None => i == 0 && tok.start == leading,
        };
        if is_bot {
            " ".to_string()
        } else {
            format!("@{}", directory.display_name(&tok.user_id).await)
        }
    })
    .await;

    collapse_whitespace(&rewritten)
}
