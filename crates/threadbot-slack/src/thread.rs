use crate::directory::UserDirectory;
use crate::mention::resolve_mentions;
use crate::types::ThreadMessage;

/// Render a thread as model context: one `"<name>: <text>"` entry per
/// message, oldest first, separated by blank lines.
///
/// Skips messages without a human author, messages written by the bot (by
/// `bot_user_id`, or by `bot_id` when that is unknown), and the message whose
/// `ts` equals `trigger_ts`. For a warm directory cache
/// the output depends only on the arguments.
pub async fn format_thread_for_model(
    messages: &[ThreadMessage],
    bot_user_id: Option<&str>,
    trigger_ts: Option<&str>,
    directory: &UserDirectory,
) -> String {
    let mut entries = Vec::with_capacity(messages.len());
    for msg in messages {
        let Some(user) = msg.user.as_deref() else {
            continue;
        };
        match bot_user_id {
            Some(bot) if user == bot => continue,
            // Without the bot's own id, anything posted by an app is dropped.
            None if msg.bot_id.is_some() => continue,
            _ => {}
        }
        if trigger_ts.is_some() && msg.ts.as_deref() == trigger_ts {
            continue;
        }

        let name = directory.display_name(user).await;
        let text = resolve_mentions(msg.text.as_deref().unwrap_or(""), directory).await;
        entries.push(format!("{name}: {text}"));
    }
    entries.join("\n\n")
}
