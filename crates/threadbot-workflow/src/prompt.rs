use crate::commands::Command;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant analyzing a Slack conversation thread. \
    Provide concise, relevant answers based on the thread context. \
    Format your responses using Slack markdown where appropriate.";

/// User-turn prompt for `command` over the rendered thread `context`.
///
/// `question` is only embedded by the free-form template. `Help` has no
/// prompt and falls through to the free-form one if asked for.
pub fn build_prompt(command: Command, context: &str, question: &str) -> String {
    match command {
        Command::Summarize => format!(
            "Please provide a concise summary of the following Slack thread conversation:\n\n\
             Thread Context:\n{context}\n\n\
             Provide a clear, bullet-point summary of the key topics discussed."
        ),
        Command::ActionItems => format!(
            "Please extract all action items from the following Slack thread:\n\n\
             Thread Context:\n{context}\n\n\
             List all action items, tasks, or commitments mentioned in the conversation. \
             Format as a numbered list with the person responsible (if mentioned)."
        ),
        Command::KeyPoints => format!(
            "Please identify the key discussion points from the following Slack thread:\n\n\
             Thread Context:\n{context}\n\n\
             List the main topics, decisions, and important points discussed. \
             Format as bullet points."
        ),
        Command::Ask | Command::Help => format!(
            "Based on the following Slack thread conversation, please answer the user's question.\n\n\
             Thread Context:\n{context}\n\n\
             User Question: {question}\n\n\
             Please provide a helpful and relevant response based on the thread context."
        ),
    }
}
