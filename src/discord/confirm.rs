use crate::error::DiscordError;
use serenity::client::Context;
use serenity::collector::MessageCollector;
use serenity::model::id::{ChannelId, UserId};
use std::time::Duration;

/// How long a destructive command waits for its confirmation reply.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a confirmation prompt. Mismatch and timeout are user
/// cancellation, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Mismatch(String),
    TimedOut,
}

/// Send `prompt` and wait for the next message from the same author in the
/// same channel, comparing it to `expected` byte-for-byte.
///
/// Single-shot: there is no retry, and a restart while waiting loses the
/// pending operation.
pub async fn confirm(
    ctx: &Context,
    channel: ChannelId,
    author: UserId,
    prompt: &str,
    expected: &str,
) -> Result<Confirmation, DiscordError> {
    channel
        .say(&ctx.http, prompt)
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "send confirmation prompt".to_string(),
            source,
        })?;

    let reply = MessageCollector::new(&ctx.shard)
        .channel_id(channel)
        .author_id(author)
        .timeout(CONFIRMATION_TIMEOUT)
        .await;

    match reply {
        Some(message) => Ok(judge(&message.content, expected)),
        None => Ok(Confirmation::TimedOut),
    }
}

fn judge(reply: &str, expected: &str) -> Confirmation {
    if reply == expected {
        Confirmation::Confirmed
    } else {
        Confirmation::Mismatch(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exact_match_confirms() {
        assert_eq!(judge("CS-301", "CS-301"), Confirmation::Confirmed);
    }

    #[test]
    fn test_case_matters() {
        assert_eq!(
            judge("cs-301", "CS-301"),
            Confirmation::Mismatch("cs-301".to_string())
        );
    }

    #[test]
    fn test_whitespace_matters() {
        assert_eq!(
            judge("CS-301 ", "CS-301"),
            Confirmation::Mismatch("CS-301 ".to_string())
        );
        assert_eq!(
            judge(" CS-301", "CS-301"),
            Confirmation::Mismatch(" CS-301".to_string())
        );
    }

    #[test]
    fn test_any_other_content_aborts() {
        assert_eq!(
            judge("yes", "CS-301"),
            Confirmation::Mismatch("yes".to_string())
        );
    }
}
