use std::sync::Arc;

use teloxide::prelude::*;

use tokio::time::sleep;

use modbot_core::domain::UserId;

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> anyhow::Result<()> {
    let (cmd, _args) = parse_command(msg.text().unwrap_or(""));

    match cmd.as_str() {
        "start" => handle_start(bot, msg).await,
        "list" => handle_list(bot, msg, state).await,
        // Unknown slash commands are ignored rather than turned into proposals.
        _ => Ok(()),
    }
}

async fn handle_start(bot: Bot, msg: Message) -> anyhow::Result<()> {
    let name = msg
        .from()
        .map(|u| u.first_name.clone())
        .unwrap_or_else(|| "there".to_string());

    let welcome = format!(
        "👋 Hi {name}!\n\n\
         I collect suggestions for the channel. Just send your proposal here \
         (text or a photo) and I'll pass it on for review."
    );
    let _ = bot.send_message(msg.chat.id, welcome).await;
    Ok(())
}

/// Privileged audit listing. Non-moderators get no response at all (silent
/// deny). Pages are spaced by the configured delay to stay under gateway
/// rate limits.
async fn handle_list(bot: Bot, msg: Message, state: Arc<AppState>) -> anyhow::Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(pages) = state
        .service
        .list_pages_for(UserId(user.id.0 as i64))
        .await
    else {
        return Ok(());
    };
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            sleep(state.cfg.page_delay).await;
        }
        if let Err(e) = bot.send_message(msg.chat.id, page).await {
            tracing::warn!(error = %e, "failed to send listing page");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_addressed_commands() {
        assert_eq!(parse_command("/list"), ("list".into(), "".into()));
        assert_eq!(parse_command("/LIST@modbot"), ("list".into(), "".into()));
        assert_eq!(
            parse_command("/start some args "),
            ("start".into(), "some args".into())
        );
    }
}
