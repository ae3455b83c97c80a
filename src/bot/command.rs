// src/bot/command.rs

//! Parsing incoming chat text into commands.

/// A parsed chat message.
///
/// Commands that need an argument carry `None` when it was omitted; the
/// router answers those with a usage hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Info,
    /// `/fetch <url>`
    Fetch(Option<String>),
    /// `/deepseek <question>`, alias `/ask`
    Ask(Option<String>),
    /// `/claude <operation>`, alias `/computer`
    Operate(Option<String>),
    /// A `/command` we do not know.
    Unknown(String),
    /// Plain text.
    Echo(String),
}

impl BotCommand {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(body) = trimmed.strip_prefix('/') else {
            return BotCommand::Echo(text.to_string());
        };

        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        // Group chats address commands as `/help@botname`.
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let rest = (!rest.is_empty()).then(|| rest.to_string());

        match name.as_str() {
            "start" => BotCommand::Start,
            "help" => BotCommand::Help,
            "info" => BotCommand::Info,
            "fetch" => BotCommand::Fetch(
                rest.as_deref()
                    .and_then(|r| r.split_whitespace().next())
                    .map(str::to_string),
            ),
            "deepseek" | "ask" => BotCommand::Ask(rest),
            "claude" | "computer" => BotCommand::Operate(rest),
            _ => BotCommand::Unknown(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_echoed_verbatim() {
        assert_eq!(
            BotCommand::parse("  hi there "),
            BotCommand::Echo("  hi there ".to_string())
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(BotCommand::parse("/start"), BotCommand::Start);
        assert_eq!(BotCommand::parse("/HELP"), BotCommand::Help);
        assert_eq!(BotCommand::parse("/info@petribot"), BotCommand::Info);
    }

    #[test]
    fn fetch_takes_first_argument() {
        assert_eq!(
            BotCommand::parse("/fetch https://example.com extra"),
            BotCommand::Fetch(Some("https://example.com".to_string()))
        );
        assert_eq!(BotCommand::parse("/fetch"), BotCommand::Fetch(None));
    }

    #[test]
    fn aliases_map_to_the_same_command() {
        let q = Some("what is rust?".to_string());
        assert_eq!(BotCommand::parse("/ask what is rust?"), BotCommand::Ask(q.clone()));
        assert_eq!(BotCommand::parse("/deepseek   what is rust?"), BotCommand::Ask(q));

        let op = Some("list files; rm -rf x".to_string());
        assert_eq!(
            BotCommand::parse("/computer list files; rm -rf x"),
            BotCommand::Operate(op.clone())
        );
        assert_eq!(BotCommand::parse("/claude list files; rm -rf x"), BotCommand::Operate(op));
        assert_eq!(BotCommand::parse("/claude   "), BotCommand::Operate(None));
    }

    #[test]
    fn operation_keeps_inner_newlines() {
        assert_eq!(
            BotCommand::parse("/claude first\nsecond"),
            BotCommand::Operate(Some("first\nsecond".to_string()))
        );
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(BotCommand::parse("/nope x"), BotCommand::Unknown("nope".to_string()));
    }
}
