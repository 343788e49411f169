/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    New,
    List,
    Switch(String),
    Delete(String),
    Rename { id: String, title: String },
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub const HELP: &str = "\
Type a question to send it. Commands:
  /new                 start a new conversation
  /list                list conversations
  /switch <id>         open a conversation
  /delete <id>         delete a conversation
  /rename <id> <title> rename a conversation
  /quit                exit
Press Ctrl-C while an answer streams to stop it.";

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match (name, args) {
            ("new", _) => Command::New,
            ("list", _) => Command::List,
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            ("switch", id) if !id.is_empty() => Command::Switch(id.to_string()),
            ("delete", id) if !id.is_empty() => Command::Delete(id.to_string()),
            ("rename", args) => match args.split_once(char::is_whitespace) {
                Some((id, title)) if !title.trim().is_empty() => Command::Rename {
                    id: id.to_string(),
                    title: title.trim().to_string(),
                },
                _ => Command::Invalid("usage: /rename <id> <title>".to_string()),
            },
            ("switch" | "delete", _) => Command::Invalid(format!("usage: /{} <id>", name)),
            _ => Command::Invalid(format!("unknown command: /{}", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            Command::parse("  what is our refund policy?\n"),
            Command::Send("what is our refund policy?".to_string())
        );
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse("/new"), Command::New);
        assert_eq!(Command::parse("/list"), Command::List);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/switch c-42"), Command::Switch("c-42".into()));
        assert_eq!(Command::parse("/delete  c-42 "), Command::Delete("c-42".into()));
        assert_eq!(
            Command::parse("/rename c-42 Billing and refunds"),
            Command::Rename {
                id: "c-42".into(),
                title: "Billing and refunds".into()
            }
        );
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(Command::parse("/switch"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/rename c-42"), Command::Invalid(_)));
        assert_eq!(
            Command::parse("/frobnicate"),
            Command::Invalid("unknown command: /frobnicate".into())
        );
    }
}
