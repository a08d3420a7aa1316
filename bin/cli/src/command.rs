//! Parsing of terminal input into user intents.

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send to the active conversation.
    Send(String),
    /// Start a conversation, optionally with a first message.
    New(Option<String>),
    /// Show all conversations.
    List,
    /// Switch to a conversation by list position or ID.
    Select(String),
    /// Rename a conversation by list position or ID.
    Rename { target: String, title: String },
    /// Delete a conversation by list position or ID.
    Delete(String),
    /// Show the starter prompts.
    Examples,
    /// Start a conversation from a starter prompt (1-based).
    Try(usize),
    /// Show the active conversation again.
    Show,
    /// Show usage.
    Help,
    /// Exit.
    Quit,
    /// A command that could not be understood, with a hint.
    Invalid(String),
    /// Nothing was typed.
    Empty,
}

/// Usage text shown by `/help`.
pub const HELP: &str = "\
Type a message to send it to the active conversation.
  /new [text]            start a conversation (optionally sending text)
  /list                  list conversations, most recent first
  /select <n|id>         switch conversation
  /rename <n|id> <title> rename a conversation
  /delete <n|id>         delete a conversation
  /examples              show starter prompts
  /try <n>               start a conversation from a starter prompt
  /show                  show the active conversation
  /quit                  exit";

impl Command {
    /// Parses one line of input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Send(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "new" => Self::New((!args.is_empty()).then(|| args.to_string())),
            "list" | "ls" => Self::List,
            "select" | "open" => {
                required(args, "/select <n|id>").map_or_else(Self::Invalid, Self::Select)
            }
            "delete" | "rm" => {
                required(args, "/delete <n|id>").map_or_else(Self::Invalid, Self::Delete)
            }
            "rename" => match args.split_once(char::is_whitespace) {
                Some((target, title)) => Self::Rename {
                    target: target.to_string(),
                    title: title.to_string(),
                },
                None => Self::Invalid("usage: /rename <n|id> <title>".to_string()),
            },
            "examples" => Self::Examples,
            "try" => match args.parse::<usize>() {
                Ok(n) if n > 0 => Self::Try(n),
                _ => Self::Invalid("usage: /try <n>".to_string()),
            },
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Invalid(format!("unknown command '/{other}', try /help")),
        }
    }
}

fn required(args: &str, usage: &str) -> Result<String, String> {
    if args.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(args.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent_verbatim() {
        assert_eq!(
            Command::parse("  hello   world\n"),
            Command::Send("  hello   world".to_string())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(Command::parse("   \n"), Command::Empty);
    }

    #[test]
    fn new_with_and_without_seed() {
        assert_eq!(Command::parse("/new"), Command::New(None));
        assert_eq!(
            Command::parse("/new  Tell me a joke "),
            Command::New(Some("Tell me a joke".to_string()))
        );
    }

    #[test]
    fn rename_splits_target_and_title() {
        assert_eq!(
            Command::parse("/rename 2 Weekend plans"),
            Command::Rename {
                target: "2".to_string(),
                title: "Weekend plans".to_string(),
            }
        );
        assert!(matches!(Command::parse("/rename 2"), Command::Invalid(_)));
    }

    #[test]
    fn select_and_delete_need_a_target() {
        assert_eq!(Command::parse("/select conv_1"), Command::Select("conv_1".to_string()));
        assert_eq!(Command::parse("/rm 3"), Command::Delete("3".to_string()));
        assert!(matches!(Command::parse("/select"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/delete  "), Command::Invalid(_)));
    }

    #[test]
    fn try_requires_positive_number() {
        assert_eq!(Command::parse("/try 2"), Command::Try(2));
        assert!(matches!(Command::parse("/try 0"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/try x"), Command::Invalid(_)));
    }

    #[test]
    fn unknown_command_is_invalid() {
        match Command::parse("/frobnicate now") {
            Command::Invalid(hint) => assert!(hint.contains("/frobnicate")),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn quit_aliases() {
        for line in ["/quit", "/exit", "/q"] {
            assert_eq!(Command::parse(line), Command::Quit);
        }
    }
}
