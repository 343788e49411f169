use ragchat_types::{Citation, Message, MessageRole};

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Turns successive snapshots of a streaming message into terminal output
///
/// Only the text added since the previous snapshot is emitted. Reasoning is
/// printed dimmed until the first answer text arrives.
#[derive(Debug, Default)]
pub struct Renderer {
    reasoning_shown: usize,
    content_shown: usize,
    in_reasoning: bool,
}

impl Renderer {
    pub fn update(&mut self, message: &Message) -> String {
        let mut out = String::new();

        if self.content_shown == 0 {
            if let Some(new) = message.extra.reasoning.get(self.reasoning_shown..) {
                if !new.is_empty() {
                    if !self.in_reasoning {
                        out.push_str(DIM);
                        self.in_reasoning = true;
                    }
                    out.push_str(new);
                    self.reasoning_shown = message.extra.reasoning.len();
                }
            }
        }

        if let Some(new) = message.content.get(self.content_shown..) {
            if !new.is_empty() {
                if self.in_reasoning {
                    out.push_str(RESET);
                    out.push_str("\n\n");
                    self.in_reasoning = false;
                }
                out.push_str(new);
                self.content_shown = message.content.len();
            }
        }

        out
    }

    /// Close the answer and list its sources
    pub fn finish(&mut self, message: Option<&Message>) -> String {
        let mut out = String::new();
        if self.in_reasoning {
            out.push_str(RESET);
            self.in_reasoning = false;
        }
        out.push('\n');

        if let Some(message) = message {
            if !message.extra.citations.is_empty() {
                out.push_str("\nSources:\n");
                for (i, citation) in message.extra.citations.iter().enumerate() {
                    out.push_str(&format!("  [{}] {}\n", i + 1, citation_label(citation)));
                }
            }
        }
        out
    }
}

fn citation_label(citation: &Citation) -> String {
    let name = citation
        .document_name
        .as_deref()
        .or(citation.document_id.as_deref())
        .or(citation.id.as_deref())
        .unwrap_or("unknown document");

    match citation.score {
        Some(score) => format!("{} (score {:.2})", name, score),
        None => name.to_string(),
    }
}

/// One history entry as a block of text
pub fn history_entry(message: &Message) -> String {
    let speaker = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
    };
    format!("[{}] {}", speaker, message.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(reasoning: &str, content: &str) -> Message {
        let mut message = Message::assistant_placeholder(None, 2);
        message.extra.reasoning = reasoning.to_string();
        message.content = content.to_string();
        message
    }

    #[test]
    fn test_only_new_text_is_emitted() {
        let mut renderer = Renderer::default();
        assert_eq!(renderer.update(&snapshot("", "Hel")), "Hel");
        assert_eq!(renderer.update(&snapshot("", "Hello")), "lo");
        assert_eq!(renderer.update(&snapshot("", "Hello")), "");
    }

    #[test]
    fn test_reasoning_is_dimmed_before_answer() {
        let mut renderer = Renderer::default();
        assert_eq!(renderer.update(&snapshot("Think", "")), format!("{}Think", DIM));
        assert_eq!(renderer.update(&snapshot("Thinking", "")), "ing");
        assert_eq!(
            renderer.update(&snapshot("Thinking", "Yes")),
            format!("{}\n\nYes", RESET)
        );
        assert_eq!(renderer.finish(None), "\n");
    }

    #[test]
    fn test_finish_lists_citations() {
        let mut message = snapshot("", "Answer");
        message.extra.citations = vec![
            Citation {
                document_name: Some("handbook.pdf".into()),
                score: Some(0.912),
                ..Citation::default()
            },
            Citation {
                document_id: Some("doc-7".into()),
                ..Citation::default()
            },
        ];

        let mut renderer = Renderer::default();
        renderer.update(&message);
        let out = renderer.finish(Some(&message));

        assert!(out.contains("[1] handbook.pdf (score 0.91)"));
        assert!(out.contains("[2] doc-7"));
    }
}
