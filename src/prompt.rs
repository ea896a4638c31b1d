/// System and user messages for one chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Builds the prompt pair for a query. The policy document and the retrieved
/// context share the system message; the user message is the query verbatim.
pub fn assemble(policy: &str, chunks: &[String], query: &str) -> ChatPrompt {
    ChatPrompt {
        system: format!("{}\n\nContext:\n{}", policy, chunks.join("\n")),
        user: query.to_string(),
    }
}
