//! Starter prompts offered when no conversation is open.

/// Prompts a user can pick to start a conversation.
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "Explain quantum computing in simple terms",
    "How do I make a HTTP request in JavaScript?",
    "Write a poem about artificial intelligence",
    "What are the best practices for React development?",
    "Tell me about the history of the internet",
];
