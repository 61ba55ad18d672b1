//! Fixed style-rewrite requests.
//!
//! A `/askai` prompt that exactly matches one of these keys is a rewrite of
//! the supplied content, not a question, and skips trend retrieval.

/// Style key to rewrite instruction.
pub const STYLE_REWRITES: &[(&str, &str)] = &[
    (
        "Make it funnier",
        "Rewrite the following content to be much funnier, using jokes, puns, and a lighthearted tone. If possible, add a witty punchline.",
    ),
    (
        "Make it sound serious",
        "Rewrite the following content to sound very serious, formal, and professional.",
    ),
    (
        "Make it concise",
        "Rewrite the following content to be as concise and brief as possible, without losing the main message.",
    ),
    (
        "Add a call to action",
        "Rewrite the following content and add a strong, clear call to action at the end.",
    ),
    (
        "Make it more engaging",
        "Rewrite the following content to be more engaging and interactive, asking questions or encouraging responses.",
    ),
    (
        "Use slang and lingo",
        "Rewrite the following content using modern slang, internet lingo, and a casual, playful tone.",
    ),
];

/// Instruction for an exact style key. Matching is case-sensitive.
pub fn style_instruction(key: &str) -> Option<&'static str> {
    STYLE_REWRITES
        .iter()
        .find(|(style, _)| *style == key)
        .map(|(_, instruction)| *instruction)
}
