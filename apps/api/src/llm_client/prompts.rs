// Cross-cutting prompt fragments. Feature modules keep their own prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON (no text, comments, or markdown).";

/// Renders a list for a prompt, or `None` when empty.
pub fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_or_none() {
        assert_eq!(list_or_none(&[]), "None");
        assert_eq!(
            list_or_none(&["Rust".to_string(), "SQL".to_string()]),
            "Rust, SQL"
        );
    }
}
