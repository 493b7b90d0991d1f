// Prompts for resume content, cover letters and field enhancement.

use serde_json::Value;

pub const RESUME_BUILDER_SYSTEM: &str = "You are a professional resume builder assistant. \
    Generate well-structured, professional resume content in JSON format.";

pub const COVER_LETTER_SYSTEM: &str = "You are a professional career advisor. \
    Write a compelling cover letter tailored to the job description.";

pub fn enhance_system(field: &str) -> String {
    format!(
        "You are a professional resume editor. Improve this {field} section while maintaining its original meaning."
    )
}

/// Builds the resume-content prompt from whatever the caller supplied.
pub fn resume_prompt(name: Option<&str>, content: Option<&Value>, job_description: &str) -> String {
    let mut prompt = String::from("Create a professional resume based on the following details:\n");

    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("Name: {name}\n"));
    }
    for (label, key) in [
        ("Summary", "summary"),
        ("Experience", "experience"),
        ("Education", "education"),
        ("Skills", "skills"),
    ] {
        if let Some(text) = content.and_then(|c| c.get(key)).and_then(render_value) {
            prompt.push_str(&format!("{label}: {text}\n"));
        }
    }
    if !job_description.trim().is_empty() {
        prompt.push_str(&format!("Job Description: {job_description}\n"));
    }

    prompt.push_str("Please generate a well-structured resume content in JSON format.");
    prompt
}

pub fn cover_letter_prompt(name: &str, content: &Value, job_description: &str) -> String {
    let mut prompt = String::from("Write a compelling cover letter for the following resume details:\n");

    if !name.trim().is_empty() {
        prompt.push_str(&format!("Name: {name}\n"));
    }
    if let Some(summary) = content.get("summary").and_then(render_value) {
        prompt.push_str(&format!("Summary: {summary}\n"));
    }
    if !job_description.trim().is_empty() {
        prompt.push_str(&format!("Job Description: {job_description}\n"));
    }

    prompt.push_str("Make it professional and persuasive.");
    prompt
}

/// Strings verbatim, string lists comma-joined, anything else as compact JSON.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.iter().all(Value::is_string) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resume_prompt_includes_supplied_sections_only() {
        let content = json!({
            "summary": "Systems engineer",
            "skills": ["Rust", "Postgres"],
            "experience": [{"company": "Acme", "role": "SRE"}]
        });
        let prompt = resume_prompt(Some("Ada"), Some(&content), "Build APIs");

        assert!(prompt.contains("Name: Ada\n"));
        assert!(prompt.contains("Summary: Systems engineer\n"));
        assert!(prompt.contains("Skills: Rust, Postgres\n"));
        assert!(prompt.contains(r#"Experience: [{"company":"Acme","role":"SRE"}]"#));
        assert!(prompt.contains("Job Description: Build APIs\n"));
        assert!(!prompt.contains("Education:"));
        assert!(prompt.ends_with("in JSON format."));
    }

    #[test]
    fn test_cover_letter_prompt_without_job_description() {
        let prompt = cover_letter_prompt("Ada", &json!({"summary": "Engineer"}), "");
        assert!(prompt.contains("Summary: Engineer\n"));
        assert!(!prompt.contains("Job Description"));
    }

    #[test]
    fn test_enhance_system_names_field() {
        assert!(enhance_system("summary").contains("Improve this summary section"));
    }
}
