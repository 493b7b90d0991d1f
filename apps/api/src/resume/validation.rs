use serde_json::Value;

use crate::resume::ResumeRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Returns every problem found; an empty list means the request is valid.
///
/// Create requires a name, a content object, a summary and at least one
/// experience entry. Update only rejects values that are present but unusable.
pub fn validate_resume_request(req: &ResumeRequest, mode: ValidationMode) -> Vec<String> {
    let mut errors = Vec::new();

    match (&req.name, mode) {
        (Some(name), _) if name.trim().is_empty() => {
            errors.push("Resume name is required".to_string())
        }
        (None, ValidationMode::Create) => errors.push("Resume name is required".to_string()),
        _ => {}
    }

    let content = req.content.as_ref().filter(|c| !c.is_null());
    match content {
        None if mode == ValidationMode::Create => {
            errors.push("Resume content is required".to_string())
        }
        None => {}
        Some(Value::Object(fields)) => {
            if mode == ValidationMode::Create {
                if !fields.get("summary").is_some_and(is_present) {
                    errors.push("Summary field is required".to_string());
                }
                if !fields.get("experience").is_some_and(is_present) {
                    errors.push("At least one experience entry is required".to_string());
                }
            }
        }
        Some(_) => errors.push("Resume content must be an object".to_string()),
    }

    errors
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(name: Option<&str>, content: Option<Value>) -> ResumeRequest {
        ResumeRequest {
            name: name.map(str::to_string),
            content,
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_create_passes() {
        let req = request(
            Some("Backend"),
            Some(json!({"summary": "Rust engineer", "experience": [{"company": "Acme"}]})),
        );
        assert!(validate_resume_request(&req, ValidationMode::Create).is_empty());
    }

    #[test]
    fn test_empty_create_lists_name_and_content() {
        let errors = validate_resume_request(&request(None, None), ValidationMode::Create);
        assert_eq!(
            errors,
            vec!["Resume name is required", "Resume content is required"]
        );
    }

    #[test]
    fn test_create_requires_summary_and_experience() {
        let req = request(Some("Backend"), Some(json!({"summary": "", "experience": []})));
        let errors = validate_resume_request(&req, ValidationMode::Create);
        assert_eq!(
            errors,
            vec![
                "Summary field is required",
                "At least one experience entry is required"
            ]
        );
    }

    #[test]
    fn test_experience_may_be_free_text() {
        let req = request(
            Some("Backend"),
            Some(json!({"summary": "s", "experience": "5 years at Acme"})),
        );
        assert!(validate_resume_request(&req, ValidationMode::Create).is_empty());
    }

    #[test]
    fn test_update_accepts_partial_content() {
        let req = request(None, Some(json!({"skills": ["Rust"]})));
        assert!(validate_resume_request(&req, ValidationMode::Update).is_empty());
    }

    #[test]
    fn test_update_rejects_blank_name_and_scalar_content() {
        let req = request(Some("  "), Some(json!("text")));
        let errors = validate_resume_request(&req, ValidationMode::Update);
        assert_eq!(
            errors,
            vec!["Resume name is required", "Resume content must be an object"]
        );
    }
}
