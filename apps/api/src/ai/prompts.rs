// Prompt templates for the public AI routes.

use serde_json::Value;

use crate::llm_client::prompts::{list_or_none, JSON_ONLY_INSTRUCTION};

pub struct CandidateDetails<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub target_role: &'a str,
    pub skills: &'a [String],
    pub education: &'a [Value],
    pub experience: &'a [Value],
}

/// Resume drafting prompt for the public generate route.
pub fn generate_resume_prompt(candidate: &CandidateDetails<'_>) -> String {
    format!(
        r#"You are a resume writer. Create an ATS-friendly resume in JSON format.
{json_only} Schema:

{{
  "name": string,
  "title": string,
  "summary": string,
  "experiences": [
    {{ "company": string, "title": string, "start": string, "end": string, "bullets": [string] }}
  ],
  "skills": [string],
  "education": [
    {{ "degree": string, "institute": string, "year": string }}
  ],
  "keywords": [string]
}}

Candidate:
Name: {name}
Title: {title}
Target role: {target_role}
Skills: {skills}
Education: {education}
Experience: {experience}

Instructions:
- Summary: 2-3 sentences with achievements.
- Keywords: ATS-relevant terms as array.
- Bullets: Short, action-oriented.
- Output: Valid JSON only."#,
        json_only = JSON_ONLY_INSTRUCTION,
        name = candidate.name,
        title = candidate.title,
        target_role = candidate.target_role,
        skills = list_or_none(candidate.skills),
        education = json_or_none(candidate.education),
        experience = json_or_none(candidate.experience),
    )
}

/// ATS comparison prompt: job description against resume text.
pub fn ats_check_prompt(job_description: &str, resume: &str) -> String {
    format!(
        r#"You are an ATS consultant. Compare the resume with the Job Description.
{json_only}

{{
  "score": number,
  "matchPercentage": number,
  "missingKeywords": [string],
  "topMatchedKeywords": [string],
  "suggestions": [string]
}}

Job Description:
{job_description}

Resume:
{resume}

Instructions:
- Score: 0-100 based on keyword match and role fit.
- Missing keywords: Terms in JD but not in resume.
- Suggestions: 3-6 actionable improvements.
- Output: Valid JSON only."#,
        json_only = JSON_ONLY_INSTRUCTION,
    )
}

fn json_or_none(items: &[Value]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        Value::Array(items.to_vec()).to_string()
    }
}
