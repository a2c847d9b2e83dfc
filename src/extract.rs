//! Pure derivation of experience and skill fields from description text.

use regex::Regex;

use crate::models::DerivedFields;

/// Skills checked against the description, in output order.
pub const DEFAULT_SKILL_VOCABULARY: &[&str] = &[
    "Python",
    "JavaScript",
    "TypeScript",
    "Java",
    "C++",
    "Go",
    "Rust",
    "React",
    "Node.js",
    "Django",
    "FastAPI",
    "Flask",
    "Spring",
    "SQL",
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "AWS",
    "GCP",
    "Azure",
    "Docker",
    "Kubernetes",
    "Terraform",
    "TensorFlow",
    "PyTorch",
    "scikit-learn",
    "LangChain",
    "LLM",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "RAG",
    "REST",
    "GraphQL",
    "Microservices",
    "CI/CD",
    "Git",
    "Automation",
    "n8n",
    "Zapier",
    "Airflow",
];

/// Keeps the Key Skills column readable.
pub const MAX_SKILLS: usize = 10;

pub fn derive_fields(description: &str, vocabulary: &[String]) -> DerivedFields {
    DerivedFields {
        experience: extract_experience(description),
        skills: extract_skills(description, vocabulary),
    }
}

/// Pulls "1-2 years", "2+ years", etc. from description text. First
/// matching pattern wins.
pub fn extract_experience(text: &str) -> Option<String> {
    let patterns = [
        r"(?i)\b(\d[\d\-–+]*\s*(?:to|-|–)\s*\d+\s*years?)\b",
        r"(?i)\b(\d+\+?\s*years?\s*(?:of\s+)?(?:experience|exp)?)\b",
        r"(?i)\b(fresher|entry[\s-]?level|0[\s-]?to[\s-]?\d+\s*years?)\b",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(captures) = re.captures(text) {
            return Some(captures[1].trim().to_string());
        }
    }
    None
}

/// Scans for whole-word, case-insensitive vocabulary hits. Result keeps
/// vocabulary order, drops duplicates, and is capped at [`MAX_SKILLS`].
pub fn extract_skills(text: &str, vocabulary: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for skill in vocabulary {
        if found.len() == MAX_SKILLS {
            break;
        }
        if found.iter().any(|s| s == skill) {
            continue;
        }
        let mut pattern = format!(r"(?i)\b{}", regex::escape(skill));
        // A trailing \b only works when the term ends in a word character
        // (it never would after "C++" or "CI/CD" followed by a space).
        if skill.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
            pattern.push_str(r"\b");
        }
        let re = Regex::new(&pattern).unwrap();
        if re.is_match(text) {
            found.push(skill.clone());
        }
    }

    found
}
