//! Resume document model: the canonical schema every renderer and editor works from.
//!
//! Input arrives as loosely-shaped JSON (generation payloads, submitted form state).
//! `normalize` never fails: absent fields become empty strings, absent collections
//! become empty vectors, and scalar values of the wrong JSON type are coerced to text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::section::SectionKey;

/// Shown in place of an empty summary.
pub const DEFAULT_SUMMARY: &str =
    "A passionate software engineer eager to contribute expertise to innovative projects.";

// ────────────────────────────────────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal_information: PersonalInformation,
    pub summary: String,
    pub skills: Vec<Flexible<SkillEntry>>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<Flexible<CertificationEntry>>,
    pub projects: Vec<Flexible<ProjectEntry>>,
    pub achievements: Vec<AchievementEntry>,
    pub languages: Vec<Flexible<LanguageEntry>>,
    pub interests: Vec<Flexible<InterestEntry>>,
}

impl ResumeDocument {
    /// The summary as displayed: the stored text, or the canned sentence when empty.
    pub fn summary_or_default(&self) -> &str {
        if self.summary.trim().is_empty() {
            DEFAULT_SUMMARY
        } else {
            &self.summary
        }
    }

    /// Number of stored entries in a collection, before any display filtering.
    pub fn entry_count(&self, key: SectionKey) -> usize {
        match key {
            SectionKey::Skills => self.skills.len(),
            SectionKey::Experience => self.experience.len(),
            SectionKey::Education => self.education.len(),
            SectionKey::Certifications => self.certifications.len(),
            SectionKey::Projects => self.projects.len(),
            SectionKey::Achievements => self.achievements.len(),
            SectionKey::Languages => self.languages.len(),
            SectionKey::Interests => self.interests.len(),
        }
    }

    /// Achievements that carry a title. Untitled entries stay stored but are never shown.
    pub fn displayable_achievements(&self) -> impl Iterator<Item = &AchievementEntry> {
        self.achievements.iter().filter(|a| a.is_displayable())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInformation {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub location: String,
    pub git_hub: String,
    #[serde(alias = "linkedin")]
    pub linked_in: String,
    pub portfolio: String,
    /// Remote URL or inline `data:` URL.
    pub profile_photo: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub title: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub title: String,
    pub issuing_organization: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    pub technologies_used: Technologies,
    pub github_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub duration: String,
    pub responsibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub degree: String,
    pub university: String,
    pub location: String,
    pub graduation_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementEntry {
    pub title: String,
    pub year: String,
    pub extra_information: String,
}

impl AchievementEntry {
    pub fn is_displayable(&self) -> bool {
        !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageEntry {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestEntry {
    pub name: String,
}

/// `technologiesUsed` as supplied: a single string or a list.
/// The stored shape is kept; display goes through `joined`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Technologies {
    One(String),
    Many(Vec<String>),
}

impl Default for Technologies {
    fn default() -> Self {
        Technologies::One(String::new())
    }
}

impl Technologies {
    pub fn joined(&self) -> String {
        match self {
            Technologies::One(s) => s.clone(),
            Technologies::Many(items) => items.join(", "),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Technologies::One(s) => s.is_empty(),
            Technologies::Many(items) => items.is_empty(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entries that may arrive as bare strings
// ────────────────────────────────────────────────────────────────────────────

/// Entries whose display label comes from one field (`title` or `name`).
pub trait Labelled {
    fn label(&self) -> &str;
}

impl Labelled for SkillEntry {
    fn label(&self) -> &str {
        &self.title
    }
}

impl Labelled for CertificationEntry {
    fn label(&self) -> &str {
        &self.title
    }
}

impl Labelled for ProjectEntry {
    fn label(&self) -> &str {
        &self.title
    }
}

impl Labelled for LanguageEntry {
    fn label(&self) -> &str {
        &self.name
    }
}

impl Labelled for InterestEntry {
    fn label(&self) -> &str {
        &self.name
    }
}

/// A structured entry, or a legacy bare string standing in for its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flexible<T> {
    Full(T),
    Bare(String),
}

impl<T: Labelled> Flexible<T> {
    /// `title ?? name ?? raw`: both shapes render through this.
    pub fn label(&self) -> &str {
        match self {
            Flexible::Full(entry) => entry.label(),
            Flexible::Bare(raw) => raw,
        }
    }
}

impl<T> Flexible<T> {
    pub fn full(&self) -> Option<&T> {
        match self {
            Flexible::Full(entry) => Some(entry),
            Flexible::Bare(_) => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Builds a `ResumeDocument` from any JSON value, applying the defaulting rules
/// recursively. Non-object input yields the all-default document.
pub fn normalize(raw: &Value) -> ResumeDocument {
    let Some(obj) = raw.as_object() else {
        return ResumeDocument::default();
    };

    ResumeDocument {
        personal_information: personal_information(obj.get("personalInformation")),
        summary: text(obj.get("summary")),
        skills: list(obj, SectionKey::Skills, |v| {
            flexible(v, |o| SkillEntry {
                title: text(o.get("title")),
                level: text(o.get("level")),
            })
        }),
        experience: list(obj, SectionKey::Experience, |v| {
            let o = fields(v);
            ExperienceEntry {
                job_title: text(o.get("jobTitle")),
                company: text(o.get("company")),
                location: text(o.get("location")),
                duration: text(o.get("duration")),
                responsibility: text(o.get("responsibility")),
            }
        }),
        education: list(obj, SectionKey::Education, |v| {
            let o = fields(v);
            EducationEntry {
                degree: text(o.get("degree")),
                university: text(o.get("university")),
                location: text(o.get("location")),
                graduation_year: text(o.get("graduationYear")),
            }
        }),
        certifications: list(obj, SectionKey::Certifications, |v| {
            flexible(v, |o| CertificationEntry {
                title: text(o.get("title")),
                issuing_organization: text(o.get("issuingOrganization")),
                year: text(o.get("year")),
            })
        }),
        projects: list(obj, SectionKey::Projects, |v| {
            flexible(v, |o| ProjectEntry {
                title: text(o.get("title")),
                description: text(o.get("description")),
                technologies_used: technologies(o.get("technologiesUsed")),
                github_link: text(o.get("githubLink")),
            })
        }),
        achievements: list(obj, SectionKey::Achievements, |v| {
            let o = fields(v);
            AchievementEntry {
                title: text(o.get("title")),
                year: text(o.get("year")),
                extra_information: text(o.get("extraInformation")),
            }
        }),
        languages: list(obj, SectionKey::Languages, |v| {
            flexible(v, |o| LanguageEntry {
                name: text(o.get("name")),
            })
        }),
        interests: list(obj, SectionKey::Interests, |v| {
            flexible(v, |o| InterestEntry {
                name: text(o.get("name")),
            })
        }),
    }
}

fn personal_information(value: Option<&Value>) -> PersonalInformation {
    let o = value.and_then(Value::as_object).cloned().unwrap_or_default();
    let linked_in = match o.get("linkedIn") {
        Some(v) if !text(Some(v)).is_empty() => text(Some(v)),
        _ => text(o.get("linkedin")),
    };

    PersonalInformation {
        full_name: text(o.get("fullName")),
        email: text(o.get("email")),
        phone_number: text(o.get("phoneNumber")),
        location: text(o.get("location")),
        git_hub: text(o.get("gitHub")),
        linked_in,
        portfolio: text(o.get("portfolio")),
        profile_photo: text(o.get("profilePhoto")),
    }
}

/// Coerces a scalar to display text. `null`, arrays and objects become empty.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn technologies(value: Option<&Value>) -> Technologies {
    match value {
        Some(Value::Array(items)) => {
            Technologies::Many(items.iter().map(|v| text(Some(v))).collect())
        }
        other => Technologies::One(text(other)),
    }
}

fn fields(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn flexible<T>(value: &Value, build: impl Fn(&Map<String, Value>) -> T) -> Flexible<T> {
    match value {
        Value::Object(o) => Flexible::Full(build(o)),
        Value::String(s) => Flexible::Bare(s.clone()),
        Value::Number(_) | Value::Bool(_) => Flexible::Bare(text(Some(value))),
        _ => Flexible::Full(build(&Map::new())),
    }
}

fn list<T>(obj: &Map<String, Value>, key: SectionKey, build: impl Fn(&Value) -> T) -> Vec<T> {
    obj.get(key.as_str())
        .and_then(Value::as_array)
        .map(|items| items.iter().map(&build).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_non_object_is_default() {
        assert_eq!(normalize(&Value::Null), ResumeDocument::default());
        assert_eq!(normalize(&json!("just text")), ResumeDocument::default());
    }

    #[test]
    fn test_normalize_fills_absent_fields_with_empty_values() {
        let doc = normalize(&json!({
            "personalInformation": { "fullName": "Ada Lovelace" },
            "experience": [{ "company": "Analytical Engines" }]
        }));
        assert_eq!(doc.personal_information.full_name, "Ada Lovelace");
        assert_eq!(doc.personal_information.email, "");
        assert_eq!(doc.experience[0].job_title, "");
        assert_eq!(doc.experience[0].company, "Analytical Engines");
        assert!(doc.skills.is_empty());
        assert!(doc.interests.is_empty());
    }

    #[test]
    fn test_normalize_null_collection_is_empty() {
        let doc = normalize(&json!({ "skills": null, "summary": null }));
        assert!(doc.skills.is_empty());
        assert_eq!(doc.summary, "");
    }

    #[test]
    fn test_normalize_coerces_numbers_to_text() {
        let doc = normalize(&json!({
            "education": [{ "degree": "BSc", "graduationYear": 2019 }]
        }));
        assert_eq!(doc.education[0].graduation_year, "2019");
    }

    #[test]
    fn test_skills_accept_objects_and_bare_strings() {
        let doc = normalize(&json!({ "skills": [{ "title": "Go" }, "Rust"] }));
        assert_eq!(doc.skills.len(), 2);
        assert_eq!(doc.skills[0].label(), "Go");
        assert_eq!(doc.skills[1].label(), "Rust");
        assert!(doc.skills[1].full().is_none());
    }

    #[test]
    fn test_technologies_keep_stored_shape() {
        let doc = normalize(&json!({
            "projects": [
                { "title": "a", "technologiesUsed": ["Rust", "Axum"] },
                { "title": "b", "technologiesUsed": "Go, gRPC" }
            ]
        }));
        let a = doc.projects[0].full().unwrap();
        let b = doc.projects[1].full().unwrap();
        assert_eq!(
            a.technologies_used,
            Technologies::Many(vec!["Rust".into(), "Axum".into()])
        );
        assert_eq!(a.technologies_used.joined(), "Rust, Axum");
        assert_eq!(b.technologies_used.joined(), "Go, gRPC");
    }

    #[test]
    fn test_untitled_achievements_are_stored_but_not_displayable() {
        let doc = normalize(&json!({
            "achievements": [{ "title": "A" }, { "year": "2020" }, { "title": "B", "year": "2021" }]
        }));
        assert_eq!(doc.achievements.len(), 3);
        let shown: Vec<_> = doc.displayable_achievements().map(|a| a.title.as_str()).collect();
        assert_eq!(shown, vec!["A", "B"]);
    }

    #[test]
    fn test_linkedin_spellings_are_both_accepted() {
        let lower = normalize(&json!({ "personalInformation": { "linkedin": "https://l/x" } }));
        let camel = normalize(&json!({ "personalInformation": { "linkedIn": "https://l/y" } }));
        assert_eq!(lower.personal_information.linked_in, "https://l/x");
        assert_eq!(camel.personal_information.linked_in, "https://l/y");
    }

    #[test]
    fn test_summary_falls_back_to_default_sentence() {
        let doc = ResumeDocument::default();
        assert_eq!(doc.summary_or_default(), DEFAULT_SUMMARY);
        let doc = normalize(&json!({ "summary": "Builds compilers." }));
        assert_eq!(doc.summary_or_default(), "Builds compilers.");
    }

    #[test]
    fn test_serialized_document_normalizes_to_itself() {
        let doc = normalize(&json!({
            "personalInformation": { "fullName": "Grace", "linkedin": "x" },
            "skills": ["Rust", { "title": "Go", "level": "Expert" }],
            "projects": [{ "title": "p", "technologiesUsed": ["a", "b"] }],
            "languages": [{ "name": "English" }]
        }));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(normalize(&value), doc);
    }
}
