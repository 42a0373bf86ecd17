use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::resume::ResumeDocument;

/// The eight repeatable collections of a resume, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    Skills,
    Experience,
    Education,
    Certifications,
    Projects,
    Achievements,
    Languages,
    Interests,
}

impl SectionKey {
    pub const ALL: [SectionKey; 8] = [
        SectionKey::Skills,
        SectionKey::Experience,
        SectionKey::Education,
        SectionKey::Certifications,
        SectionKey::Projects,
        SectionKey::Achievements,
        SectionKey::Languages,
        SectionKey::Interests,
    ];

    /// JSON key of the collection in a resume payload.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Skills => "skills",
            SectionKey::Experience => "experience",
            SectionKey::Education => "education",
            SectionKey::Certifications => "certifications",
            SectionKey::Projects => "projects",
            SectionKey::Achievements => "achievements",
            SectionKey::Languages => "languages",
            SectionKey::Interests => "interests",
        }
    }

    /// Heading shown above the section.
    pub fn title(self) -> &'static str {
        match self {
            SectionKey::Skills => "Skills",
            SectionKey::Experience => "Experience",
            SectionKey::Education => "Education",
            SectionKey::Certifications => "Certifications",
            SectionKey::Projects => "Projects",
            SectionKey::Achievements => "Achievements",
            SectionKey::Languages => "Languages",
            SectionKey::Interests => "Interests",
        }
    }

    /// Editable fields of one entry, in form order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            SectionKey::Skills => &["title", "level"],
            SectionKey::Experience => &[
                "jobTitle",
                "company",
                "location",
                "duration",
                "responsibility",
            ],
            SectionKey::Education => &["degree", "university", "location", "graduationYear"],
            SectionKey::Certifications => &["title", "issuingOrganization", "year"],
            SectionKey::Projects => &["title", "description", "technologiesUsed", "githubLink"],
            SectionKey::Achievements => &["title", "year", "extraInformation"],
            SectionKey::Languages | SectionKey::Interests => &["name"],
        }
    }

    /// The label field a bare-string entry stands in for.
    pub fn label_field(self) -> &'static str {
        match self {
            SectionKey::Languages | SectionKey::Interests => "name",
            SectionKey::Experience => "jobTitle",
            SectionKey::Education => "degree",
            _ => "title",
        }
    }

    /// An entry with every field set to the empty string.
    pub fn blank_entry(self) -> Value {
        let map = self
            .fields()
            .iter()
            .map(|f| (f.to_string(), json!("")))
            .collect::<serde_json::Map<_, _>>();
        Value::Object(map)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

/// True iff the collection has something to show. Achievements only count
/// entries with a title.
pub fn is_section_visible(document: &ResumeDocument, key: SectionKey) -> bool {
    match key {
        SectionKey::Achievements => document.displayable_achievements().next().is_some(),
        other => document.entry_count(other) > 0,
    }
}
