// src/linkedin/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One post from a company page feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyUpdate {
    pub date: Option<String>,
    pub content: String,
    pub engagement: Option<String>,
}

/// Company-page facts. Every field beyond name/url is best-effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLinkedInCompany {
    pub name: String,
    pub url: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub company_size: Option<String>,
    pub headquarters: Option<String>,
    pub founded: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub recent_updates: Vec<CompanyUpdate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub date_range: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccomplishmentGroup {
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileActivity {
    pub date: Option<String>,
    pub content: String,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub url: Option<String>,
}

/// Individual-profile facts assembled from the main profile view plus the
/// recent-activity, skills and contact-info sub-views.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLinkedInProfile {
    pub name: String,
    pub url: String,
    pub title: Option<String>,
    /// Parsed from a "title at company" headline when present.
    pub company: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub accomplishments: Vec<AccomplishmentGroup>,
    #[serde(default)]
    pub recent_activity: Vec<ProfileActivity>,
    #[serde(default)]
    pub contact_info: BTreeMap<String, String>,
}

impl RawLinkedInProfile {
    /// "<current role> at <current company>. <about>" — consumed by contact
    /// record updates after a profile scrape.
    pub fn current_work_summary(&self) -> String {
        let Some(current) = self.experience.first() else {
            return String::new();
        };
        let mut summary = format!("{} at {}", current.role, current.company);
        if let Some(about) = &self.about {
            summary.push_str(". ");
            summary.push_str(about);
        }
        summary
    }

    /// Second and third experience entries joined as a past-work summary.
    pub fn past_work_summary(&self) -> String {
        self.experience
            .iter()
            .skip(1)
            .take(2)
            .map(|e| format!("{} at {}", e.role, e.company))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// "<category>: <first three items>" per accomplishment group.
    pub fn accomplishments_summary(&self) -> String {
        self.accomplishments
            .iter()
            .filter(|group| !group.items.is_empty())
            .map(|group| {
                format!(
                    "{}: {}",
                    group.category,
                    group.items.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join(". ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_experience() -> RawLinkedInProfile {
        RawLinkedInProfile {
            name: "Jo Example".to_string(),
            url: "https://linkedin.com/in/jo".to_string(),
            about: Some("Builds rockets".to_string()),
            experience: vec![
                ExperienceEntry {
                    role: "CTO".to_string(),
                    company: "Acme".to_string(),
                    date_range: None,
                },
                ExperienceEntry {
                    role: "VP Eng".to_string(),
                    company: "Initech".to_string(),
                    date_range: None,
                },
                ExperienceEntry {
                    role: "Engineer".to_string(),
                    company: "Globex".to_string(),
                    date_range: None,
                },
                ExperienceEntry {
                    role: "Intern".to_string(),
                    company: "Hooli".to_string(),
                    date_range: None,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn work_summaries_split_current_and_past() {
        let profile = profile_with_experience();
        assert_eq!(profile.current_work_summary(), "CTO at Acme. Builds rockets");
        assert_eq!(profile.past_work_summary(), "VP Eng at Initech; Engineer at Globex");
    }

    #[test]
    fn sparse_profile_summaries_are_empty() {
        let profile = RawLinkedInProfile::default();
        assert_eq!(profile.current_work_summary(), "");
        assert_eq!(profile.past_work_summary(), "");
        assert_eq!(profile.accomplishments_summary(), "");
    }

    #[test]
    fn accomplishments_summary_caps_items() {
        let profile = RawLinkedInProfile {
            accomplishments: vec![AccomplishmentGroup {
                category: "Patents".to_string(),
                items: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            }],
            ..Default::default()
        };
        assert_eq!(profile.accomplishments_summary(), "Patents: a, b, c");
    }
}
