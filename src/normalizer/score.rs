// src/normalizer/score.rs
//
// Deterministic 0-100 completeness metric over a canonical record. Computed
// locally; the model is never trusted for it.

use crate::normalizer::schema::{CanonicalContact, CanonicalRecord};

/// A string only counts as filled above this length, to exclude placeholder
/// values.
const MIN_MEANINGFUL_CHARS: usize = 10;

/// At most this many contacts contribute to the contact half of the score.
const SCORED_CONTACT_CAP: usize = 5;

fn filled_str(value: &str) -> bool {
    value.chars().count() > MIN_MEANINGFUL_CHARS
}

fn filled_opt(value: &Option<String>) -> bool {
    value.as_deref().map(filled_str).unwrap_or(false)
}

/// Weighted field completeness: company block normalized to 50 points plus
/// per-contact completeness averaged over the first five contacts normalized
/// to 50 points, rounded and clamped to [0, 100]. Adding a filled field never
/// lowers the score.
pub fn quality_score(record: &CanonicalRecord) -> i64 {
    let company = &record.company;

    let company_weights: [(bool, u32); 13] = [
        (filled_str(&company.name), 5),
        (filled_str(&company.website_url), 5),
        (filled_opt(&company.linkedin_url), 5),
        (filled_str(&company.industry), 5),
        (filled_opt(&company.revenue_range), 3),
        (filled_opt(&company.employee_count_range), 3),
        (!company.technologies_used.is_empty(), 4),
        (filled_opt(&company.mission_vision_offerings_summary), 10),
        (filled_opt(&company.recent_company_activity_summary), 10),
        (filled_opt(&company.contact_form_url), 2),
        (filled_opt(&company.description), 2),
        (company.founded_year.is_some(), 1),
        (filled_opt(&company.headquarters), 1),
    ];

    let company_max: u32 = company_weights.iter().map(|(_, w)| w).sum();
    let company_score: u32 = company_weights
        .iter()
        .filter(|(filled, _)| *filled)
        .map(|(_, w)| w)
        .sum();
    let normalized_company = company_score as f64 / company_max as f64 * 50.0;

    let contacts = &record.contacts;
    let mut contacts_score = 0.0;
    if !contacts.is_empty() {
        let per_contact_max = 50.0 / contacts.len().min(SCORED_CONTACT_CAP) as f64;
        for contact in contacts.iter().take(SCORED_CONTACT_CAP) {
            contacts_score += contact_completeness(contact) * per_contact_max;
        }
    }

    let final_score = (normalized_company + contacts_score).round() as i64;
    final_score.clamp(0, 100)
}

/// Fraction of the weighted contact fields that are filled, in [0, 1].
fn contact_completeness(contact: &CanonicalContact) -> f64 {
    let weights: [(bool, u32); 11] = [
        (filled_str(&contact.name), 2),
        (filled_opt(&contact.title), 2),
        (filled_str(&contact.email_primary), 3),
        (!contact.phone_numbers.is_empty(), 2),
        (!contact.social_profiles.is_empty(), 2),
        (filled_opt(&contact.scraped_linkedin_profile_summary), 3),
        (!contact.scraped_linkedin_recent_activity.is_empty(), 3),
        (filled_opt(&contact.scraped_accomplishments_summary), 2),
        (filled_opt(&contact.scraped_past_work_summary), 2),
        (filled_opt(&contact.scraped_current_work_summary), 2),
        (filled_opt(&contact.scraped_online_contributions_summary), 2),
    ];

    let max: u32 = weights.iter().map(|(_, w)| w).sum();
    let score: u32 = weights
        .iter()
        .filter(|(filled, _)| *filled)
        .map(|(_, w)| w)
        .sum();
    score as f64 / max as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::schema::{CanonicalCompany, SocialProfiles};

    fn long(s: &str) -> String {
        format!("{} — extended for meaningful length", s)
    }

    fn full_contact() -> CanonicalContact {
        CanonicalContact {
            name: long("Jo Example"),
            title: Some(long("Chief Technology Officer")),
            email_primary: "jo.example@acme-aerospace.com".to_string(),
            phone_numbers: vec!["4155550134".to_string()],
            social_profiles: SocialProfiles {
                linkedin: Some("https://linkedin.com/in/jo".to_string()),
                ..Default::default()
            },
            scraped_linkedin_profile_summary: Some(long("Veteran engineering leader")),
            scraped_linkedin_recent_activity: vec![long("Posted about propulsion")],
            scraped_accomplishments_summary: Some(long("Patents: ion drive")),
            scraped_past_work_summary: Some(long("VP Eng at Initech")),
            scraped_current_work_summary: Some(long("CTO at Acme")),
            scraped_online_contributions_summary: Some(long("OSS maintainer")),
            ..Default::default()
        }
    }

    fn full_record() -> CanonicalRecord {
        CanonicalRecord {
            company: CanonicalCompany {
                name: long("Acme Inc"),
                website_url: "https://acme-aerospace.com".to_string(),
                industry: long("Aerospace"),
                linkedin_url: Some("https://linkedin.com/company/acme".to_string()),
                revenue_range: Some(long("$10M-$50M")),
                employee_count_range: Some(long("51-200 employees")),
                technologies_used: vec!["React".to_string()],
                mission_vision_offerings_summary: Some(long("Acme builds reusable rockets")),
                recent_company_activity_summary: Some(long("Raised a Series B round")),
                contact_form_url: Some("https://acme-aerospace.com/contact".to_string()),
                description: Some(long("Rocket manufacturer")),
                founded_year: Some(2015),
                headquarters: Some(long("San Francisco, CA")),
                enrichment_org_id: None,
            },
            contacts: vec![full_contact()],
            ..Default::default()
        }
    }

    #[test]
    fn empty_record_scores_zero() {
        assert_eq!(quality_score(&CanonicalRecord::default()), 0);
    }

    #[test]
    fn complete_record_scores_one_hundred() {
        assert_eq!(quality_score(&full_record()), 100);
    }

    #[test]
    fn score_is_always_in_bounds() {
        let mut record = full_record();
        record.contacts = std::iter::repeat(full_contact()).take(9).collect();
        let score = quality_score(&record);
        assert!((0..=100).contains(&score));
    }

    #[test]
    fn adding_a_filled_field_never_lowers_the_score() {
        let mut record = CanonicalRecord {
            company: CanonicalCompany {
                name: long("Acme Inc"),
                website_url: "https://acme-aerospace.com".to_string(),
                industry: long("Aerospace"),
                ..Default::default()
            },
            contacts: vec![CanonicalContact {
                name: long("Jo Example"),
                email_primary: "jo.example@acme-aerospace.com".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let mut previous = quality_score(&record);

        record.company.linkedin_url = Some("https://linkedin.com/company/acme".to_string());
        let score = quality_score(&record);
        assert!(score >= previous);
        previous = score;

        record.company.mission_vision_offerings_summary = Some(long("Reusable rockets"));
        let score = quality_score(&record);
        assert!(score >= previous);
        previous = score;

        record.contacts[0].scraped_linkedin_profile_summary = Some(long("Engineering leader"));
        let score = quality_score(&record);
        assert!(score >= previous);
        previous = score;

        record.contacts[0].phone_numbers = vec!["4155550134".to_string()];
        assert!(quality_score(&record) >= previous);
    }

    #[test]
    fn short_strings_do_not_count_as_filled() {
        let mut record = full_record();
        let with_summary = quality_score(&record);
        record.company.mission_vision_offerings_summary = Some("tiny".to_string());
        assert!(quality_score(&record) < with_summary);
    }
}
