//! Outreach drafting. Pure, deterministic per-channel text from a `CandidateRecord`.
//!
//! Missing facets degrade to neutral phrasing: no experience gives
//! "your professional background", no projects drops the project sentence,
//! no skills renders an empty list.

use crate::candidates::models::{CandidateRecord, Channel};
use crate::outreach::templates::{EMAIL_TEMPLATE, EXPERIENCE_PHRASE_FALLBACK, LINKEDIN_TEMPLATE};

/// Produces the draft message for `channel`. No I/O.
pub fn generate(candidate: &CandidateRecord, channel: Channel) -> String {
    let experience_phrase = experience_phrase(candidate);
    let project_clause = project_clause(candidate);
    let skills = candidate.skills.join(", ");

    let template = match channel {
        Channel::Linkedin => LINKEDIN_TEMPLATE,
        Channel::Email => EMAIL_TEMPLATE,
    };

    fill_template(
        template,
        &[
            ("name", candidate.name.as_str()),
            ("experience_phrase", experience_phrase.as_str()),
            ("project_clause", project_clause.as_str()),
            ("skills", skills.as_str()),
        ],
    )
}

fn experience_phrase(candidate: &CandidateRecord) -> String {
    match candidate.experience.first() {
        Some(first) => format!("your experience at {}", first.company),
        None => EXPERIENCE_PHRASE_FALLBACK.to_string(),
    }
}

fn project_clause(candidate: &CandidateRecord) -> String {
    match candidate.projects.first() {
        Some(first) => format!(" Your work on {} caught my attention.", first.name),
        None => String::new(),
    }
}

/// Replaces `{key}` placeholders in a single left-to-right pass, so substituted
/// values are never re-scanned. Unknown placeholders are left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::models::{ExperienceEntry, ProjectEntry};

    fn candidate() -> CandidateRecord {
        CandidateRecord::new("1", "Ada Lovelace", 91.0)
    }

    fn with_experience(mut c: CandidateRecord, company: &str) -> CandidateRecord {
        c.experience.push(ExperienceEntry {
            company: company.to_string(),
            ..Default::default()
        });
        c
    }

    fn with_project(mut c: CandidateRecord, name: &str) -> CandidateRecord {
        c.projects.push(ProjectEntry {
            name: name.to_string(),
            ..Default::default()
        });
        c
    }

    #[test]
    fn test_email_without_experience_uses_background_phrase() {
        let draft = generate(&candidate(), Channel::Email);
        assert!(draft.contains("your professional background"));
        assert!(draft.starts_with("Dear Ada Lovelace,"));
    }

    #[test]
    fn test_linkedin_without_experience_uses_background_phrase() {
        let draft = generate(&candidate(), Channel::Linkedin);
        assert!(draft.contains("impressed by your professional background."));
    }

    #[test]
    fn test_linkedin_contains_project_name() {
        let c = with_project(with_experience(candidate(), "Acme"), "Analytical Engine");
        let draft = generate(&c, Channel::Linkedin);
        assert!(draft.contains("Your work on Analytical Engine caught my attention."));
    }

    #[test]
    fn test_linkedin_project_without_experience() {
        let c = with_project(candidate(), "Difference Engine");
        let draft = generate(&c, Channel::Linkedin);
        assert!(draft.contains("Difference Engine"));
        assert!(draft.contains("your professional background."));
    }

    #[test]
    fn test_experience_without_projects_has_no_clause_artifacts() {
        let c = with_experience(candidate(), "Acme");
        let draft = generate(&c, Channel::Linkedin);
        assert!(draft.contains("your experience at Acme"));
        assert!(draft.contains("your experience at Acme.\n\n"));
        assert!(!draft.contains("Your work on"));
        assert!(!draft.contains("  "), "no double space artifacts");
        assert!(!draft.contains("[]"));
        assert!(!draft.contains("{project_clause}"));
    }

    #[test]
    fn test_only_first_experience_and_project_are_used() {
        let c = with_project(
            with_project(with_experience(with_experience(candidate(), "Acme"), "Globex"), "First"),
            "Second",
        );
        let draft = generate(&c, Channel::Email);
        assert!(draft.contains("your experience at Acme"));
        assert!(!draft.contains("Globex"));
        assert!(draft.contains("First"));
        assert!(!draft.contains("Second"));
    }

    #[test]
    fn test_email_joins_all_skills() {
        let mut c = candidate();
        c.skills = vec!["Rust".into(), "Python".into(), "SQL".into()];
        let draft = generate(&c, Channel::Email);
        assert!(draft.contains("your expertise in Rust, Python, SQL could"));
    }

    #[test]
    fn test_email_with_no_skills_renders_empty_join() {
        let draft = generate(&candidate(), Channel::Email);
        assert!(draft.contains("your expertise in  could"));
        assert!(!draft.contains("{skills}"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let c = with_project(with_experience(candidate(), "Acme"), "Engine");
        for channel in [Channel::Linkedin, Channel::Email] {
            assert_eq!(generate(&c, channel), generate(&c, channel));
        }
    }

    #[test]
    fn test_placeholder_text_in_name_is_not_expanded() {
        let c = CandidateRecord::new("2", "{skills}", 10.0);
        let draft = generate(&c, Channel::Linkedin);
        assert!(draft.starts_with("Hi {skills},"));
    }

    #[test]
    fn test_fill_template_leaves_unknown_placeholders() {
        assert_eq!(fill_template("a {x} {y} {", &[("x", "1")]), "a 1 {y} {");
    }
}
