use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relevance snippets longer than this many characters are flagged `truncatable`.
pub const SNIPPET_DISPLAY_THRESHOLD: usize = 300;

/// Profile section a relevance snippet was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Education,
    Experience,
    Publications,
    Projects,
    Awards,
    PersonalInfo,
    Research,
}

impl SectionTag {
    #[cfg(test)]
    pub const ALL: [SectionTag; 7] = [
        SectionTag::Education,
        SectionTag::Experience,
        SectionTag::Publications,
        SectionTag::Projects,
        SectionTag::Awards,
        SectionTag::PersonalInfo,
        SectionTag::Research,
    ];

    /// Parses a backend section name. Case-insensitive; accepts `personal_info`,
    /// `personal-info` and `personalinfo`.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect();

        match normalized.as_str() {
            "education" => Some(SectionTag::Education),
            "experience" => Some(SectionTag::Experience),
            "publications" => Some(SectionTag::Publications),
            "projects" => Some(SectionTag::Projects),
            "awards" => Some(SectionTag::Awards),
            "personalinfo" => Some(SectionTag::PersonalInfo),
            "research" => Some(SectionTag::Research),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTag::Education => "education",
            SectionTag::Experience => "experience",
            SectionTag::Publications => "publications",
            SectionTag::Projects => "projects",
            SectionTag::Awards => "awards",
            SectionTag::PersonalInfo => "personal_info",
            SectionTag::Research => "research",
        }
    }
}

/// A scored excerpt of candidate text tied to a profile section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceSnippet {
    pub section: SectionTag,
    /// Full content. Display truncation is left to the UI.
    pub content: String,
    /// Raw similarity from the backend. `None` for plain-string section items.
    pub score: Option<f64>,
    /// Index of the sub-query that produced the snippet, when the backend reports it.
    pub subquery_index: Option<u32>,
    pub truncatable: bool,
}

impl RelevanceSnippet {
    pub fn new(
        section: SectionTag,
        content: String,
        score: Option<f64>,
        subquery_index: Option<u32>,
    ) -> Self {
        let truncatable = content.chars().count() > SNIPPET_DISPLAY_THRESHOLD;
        Self {
            section,
            content,
            score,
            subquery_index,
            truncatable,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    /// Named numeric counters such as `stars`, `forks`, `contributions`.
    pub metrics: BTreeMap<String, f64>,
}

/// Raw text of every profile section. Always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSections {
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub publications: Vec<String>,
    pub projects: Vec<String>,
    pub awards: Vec<String>,
    pub personal_info: Vec<String>,
    pub research: Vec<String>,
}

impl ProfileSections {
    #[cfg(test)]
    pub fn get(&self, tag: SectionTag) -> &[String] {
        match tag {
            SectionTag::Education => &self.education,
            SectionTag::Experience => &self.experience,
            SectionTag::Publications => &self.publications,
            SectionTag::Projects => &self.projects,
            SectionTag::Awards => &self.awards,
            SectionTag::PersonalInfo => &self.personal_info,
            SectionTag::Research => &self.research,
        }
    }

    pub fn get_mut(&mut self, tag: SectionTag) -> &mut Vec<String> {
        match tag {
            SectionTag::Education => &mut self.education,
            SectionTag::Experience => &mut self.experience,
            SectionTag::Publications => &mut self.publications,
            SectionTag::Projects => &mut self.projects,
            SectionTag::Awards => &mut self.awards,
            SectionTag::PersonalInfo => &mut self.personal_info,
            SectionTag::Research => &mut self.research,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        SectionTag::ALL.iter().all(|tag| self.get(*tag).is_empty())
    }
}

/// Outreach medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Linkedin,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Linkedin => "linkedin",
            Channel::Email => "email",
        }
    }
}

/// Per-channel outreach progress. Ordered: a status only ever moves forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    #[default]
    NotStarted,
    Pending,
    Sent,
    Responded,
}

impl ChannelStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "not_started" => Some(ChannelStatus::NotStarted),
            "pending" => Some(ChannelStatus::Pending),
            "sent" => Some(ChannelStatus::Sent),
            "responded" => Some(ChannelStatus::Responded),
            _ => None,
        }
    }
}

/// Outreach state per channel, independent of call state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachStatus {
    pub linkedin: ChannelStatus,
    pub email: ChannelStatus,
}

impl OutreachStatus {
    pub fn get(&self, channel: Channel) -> ChannelStatus {
        match channel {
            Channel::Linkedin => self.linkedin,
            Channel::Email => self.email,
        }
    }

    pub fn set(&mut self, channel: Channel, status: ChannelStatus) {
        match channel {
            Channel::Linkedin => self.linkedin = status,
            Channel::Email => self.email = status,
        }
    }
}

/// Canonical candidate entity produced by the normalizer. Every collection is
/// present; consumers never branch on presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
    pub current_position: String,
    pub profile_image: Option<String>,
    /// Percentage in [0, 100].
    pub match_score: f64,
    pub snippets: Vec<RelevanceSnippet>,
    pub sections: ProfileSections,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectEntry>,
    pub outreach: OutreachStatus,
}

impl CandidateRecord {
    /// An empty record with only identity and score set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, match_score: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_position: String::new(),
            profile_image: None,
            match_score,
            snippets: Vec::new(),
            sections: ProfileSections::default(),
            experience: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            outreach: OutreachStatus::default(),
        }
    }
}
