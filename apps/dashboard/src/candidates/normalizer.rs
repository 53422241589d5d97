//! Search result normalization: turns whatever shape the semantic-search backend
//! returned into a list of total `CandidateRecord`s, in backend ranking order.
//!
//! Accepted per-result shape (camelCase or snake_case keys):
//!
//! ```text
//! { candidateId, candidateName, score,
//!   sections: { <section>: [ "text" | {content, score, subquery_index?} | {company, ...} ] },
//!   relevantChunks?: [ {content, score, section, subquery_index} ],
//!   currentPosition?, profileImage?, skills?, experience?, projects?, outreachStatus? }
//! ```
//!
//! Score policy: a raw value with magnitude <= 1 is a cosine similarity and is
//! scaled to a percentage after taking its absolute value. Larger magnitudes are
//! already percentages and are clamped to 100.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::candidates::dedup::dedup_skills;
use crate::candidates::models::{
    CandidateRecord, ChannelStatus, ExperienceEntry, OutreachStatus, ProjectEntry,
    RelevanceSnippet, SectionTag,
};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}

fn malformed(message: impl Into<String>) -> NormalizeError {
    NormalizeError::MalformedResponse(message.into())
}

/// Normalizes a raw search response. Fails as a whole; never returns a partial list.
pub fn normalize_search_response(raw: &Value) -> Result<Vec<CandidateRecord>, NormalizeError> {
    let root = raw
        .as_object()
        .ok_or_else(|| malformed("response is not a JSON object"))?;

    let results = match root.get("results") {
        Some(Value::Array(results)) => results,
        Some(_) => return Err(malformed("`results` is not an array")),
        None => return Err(malformed("response has no `results` field")),
    };

    let records = results
        .iter()
        .enumerate()
        .map(|(index, result)| normalize_result(index, result))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Normalized {} search results", records.len());
    Ok(records)
}

/// Maps a raw backend score onto [0, 100].
pub fn normalize_match_score(raw: f64) -> Result<f64, NormalizeError> {
    if !raw.is_finite() {
        return Err(malformed(format!("score {raw} is not a finite number")));
    }
    let magnitude = raw.abs();
    if magnitude <= 1.0 {
        Ok(magnitude * 100.0)
    } else {
        Ok(magnitude.min(100.0))
    }
}

fn normalize_result(index: usize, value: &Value) -> Result<CandidateRecord, NormalizeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| malformed(format!("results[{index}] is not an object")))?;

    let id = match field(obj, &["candidateId", "candidate_id", "id"]) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(malformed(format!("results[{index}] has no candidate id"))),
    };

    let name = match field(obj, &["candidateName", "candidate_name", "name"]) {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(malformed(format!("results[{index}] has no candidate name"))),
    };

    let raw_score = field(obj, &["score", "matchScore", "match_score"])
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(format!("results[{index}] has no numeric score")))?;

    let mut record = CandidateRecord::new(id, name, normalize_match_score(raw_score)?);
    record.current_position =
        string_field(obj, &["currentPosition", "current_position"]).unwrap_or_default();
    record.profile_image = string_field(obj, &["profileImage", "profile_image"]);

    let section_snippets = match field(obj, &["sections"]) {
        None => Vec::new(),
        Some(Value::Object(sections)) => normalize_sections(index, sections, &mut record)?,
        Some(_) => {
            return Err(malformed(format!(
                "results[{index}].sections is not an object"
            )))
        }
    };

    record.snippets = match field(obj, &["relevantChunks", "relevant_chunks"]) {
        None => section_snippets,
        Some(Value::Array(chunks)) => normalize_chunks(index, chunks)?,
        Some(_) => {
            return Err(malformed(format!(
                "results[{index}].relevantChunks is not an array"
            )))
        }
    };

    if let Some(items) = field(obj, &["experience"]) {
        for item in as_array(index, "experience", items)? {
            let entry = item
                .as_object()
                .and_then(parse_experience)
                .ok_or_else(|| {
                    malformed(format!(
                        "results[{index}].experience entries must be objects with a company"
                    ))
                })?;
            record.experience.push(entry);
        }
    }

    if let Some(items) = field(obj, &["projects"]) {
        for item in as_array(index, "projects", items)? {
            let obj = item.as_object().ok_or_else(|| {
                malformed(format!("results[{index}].projects entries must be objects"))
            })?;
            record.projects.push(parse_project(index, obj)?);
        }
    }

    if let Some(items) = field(obj, &["skills"]) {
        let mut skills = Vec::new();
        for item in as_array(index, "skills", items)? {
            match item {
                Value::String(s) => skills.push(s.clone()),
                Value::Object(o) => match string_field(o, &["name"]) {
                    Some(name) => skills.push(name),
                    None => {
                        return Err(malformed(format!(
                            "results[{index}].skills object has no name"
                        )))
                    }
                },
                _ => {
                    return Err(malformed(format!(
                        "results[{index}].skills entries must be strings"
                    )))
                }
            }
        }
        record.skills = dedup_skills(skills);
    }

    if let Some(status) = field(obj, &["outreachStatus", "outreach_status"]) {
        record.outreach = parse_outreach_status(index, status)?;
    }

    Ok(record)
}

/// Fills per-section text and structured facets from the `sections` mapping and
/// returns the snippets derived from its items, in section order.
fn normalize_sections(
    index: usize,
    sections: &Map<String, Value>,
    record: &mut CandidateRecord,
) -> Result<Vec<RelevanceSnippet>, NormalizeError> {
    let mut by_tag: BTreeMap<SectionTag, Vec<&Value>> = BTreeMap::new();

    for (name, items) in sections {
        let Some(tag) = SectionTag::parse(name) else {
            warn!("Skipping unknown section '{name}' on results[{index}]");
            continue;
        };
        match items {
            Value::Null => {}
            Value::Array(items) => by_tag.entry(tag).or_default().extend(items.iter()),
            _ => {
                return Err(malformed(format!(
                    "results[{index}].sections.{name} is not an array"
                )))
            }
        }
    }

    let mut snippets = Vec::new();

    for (tag, items) in by_tag {
        for item in items {
            match item {
                Value::String(text) => {
                    record.sections.get_mut(tag).push(text.clone());
                    snippets.push(RelevanceSnippet::new(tag, text.clone(), None, None));
                }
                Value::Object(obj) => {
                    if let Some(content) = string_field(obj, &["content"]) {
                        let score = field(obj, &["score"]).and_then(Value::as_f64);
                        record.sections.get_mut(tag).push(content.clone());
                        snippets.push(RelevanceSnippet::new(
                            tag,
                            content,
                            score,
                            subquery_index(obj),
                        ));
                        continue;
                    }

                    match tag {
                        SectionTag::Experience => {
                            let entry = parse_experience(obj).ok_or_else(|| {
                                malformed(format!(
                                    "results[{index}].sections.experience item has neither content nor company"
                                ))
                            })?;
                            if !entry.description.is_empty() {
                                record.sections.experience.push(entry.description.clone());
                            }
                            record.experience.push(entry);
                        }
                        SectionTag::Projects => {
                            let project = parse_project(index, obj)?;
                            if !project.description.is_empty() {
                                record.sections.projects.push(project.description.clone());
                            }
                            record.projects.push(project);
                        }
                        _ => {
                            return Err(malformed(format!(
                                "results[{index}].sections.{} item has no content",
                                tag.as_str()
                            )))
                        }
                    }
                }
                _ => {
                    return Err(malformed(format!(
                        "results[{index}].sections.{} items must be strings or objects",
                        tag.as_str()
                    )))
                }
            }
        }
    }

    Ok(snippets)
}

fn normalize_chunks(index: usize, chunks: &[Value]) -> Result<Vec<RelevanceSnippet>, NormalizeError> {
    let mut snippets = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let obj = chunk.as_object().ok_or_else(|| {
            malformed(format!("results[{index}].relevantChunks entries must be objects"))
        })?;
        let content = string_field(obj, &["content"]).ok_or_else(|| {
            malformed(format!("results[{index}].relevantChunks entry has no content"))
        })?;
        let section_name = string_field(obj, &["section"]).unwrap_or_default();
        let Some(tag) = SectionTag::parse(&section_name) else {
            warn!("Skipping chunk with unknown section '{section_name}' on results[{index}]");
            continue;
        };
        let score = field(obj, &["score"]).and_then(Value::as_f64);
        snippets.push(RelevanceSnippet::new(tag, content, score, subquery_index(obj)));
    }

    Ok(snippets)
}

fn parse_experience(obj: &Map<String, Value>) -> Option<ExperienceEntry> {
    let company = string_field(obj, &["company"])?;
    Some(ExperienceEntry {
        company,
        title: string_field(obj, &["title", "role"]).unwrap_or_default(),
        start_date: string_field(obj, &["startDate", "start_date"]).unwrap_or_default(),
        end_date: string_field(obj, &["endDate", "end_date"]).unwrap_or_default(),
        description: string_field(obj, &["description"]).unwrap_or_default(),
    })
}

fn parse_project(index: usize, obj: &Map<String, Value>) -> Result<ProjectEntry, NormalizeError> {
    let name = string_field(obj, &["name"])
        .ok_or_else(|| malformed(format!("results[{index}] has a project without a name")))?;

    let mut metrics = BTreeMap::new();
    match field(obj, &["metrics"]) {
        None => {}
        Some(Value::Object(raw)) => {
            for (key, value) in raw {
                match value {
                    Value::Null => {}
                    Value::Number(n) => {
                        if let Some(n) = n.as_f64() {
                            metrics.insert(key.clone(), n);
                        }
                    }
                    _ => {
                        return Err(malformed(format!(
                            "results[{index}] project '{name}' metric '{key}' is not numeric"
                        )))
                    }
                }
            }
        }
        Some(_) => {
            return Err(malformed(format!(
                "results[{index}] project '{name}' metrics is not an object"
            )))
        }
    }

    Ok(ProjectEntry {
        description: string_field(obj, &["description"]).unwrap_or_default(),
        name,
        metrics,
    })
}

fn parse_outreach_status(index: usize, value: &Value) -> Result<OutreachStatus, NormalizeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| malformed(format!("results[{index}].outreachStatus is not an object")))?;

    let parse = |key: &str| -> Result<ChannelStatus, NormalizeError> {
        match field(obj, &[key]) {
            None => Ok(ChannelStatus::NotStarted),
            Some(Value::String(s)) => ChannelStatus::parse(s).ok_or_else(|| {
                malformed(format!(
                    "results[{index}].outreachStatus.{key} has unknown value '{s}'"
                ))
            }),
            Some(_) => Err(malformed(format!(
                "results[{index}].outreachStatus.{key} is not a string"
            ))),
        }
    };

    Ok(OutreachStatus {
        linkedin: parse("linkedin")?,
        email: parse("email")?,
    })
}

/// First non-null value among the given key spellings.
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| !value.is_null())
}

fn string_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field(obj, names).and_then(Value::as_str).map(str::to_string)
}

fn subquery_index(obj: &Map<String, Value>) -> Option<u32> {
    field(obj, &["subquery_index", "subqueryIndex"])
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn as_array<'a>(index: usize, name: &str, value: &'a Value) -> Result<&'a [Value], NormalizeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| malformed(format!("results[{index}].{name} is not an array")))
}
