use std::collections::HashSet;

use anyhow::{bail, Context};
use serde_json::json;

use crate::curriculum::{CurriculumError, CurriculumState, IndexKind, Section};
use crate::ipc::error::err;
use crate::ipc::types::{Draft, Request};

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// A string that must be present but may be blank. Blank titles are how the
/// silent-rejection path is exercised, so `required_str` is too strict for
/// them.
pub fn text_param(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn opt_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Zero-based positional index. Anything that is not a non-negative JSON
/// integer is `bad_params`; whether the position exists is the core's call.
pub fn required_index(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("missing or invalid {}", key),
                None,
            )
        })
}

pub fn draft_mut<'a>(
    drafts: &'a mut std::collections::HashMap<String, Draft>,
    req: &Request,
) -> Result<&'a mut Draft, serde_json::Value> {
    let id = required_str(req, "draftId")?;
    match drafts.get_mut(&id) {
        Some(d) => Ok(d),
        None => Err(err(
            &req.id,
            "unknown_draft",
            format!("no open draft {}", id),
            None,
        )),
    }
}

pub fn curriculum_json(state: &CurriculumState) -> serde_json::Value {
    json!({ "sections": state.sections() })
}

pub fn curriculum_err(req: &Request, e: CurriculumError) -> serde_json::Value {
    match e {
        CurriculumError::OutOfRange { kind, index, len } => err(
            &req.id,
            "out_of_range",
            e.to_string(),
            Some(json!({
                "kind": match kind {
                    IndexKind::Section => "section",
                    IndexKind::Lesson => "lesson",
                },
                "index": index,
                "len": len,
            })),
        ),
    }
}

/// Rebuild a state from a `{ "sections": [...] }` tree previously extracted
/// over IPC. Lesson ids must be unique across the whole tree; the monotonic
/// counter resumes past the largest id seen.
pub fn hydrate_curriculum(raw: &serde_json::Value) -> anyhow::Result<CurriculumState> {
    let sections_raw = raw
        .get("sections")
        .context("curriculum must carry a sections array")?;
    let sections: Vec<Section> =
        serde_json::from_value(sections_raw.clone()).context("malformed sections array")?;

    let mut seen: HashSet<u64> = HashSet::new();
    let mut max_id: u64 = 0;
    for section in &sections {
        if section.title.trim().is_empty() {
            bail!("section titles must be non-empty");
        }
        for lesson in &section.lessons {
            if !seen.insert(lesson.id) {
                bail!("duplicate lesson id {}", lesson.id);
            }
            max_id = max_id.max(lesson.id);
        }
    }

    Ok(CurriculumState::from_parts(sections, max_id + 1))
}
