use crate::curriculum::{DragEvent, LessonSlot};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{curriculum_err, curriculum_json, draft_mut};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value as JsonValue};

fn slot_index(raw: &JsonValue, key: &str) -> Result<usize, String> {
    raw.get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| format!("missing or invalid {}", key))
}

fn parse_section_slot(raw: &JsonValue) -> Result<usize, String> {
    slot_index(raw, "index")
}

fn parse_lesson_slot(raw: &JsonValue) -> Result<LessonSlot, String> {
    Ok(LessonSlot {
        section: slot_index(raw, "sectionIndex")?,
        index: slot_index(raw, "index")?,
    })
}

/// Translate the wire triple (kind, source, destination?) into a core
/// `DragEvent`. A missing or null destination means "dropped outside any
/// target" and stays `None` so the engine can no-op it.
fn parse_event(req: &Request) -> Result<DragEvent, String> {
    let kind = req
        .params
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or("missing kind")?;
    let source = req.params.get("source").ok_or("missing source")?;
    let destination = req.params.get("destination").filter(|v| !v.is_null());

    match kind {
        "section" => Ok(DragEvent::Section {
            source: parse_section_slot(source).map_err(|m| format!("source: {}", m))?,
            destination: destination
                .map(|d| parse_section_slot(d).map_err(|m| format!("destination: {}", m)))
                .transpose()?,
        }),
        "lesson" => Ok(DragEvent::Lesson {
            source: parse_lesson_slot(source).map_err(|m| format!("source: {}", m))?,
            destination: destination
                .map(|d| parse_lesson_slot(d).map_err(|m| format!("destination: {}", m)))
                .transpose()?,
        }),
        other => Err(format!("kind must be section or lesson (got {})", other)),
    }
}

fn handle_reorder(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let event = match parse_event(req) {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };

    match draft.state.apply_drag(&event) {
        Ok(next) => {
            let applied = draft.commit(next);
            ok(
                &req.id,
                json!({
                    "applied": applied,
                    "revision": draft.revision,
                    "curriculum": curriculum_json(&draft.state),
                }),
            )
        }
        Err(e) => curriculum_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "curriculum.reorder" => Some(handle_reorder(state, req)),
        _ => None,
    }
}
