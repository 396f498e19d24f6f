use crate::curriculum::{LessonDraft, LessonKind, LessonPatch};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{curriculum_err, curriculum_json, draft_mut, required_index};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value as JsonValue};

fn parse_kind(raw: &JsonValue) -> Result<LessonKind, String> {
    serde_json::from_value(raw.clone()).map_err(|_| {
        format!(
            "lesson type must be one of video, text, quiz, assignment (got {})",
            raw
        )
    })
}

/// `None` if absent, `Some(None)` for null or blank (clears the field),
/// `Some(Some(_))` for a real value. Mirrors how null-clears-field works
/// elsewhere in the protocol.
fn parse_clearable(v: Option<&JsonValue>) -> Result<Option<Option<String>>, &'static str> {
    match v {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(Some(None)),
        Some(v) => {
            let s = v.as_str().ok_or("must be string or null")?.trim().to_string();
            if s.is_empty() {
                Ok(Some(None))
            } else {
                Ok(Some(Some(s)))
            }
        }
    }
}

fn parse_lesson_draft(req: &Request) -> Result<LessonDraft, serde_json::Value> {
    let Some(raw) = req.params.get("lesson").and_then(|v| v.as_object()) else {
        return Err(err(&req.id, "bad_params", "missing lesson object", None));
    };
    let title = raw
        .get("title")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", "missing lesson.title", None))?;
    let kind = match raw.get("type") {
        Some(v) => parse_kind(v).map_err(|m| err(&req.id, "bad_params", m, None))?,
        None => return Err(err(&req.id, "bad_params", "missing lesson.type", None)),
    };
    let content = parse_clearable(raw.get("content"))
        .map_err(|m| err(&req.id, "bad_params", format!("lesson.content {}", m), None))?
        .flatten();
    let duration = parse_clearable(raw.get("duration"))
        .map_err(|m| err(&req.id, "bad_params", format!("lesson.duration {}", m), None))?
        .flatten();
    Ok(LessonDraft {
        title,
        kind,
        content,
        duration,
    })
}

fn parse_lesson_patch(req: &Request) -> Result<LessonPatch, serde_json::Value> {
    let Some(raw) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return Err(err(&req.id, "bad_params", "missing patch object", None));
    };
    if raw.contains_key("id") {
        // Ids are assigned once and never patched.
        return Err(err(&req.id, "bad_params", "lesson id is immutable", None));
    }
    let title = match raw.get("title") {
        None => None,
        Some(v) => Some(
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| err(&req.id, "bad_params", "patch.title must be string", None))?,
        ),
    };
    let kind = match raw.get("type") {
        None => None,
        Some(v) => Some(parse_kind(v).map_err(|m| err(&req.id, "bad_params", m, None))?),
    };
    let content = parse_clearable(raw.get("content"))
        .map_err(|m| err(&req.id, "bad_params", format!("patch.content {}", m), None))?;
    let duration = parse_clearable(raw.get("duration"))
        .map_err(|m| err(&req.id, "bad_params", format!("patch.duration {}", m), None))?;
    Ok(LessonPatch {
        title,
        kind,
        content,
        duration,
    })
}

/// Append a lesson to a section. Blank titles get the same silent-rejection
/// treatment as blank section titles; the section index must exist either
/// way.
fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let section = match required_index(req, "sectionIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let lesson = match parse_lesson_draft(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match draft.state.add_lesson(section, lesson) {
        Ok(next) => {
            let applied = draft.commit(next);
            let mut result = json!({
                "applied": applied,
                "revision": draft.revision,
                "curriculum": curriculum_json(&draft.state),
            });
            if applied {
                let added = draft.state.sections()[section]
                    .lessons
                    .last()
                    .map(|l| l.id);
                result["lessonId"] = json!(added);
            }
            ok(&req.id, result)
        }
        Err(e) => curriculum_err(req, e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let section = match required_index(req, "sectionIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let index = match required_index(req, "lessonIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match parse_lesson_patch(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match draft.state.update_lesson(section, index, patch) {
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

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let section = match required_index(req, "sectionIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let index = match required_index(req, "lessonIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match draft.state.delete_lesson(section, index) {
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
        "curriculum.lessons.add" => Some(handle_add(state, req)),
        "curriculum.lessons.update" => Some(handle_update(state, req)),
        "curriculum.lessons.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
