use crate::curriculum::CurriculumState;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{curriculum_json, draft_mut, hydrate_curriculum, opt_str, required_str};
use crate::ipc::types::{AppState, Draft, Request};
use serde_json::json;
use uuid::Uuid;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "draftCount": state.drafts.len(),
        }),
    )
}

fn open_draft(
    state: &mut AppState,
    req: &Request,
    curriculum: CurriculumState,
) -> serde_json::Value {
    let draft_id = Uuid::new_v4().to_string();
    let draft = Draft::new(opt_str(req, "courseId"), curriculum);
    let result = json!({
        "draftId": draft_id,
        "revision": draft.revision,
        "curriculum": curriculum_json(&draft.state),
    });
    state.drafts.insert(draft_id, draft);
    ok(&req.id, result)
}

/// Fresh empty draft, e.g. when the authoring wizard mounts for a new
/// course.
fn handle_draft_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    open_draft(state, req, CurriculumState::new())
}

/// Re-open a draft from a tree the shell extracted earlier (the wizard held
/// it across a navigation, or a parent aggregator passed it back down).
fn handle_draft_hydrate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("curriculum") else {
        return err(&req.id, "bad_params", "missing curriculum", None);
    };
    match hydrate_curriculum(raw) {
        Ok(curriculum) => open_draft(state, req, curriculum),
        Err(e) => err(&req.id, "bad_params", format!("{e:#}"), None),
    }
}

fn handle_draft_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "courseId": draft.course_id,
            "revision": draft.revision,
            "curriculum": curriculum_json(&draft.state),
            "openedAt": draft.opened_at.to_rfc3339(),
            "updatedAt": draft.updated_at.to_rfc3339(),
        }),
    )
}

fn handle_draft_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut entries: Vec<(&String, &Draft)> = state.drafts.iter().collect();
    // HashMap order is arbitrary; list oldest-opened first.
    entries.sort_by(|a, b| a.1.opened_at.cmp(&b.1.opened_at).then_with(|| a.0.cmp(b.0)));
    let drafts: Vec<serde_json::Value> = entries
        .into_iter()
        .map(|(id, d)| {
            json!({
                "draftId": id,
                "courseId": d.course_id,
                "revision": d.revision,
                "sectionCount": d.state.section_count(),
                "lessonCount": d.state.lesson_count(),
                "openedAt": d.opened_at.to_rfc3339(),
                "updatedAt": d.updated_at.to_rfc3339(),
            })
        })
        .collect();
    ok(&req.id, json!({ "drafts": drafts }))
}

/// Drop a draft without saving anywhere. There is no persistence behind
/// this daemon; discard really does forget the tree.
fn handle_draft_discard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "draftId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if state.drafts.remove(&id).is_none() {
        return err(
            &req.id,
            "unknown_draft",
            format!("no open draft {}", id),
            None,
        );
    }
    ok(&req.id, json!({ "discarded": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "draft.open" => Some(handle_draft_open(state, req)),
        "draft.hydrate" => Some(handle_draft_hydrate(state, req)),
        "draft.get" => Some(handle_draft_get(state, req)),
        "draft.list" => Some(handle_draft_list(state, req)),
        "draft.discard" => Some(handle_draft_discard(state, req)),
        _ => None,
    }
}
