use crate::ipc::error::ok;
use crate::ipc::helpers::{
    curriculum_err, curriculum_json, draft_mut, required_index, required_str, text_param,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn description_param(req: &Request) -> String {
    req.params
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Append a section. A blank title is the reference editor's silent
/// rejection: the call succeeds, `applied` is false and the revision does
/// not move.
fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let title = match text_param(req, "title") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let description = description_param(req);

    let next = draft.state.add_section(&title, &description);
    let applied = draft.commit(next);
    let mut result = json!({
        "applied": applied,
        "revision": draft.revision,
        "curriculum": curriculum_json(&draft.state),
    });
    if applied {
        result["sectionIndex"] = json!(draft.state.section_count() - 1);
    }
    ok(&req.id, result)
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let index = match required_index(req, "sectionIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let title = match required_str(req, "title") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let description = description_param(req);

    match draft.state.update_section(index, &title, &description) {
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
    let index = match required_index(req, "sectionIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match draft.state.delete_section(index) {
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
        "curriculum.sections.add" => Some(handle_add(state, req)),
        "curriculum.sections.update" => Some(handle_update(state, req)),
        "curriculum.sections.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
