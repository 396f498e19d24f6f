use crate::ipc::error::ok;
use crate::ipc::helpers::draft_mut;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Derived numbers the course wizard shows in its header: section/lesson
/// counts and the summed video runtime.
fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match draft_mut(&mut state.drafts, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "sectionCount": draft.state.section_count(),
            "lessonCount": draft.state.lesson_count(),
            "totalDuration": draft.state.total_duration(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "curriculum.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}
