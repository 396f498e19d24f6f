
use serde_json::json;
use test_support::{
    applied, open_draft, request_err, request_ok, revision, section_titles, spawn_sidecar,
};

#[test]
fn sections_append_in_order_and_update_in_place() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let draft_id = open_draft(&mut stdin, &mut reader, "1");

    for (i, title) in ["Basics", "Ownership", "Async"].iter().enumerate() {
        let added = request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{i}"),
            "curriculum.sections.add",
            json!({ "draftId": draft_id, "title": title, "description": "" }),
        );
        assert!(applied(&added));
        assert_eq!(
            added.get("sectionIndex").and_then(|v| v.as_u64()),
            Some(i as u64)
        );
    }

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "upd",
        "curriculum.sections.update",
        json!({
            "draftId": draft_id,
            "sectionIndex": 1,
            "title": "Ownership & Borrowing",
            "description": "the hard part"
        }),
    );
    assert_eq!(
        section_titles(&updated),
        vec!["Basics", "Ownership & Borrowing", "Async"]
    );
}

#[test]
fn blank_title_add_is_reported_not_applied() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let draft_id = open_draft(&mut stdin, &mut reader, "1");

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "curriculum.sections.add",
        json!({ "draftId": draft_id, "title": "Kept", "description": "" }),
    );
    let before_rev = revision(&first);

    let rejected = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "curriculum.sections.add",
        json!({ "draftId": draft_id, "title": "   ", "description": "described anyway" }),
    );
    assert!(!applied(&rejected));
    assert_eq!(revision(&rejected), before_rev);
    assert_eq!(section_titles(&rejected), vec!["Kept"]);
}

#[test]
fn delete_shifts_later_sections_down() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let draft_id = open_draft(&mut stdin, &mut reader, "1");

    for (i, title) in ["S0", "S1", "S2"].iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{i}"),
            "curriculum.sections.add",
            json!({ "draftId": draft_id, "title": title }),
        );
    }

    let after = request_ok(
        &mut stdin,
        &mut reader,
        "del",
        "curriculum.sections.delete",
        json!({ "draftId": draft_id, "sectionIndex": 1 }),
    );
    assert_eq!(section_titles(&after), vec!["S0", "S2"]);
}

#[test]
fn out_of_range_update_fails_and_leaves_state_alone() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let draft_id = open_draft(&mut stdin, &mut reader, "1");

    for (i, title) in ["A", "B"].iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{i}"),
            "curriculum.sections.add",
            json!({ "draftId": draft_id, "title": title }),
        );
    }

    let error = request_err(
        &mut stdin,
        &mut reader,
        "bad",
        "curriculum.sections.update",
        json!({ "draftId": draft_id, "sectionIndex": 99, "title": "x", "description": "y" }),
        "out_of_range",
    );
    let details = error.get("details").expect("details");
    assert_eq!(details.get("index").and_then(|v| v.as_u64()), Some(99));
    assert_eq!(details.get("len").and_then(|v| v.as_u64()), Some(2));

    let current = request_ok(
        &mut stdin,
        &mut reader,
        "get",
        "draft.get",
        json!({ "draftId": draft_id }),
    );
    assert_eq!(section_titles(&current), vec!["A", "B"]);
    assert_eq!(revision(&current), 2);
}
