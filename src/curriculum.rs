use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Video,
    Text,
    Quiz,
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LessonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// `MM:SS` display string; only meaningful for video lessons and never
    /// validated at this layer (unparseable values count as zero in totals).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Input for `add_lesson`. Ids are assigned by the state, never by callers.
#[derive(Debug, Clone)]
pub struct LessonDraft {
    pub title: String,
    pub kind: LessonKind,
    pub content: Option<String>,
    pub duration: Option<String>,
}

/// Field-wise merge for `update_lesson`. Outer `None` leaves the field
/// alone; for the optional fields, `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub kind: Option<LessonKind>,
    pub content: Option<Option<String>>,
    pub duration: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Section,
    Lesson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurriculumError {
    OutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for CurriculumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurriculumError::OutOfRange { kind, index, len } => {
                let noun = match kind {
                    IndexKind::Section => "section",
                    IndexKind::Lesson => "lesson",
                };
                write!(f, "{} index {} out of range (len {})", noun, index, len)
            }
        }
    }
}

impl std::error::Error for CurriculumError {}

/// Position of a lesson for drag purposes: which section's list, and
/// where in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonSlot {
    pub section: usize,
    pub index: usize,
}

/// A drop reported by whatever reordering surface the shell offers
/// (pointer drag, keyboard move). `destination: None` means the item was
/// dropped outside any valid target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Section {
        source: usize,
        destination: Option<usize>,
    },
    Lesson {
        source: LessonSlot,
        destination: Option<LessonSlot>,
    },
}

/// The full ordered tree of sections and lessons for one course draft.
///
/// Every mutator is pure: it borrows the receiver and returns a fresh
/// snapshot (or an error and no snapshot), so the host can treat each
/// applied mutation as an atomic state transition. Lesson ids come from a
/// monotonic counter carried inside the state and are unique across the
/// whole tree, not just within one section.
#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumState {
    sections: Vec<Section>,
    next_lesson_id: u64,
}

impl Default for CurriculumState {
    fn default() -> Self {
        Self::new()
    }
}

impl CurriculumState {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            next_lesson_id: 1,
        }
    }

    /// Rebuild a state from an already-validated section tree. Callers must
    /// have checked lesson-id uniqueness and pass a counter strictly above
    /// every id present.
    pub(crate) fn from_parts(sections: Vec<Section>, next_lesson_id: u64) -> Self {
        Self {
            sections,
            next_lesson_id,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }

    fn check_section(&self, index: usize) -> Result<(), CurriculumError> {
        if index >= self.sections.len() {
            return Err(CurriculumError::OutOfRange {
                kind: IndexKind::Section,
                index,
                len: self.sections.len(),
            });
        }
        Ok(())
    }

    fn check_lesson(&self, section: usize, index: usize) -> Result<(), CurriculumError> {
        self.check_section(section)?;
        let len = self.sections[section].lessons.len();
        if index >= len {
            return Err(CurriculumError::OutOfRange {
                kind: IndexKind::Lesson,
                index,
                len,
            });
        }
        Ok(())
    }

    /// Append a section. Blank titles are a silent no-op: the returned
    /// state equals the input, matching the reference editor's behavior of
    /// ignoring empty submissions rather than erroring.
    pub fn add_section(&self, title: &str, description: &str) -> CurriculumState {
        let title = title.trim();
        if title.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.sections.push(Section {
            title: title.to_string(),
            description: description.trim().to_string(),
            lessons: Vec::new(),
        });
        next
    }

    pub fn update_section(
        &self,
        index: usize,
        title: &str,
        description: &str,
    ) -> Result<CurriculumState, CurriculumError> {
        self.check_section(index)?;
        let mut next = self.clone();
        let section = &mut next.sections[index];
        section.title = title.trim().to_string();
        section.description = description.trim().to_string();
        Ok(next)
    }

    /// Remove a section and all lessons it owns; later sections shift down.
    pub fn delete_section(&self, index: usize) -> Result<CurriculumState, CurriculumError> {
        self.check_section(index)?;
        let mut next = self.clone();
        next.sections.remove(index);
        Ok(next)
    }

    /// Append a lesson with a fresh id. A blank lesson title is a silent
    /// no-op (same policy as `add_section`), but the section index must be
    /// valid either way.
    pub fn add_lesson(
        &self,
        section: usize,
        draft: LessonDraft,
    ) -> Result<CurriculumState, CurriculumError> {
        self.check_section(section)?;
        let title = draft.title.trim();
        if title.is_empty() {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        let id = next.next_lesson_id;
        next.next_lesson_id += 1;
        next.sections[section].lessons.push(Lesson {
            id,
            title: title.to_string(),
            kind: draft.kind,
            content: draft.content,
            duration: draft.duration,
        });
        Ok(next)
    }

    /// Merge a patch into one lesson. The id is not part of the patch type
    /// and therefore can never change. A patched title that trims to empty
    /// is ignored so a lesson never loses its title.
    pub fn update_lesson(
        &self,
        section: usize,
        index: usize,
        patch: LessonPatch,
    ) -> Result<CurriculumState, CurriculumError> {
        self.check_lesson(section, index)?;
        let mut next = self.clone();
        let lesson = &mut next.sections[section].lessons[index];
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if !title.is_empty() {
                lesson.title = title;
            }
        }
        if let Some(kind) = patch.kind {
            lesson.kind = kind;
        }
        if let Some(content) = patch.content {
            lesson.content = content;
        }
        if let Some(duration) = patch.duration {
            lesson.duration = duration;
        }
        Ok(next)
    }

    pub fn delete_lesson(
        &self,
        section: usize,
        index: usize,
    ) -> Result<CurriculumState, CurriculumError> {
        self.check_lesson(section, index)?;
        let mut next = self.clone();
        next.sections[section].lessons.remove(index);
        Ok(next)
    }

    /// Apply one drop event. Three cases: reorder sections, reorder lessons
    /// within a section, move a lesson across sections. The cross-section
    /// case is a single state transition; no returned snapshot ever holds
    /// the lesson twice or zero times.
    ///
    /// Missing destinations and same-slot drops return the input state
    /// unchanged. Source positions must exist; destination insert positions
    /// are clamped, since drag surfaces report `len` for "end of list".
    pub fn apply_drag(&self, event: &DragEvent) -> Result<CurriculumState, CurriculumError> {
        match *event {
            DragEvent::Section {
                source,
                destination,
            } => {
                self.check_section(source)?;
                let Some(destination) = destination else {
                    return Ok(self.clone());
                };
                let destination = destination.min(self.sections.len() - 1);
                if destination == source {
                    return Ok(self.clone());
                }
                let mut next = self.clone();
                let moved = next.sections.remove(source);
                next.sections.insert(destination, moved);
                Ok(next)
            }
            DragEvent::Lesson {
                source,
                destination,
            } => {
                self.check_lesson(source.section, source.index)?;
                let Some(destination) = destination else {
                    return Ok(self.clone());
                };
                self.check_section(destination.section)?;

                if destination.section == source.section {
                    let len = self.sections[source.section].lessons.len();
                    let dest_index = destination.index.min(len - 1);
                    if dest_index == source.index {
                        return Ok(self.clone());
                    }
                    let mut next = self.clone();
                    let lessons = &mut next.sections[source.section].lessons;
                    let moved = lessons.remove(source.index);
                    lessons.insert(dest_index, moved);
                    return Ok(next);
                }

                let mut next = self.clone();
                let moved = next.sections[source.section].lessons.remove(source.index);
                let target = &mut next.sections[destination.section].lessons;
                let dest_index = destination.index.min(target.len());
                target.insert(dest_index, moved);
                Ok(next)
            }
        }
    }

    /// Sum every parseable `MM:SS` lesson duration and render it as
    /// `"{h}h {m}m"`, truncating leftover seconds. Unparseable or missing
    /// durations contribute zero; the field is display-only and permissive.
    pub fn total_duration(&self) -> String {
        let total_seconds: u64 = self
            .sections
            .iter()
            .flat_map(|s| s.lessons.iter())
            .filter_map(|l| l.duration.as_deref().and_then(parse_mm_ss))
            .sum();
        format!("{}h {}m", total_seconds / 3600, (total_seconds % 3600) / 60)
    }
}

/// Parse `MM:SS` into seconds. Minutes take one or more digits, seconds
/// exactly two and below sixty; anything else is rejected.
fn parse_mm_ss(raw: &str) -> Option<u64> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if seconds.len() != 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, kind: LessonKind, duration: Option<&str>) -> LessonDraft {
        LessonDraft {
            title: title.to_string(),
            kind,
            content: None,
            duration: duration.map(|d| d.to_string()),
        }
    }

    fn two_section_state() -> CurriculumState {
        let state = CurriculumState::new()
            .add_section("Getting Started", "intro")
            .add_section("Deep Dive", "");
        let state = state
            .add_lesson(0, draft("Welcome", LessonKind::Video, Some("10:30")))
            .unwrap();
        let state = state
            .add_lesson(0, draft("Setup", LessonKind::Text, None))
            .unwrap();
        state
            .add_lesson(1, draft("Internals", LessonKind::Video, Some("5:45")))
            .unwrap()
    }

    #[test]
    fn blank_section_title_is_a_silent_noop() {
        let state = CurriculumState::new().add_section("Basics", "");
        let after = state.add_section("   ", "described anyway");
        assert_eq!(after, state);
        assert_eq!(after.section_count(), 1);
    }

    #[test]
    fn add_section_appends_and_preserves_order() {
        let state = CurriculumState::new()
            .add_section("A", "")
            .add_section("B", "")
            .add_section("C", "");
        let titles: Vec<&str> = state.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn delete_section_shifts_later_sections_down() {
        let state = CurriculumState::new()
            .add_section("S0", "")
            .add_section("S1", "")
            .add_section("S2", "");
        let after = state.delete_section(1).unwrap();
        assert_eq!(after.section_count(), 2);
        assert_eq!(after.sections()[0].title, "S0");
        assert_eq!(after.sections()[1].title, "S2");
    }

    #[test]
    fn out_of_range_update_reports_error_and_mutates_nothing() {
        let state = two_section_state();
        let err = state.update_section(99, "x", "y").unwrap_err();
        assert_eq!(
            err,
            CurriculumError::OutOfRange {
                kind: IndexKind::Section,
                index: 99,
                len: 2
            }
        );
        // The receiver is untouched by construction; confirm a fresh call
        // still sees the original titles.
        assert_eq!(state.sections()[0].title, "Getting Started");
    }

    #[test]
    fn lesson_ids_stay_unique_across_deletes_and_moves() {
        let mut state = two_section_state();
        state = state.delete_lesson(0, 0).unwrap();
        state = state
            .add_lesson(1, draft("Wrap Up", LessonKind::Assignment, None))
            .unwrap();
        state = state
            .apply_drag(&DragEvent::Lesson {
                source: LessonSlot {
                    section: 0,
                    index: 0,
                },
                destination: Some(LessonSlot {
                    section: 1,
                    index: 0,
                }),
            })
            .unwrap();

        let mut ids: Vec<u64> = state
            .sections()
            .iter()
            .flat_map(|s| s.lessons.iter().map(|l| l.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn patch_merges_fields_and_never_touches_the_id() {
        let state = two_section_state();
        let before_id = state.sections()[0].lessons[0].id;
        let after = state
            .update_lesson(
                0,
                0,
                LessonPatch {
                    title: Some("Welcome!".to_string()),
                    duration: Some(None),
                    ..LessonPatch::default()
                },
            )
            .unwrap();
        let lesson = &after.sections()[0].lessons[0];
        assert_eq!(lesson.id, before_id);
        assert_eq!(lesson.title, "Welcome!");
        assert_eq!(lesson.duration, None);
        assert_eq!(lesson.kind, LessonKind::Video);
    }

    #[test]
    fn blank_patched_title_keeps_the_old_title() {
        let state = two_section_state();
        let after = state
            .update_lesson(
                0,
                1,
                LessonPatch {
                    title: Some("  ".to_string()),
                    ..LessonPatch::default()
                },
            )
            .unwrap();
        assert_eq!(after.sections()[0].lessons[1].title, "Setup");
    }

    #[test]
    fn same_slot_drop_returns_equal_state() {
        let state = two_section_state();
        let section_noop = state
            .apply_drag(&DragEvent::Section {
                source: 1,
                destination: Some(1),
            })
            .unwrap();
        assert_eq!(section_noop, state);

        let lesson_noop = state
            .apply_drag(&DragEvent::Lesson {
                source: LessonSlot {
                    section: 0,
                    index: 1,
                },
                destination: Some(LessonSlot {
                    section: 0,
                    index: 1,
                }),
            })
            .unwrap();
        assert_eq!(lesson_noop, state);
    }

    #[test]
    fn missing_destination_is_a_noop() {
        let state = two_section_state();
        let after = state
            .apply_drag(&DragEvent::Section {
                source: 0,
                destination: None,
            })
            .unwrap();
        assert_eq!(after, state);
    }

    #[test]
    fn section_reorder_moves_and_closes_the_gap() {
        let state = CurriculumState::new()
            .add_section("A", "")
            .add_section("B", "")
            .add_section("C", "");
        let after = state
            .apply_drag(&DragEvent::Section {
                source: 0,
                destination: Some(2),
            })
            .unwrap();
        let titles: Vec<&str> = after.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
    }

    #[test]
    fn cross_section_move_transfers_exactly_one_lesson() {
        // A=[l1,l2], B=[l3]; move l1 -> B@1 gives A=[l2], B=[l3,l1].
        let state = two_section_state();
        let l1 = state.sections()[0].lessons[0].clone();
        let after = state
            .apply_drag(&DragEvent::Lesson {
                source: LessonSlot {
                    section: 0,
                    index: 0,
                },
                destination: Some(LessonSlot {
                    section: 1,
                    index: 1,
                }),
            })
            .unwrap();
        assert_eq!(after.sections()[0].lessons.len(), 1);
        assert_eq!(after.sections()[0].lessons[0].title, "Setup");
        assert_eq!(after.sections()[1].lessons.len(), 2);
        assert_eq!(after.sections()[1].lessons[1], l1);
        assert_eq!(after.lesson_count(), state.lesson_count());
    }

    #[test]
    fn drag_source_out_of_range_errors() {
        let state = two_section_state();
        let err = state
            .apply_drag(&DragEvent::Lesson {
                source: LessonSlot {
                    section: 1,
                    index: 5,
                },
                destination: Some(LessonSlot {
                    section: 0,
                    index: 0,
                }),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CurriculumError::OutOfRange {
                kind: IndexKind::Lesson,
                index: 5,
                len: 1
            }
        ));
    }

    #[test]
    fn total_duration_sums_parseable_lessons_only() {
        // 10:30 + 5:45 = 16:15, truncated to whole minutes.
        let state = two_section_state();
        assert_eq!(state.total_duration(), "0h 16m");

        let padded = state
            .add_lesson(1, draft("Junk", LessonKind::Video, Some("not-a-time")))
            .unwrap();
        assert_eq!(padded.total_duration(), "0h 16m");
    }

    #[test]
    fn total_duration_rolls_minutes_into_hours() {
        let state = CurriculumState::new()
            .add_section("Long", "")
            .add_lesson(0, draft("Movie", LessonKind::Video, Some("95:10")))
            .unwrap();
        assert_eq!(state.total_duration(), "1h 35m");
    }

    #[test]
    fn parse_mm_ss_rejects_malformed_inputs() {
        assert_eq!(parse_mm_ss("10:30"), Some(630));
        assert_eq!(parse_mm_ss("5:45"), Some(345));
        assert_eq!(parse_mm_ss("5:9"), None);
        assert_eq!(parse_mm_ss("5:99"), None);
        assert_eq!(parse_mm_ss(":30"), None);
        assert_eq!(parse_mm_ss("abc"), None);
        assert_eq!(parse_mm_ss("-5:30"), None);
    }
}
