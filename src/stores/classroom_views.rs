use crate::models::classroom::ClassroomDetail;
use crate::models::student::Student;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Proof that a load was started for a classroom view. Only the most recent
/// ticket of a still-open view may apply its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTicket {
    key: ViewKey,
    generation: u64,
}

impl ViewTicket {
    pub fn scope(&self) -> &str {
        &self.key.0
    }

    pub fn classroom_id(&self) -> &str {
        &self.key.1
    }
}

// (session scope, classroom id)
type ViewKey = (String, String);

fn view_key(scope: &str, classroom_id: &str) -> ViewKey {
    (scope.to_string(), classroom_id.to_string())
}

struct ViewEntry {
    generation: u64,
    detail: Option<ClassroomDetail>,
}

/// Open classroom views per session and the last detail applied to each.
///
/// A load whose view was closed or re-opened by a later load while it was in
/// flight still completes, but its result is discarded instead of
/// overwriting newer state.
pub struct ClassroomViews {
    views: DashMap<ViewKey, ViewEntry>,
    next_generation: AtomicU64,
}

impl ClassroomViews {
    pub fn new() -> Self {
        Self {
            views: DashMap::new(),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start a load for `classroom_id`, superseding any load in flight.
    pub fn begin(&self, scope: &str, classroom_id: &str) -> ViewTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let key = view_key(scope, classroom_id);

        self.views
            .entry(key.clone())
            .and_modify(|entry| entry.generation = generation)
            .or_insert(ViewEntry {
                generation,
                detail: None,
            });

        ViewTicket { key, generation }
    }

    /// Apply a finished load. Returns false when the ticket is stale.
    pub fn complete(&self, ticket: &ViewTicket, detail: ClassroomDetail) -> bool {
        match self.views.get_mut(&ticket.key) {
            Some(mut entry) if entry.generation == ticket.generation => {
                entry.detail = Some(detail);
                true
            }
            _ => false,
        }
    }

    /// Close the view; in-flight loads for it will be discarded.
    pub fn close(&self, scope: &str, classroom_id: &str) -> bool {
        self.views.remove(&view_key(scope, classroom_id)).is_some()
    }

    /// Close every view of a session. Returns how many were open.
    pub fn close_scope(&self, scope: &str) -> usize {
        let before = self.views.len();
        self.views.retain(|key, _| key.0 != scope);
        before.saturating_sub(self.views.len())
    }

    pub fn current(&self, scope: &str, classroom_id: &str) -> Option<ClassroomDetail> {
        self.views
            .get(&view_key(scope, classroom_id))
            .and_then(|entry| entry.detail.clone())
    }

    /// Append a newly created student to the open view's roster instead of
    /// re-fetching it. `None` when there is no loaded view to patch.
    pub fn patch_roster(&self, scope: &str, classroom_id: &str, student: Student) -> Option<ClassroomDetail> {
        let mut entry = self.views.get_mut(&view_key(scope, classroom_id))?;
        let detail = entry.detail.as_mut()?;

        if !detail.students.iter().any(|s| s.user_id == student.user_id) {
            detail.students.push(student);
        }

        Some(detail.clone())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Default for ClassroomViews {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classroom::AssignmentsStatus;

    const S: &str = "teacher-1";

    fn student(id: &str) -> Student {
        Student {
            user_id: id.to_string(),
            name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            email: format!("{}@example.com", id),
            dni: "123".to_string(),
            chosen_skin: None,
        }
    }

    fn detail(classroom_id: &str, students: Vec<Student>) -> ClassroomDetail {
        ClassroomDetail {
            classroom_id: classroom_id.to_string(),
            students,
            assignments: Vec::new(),
            assignments_status: AssignmentsStatus::Skipped,
        }
    }

    #[test]
    fn test_complete_applies_current_ticket() {
        let views = ClassroomViews::new();
        let ticket = views.begin(S, "c1");

        assert!(views.complete(&ticket, detail("c1", vec![student("u1")])));
        assert_eq!(views.current(S, "c1").unwrap().students.len(), 1);
    }

    #[test]
    fn test_superseded_ticket_is_discarded() {
        let views = ClassroomViews::new();
        let first = views.begin(S, "c1");
        let second = views.begin(S, "c1");

        assert!(views.complete(&second, detail("c1", vec![student("u1"), student("u2")])));
        assert!(!views.complete(&first, detail("c1", vec![])));
        assert_eq!(views.current(S, "c1").unwrap().students.len(), 2);
    }

    #[test]
    fn test_closed_view_discards_in_flight_result() {
        let views = ClassroomViews::new();
        let ticket = views.begin(S, "c1");

        assert!(views.close(S, "c1"));
        assert!(!views.complete(&ticket, detail("c1", vec![])));
        assert!(views.current(S, "c1").is_none());
        assert!(views.is_empty());
    }

    #[test]
    fn test_reopened_view_rejects_ticket_from_before_close() {
        let views = ClassroomViews::new();
        let old = views.begin(S, "c1");
        views.close(S, "c1");
        let new = views.begin(S, "c1");

        assert!(!views.complete(&old, detail("c1", vec![])));
        assert!(views.complete(&new, detail("c1", vec![student("u1")])));
    }

    #[test]
    fn test_views_are_independent() {
        let views = ClassroomViews::new();
        let a = views.begin(S, "c1");
        let b = views.begin(S, "c2");

        assert!(views.complete(&b, detail("c2", vec![])));
        assert!(views.complete(&a, detail("c1", vec![])));
        assert_eq!(views.len(), 2);
    }

    #[test]
    fn test_patch_roster_appends_once() {
        let views = ClassroomViews::new();
        let ticket = views.begin(S, "c1");
        views.complete(&ticket, detail("c1", vec![student("u1")]));

        let patched = views.patch_roster(S, "c1", student("u2")).unwrap();
        assert_eq!(patched.students.len(), 2);
        assert_eq!(patched.students[1].user_id, "u2");

        let again = views.patch_roster(S, "c1", student("u2")).unwrap();
        assert_eq!(again.students.len(), 2);
    }

    #[test]
    fn test_patch_roster_without_loaded_view() {
        let views = ClassroomViews::new();
        assert!(views.patch_roster(S, "c1", student("u1")).is_none());

        views.begin(S, "c1");
        assert!(views.patch_roster(S, "c1", student("u1")).is_none());
    }

    #[test]
    fn test_sessions_do_not_share_views() {
        let views = ClassroomViews::new();
        let mine = views.begin(S, "c1");
        let theirs = views.begin("teacher-2", "c1");

        assert!(views.close("teacher-2", "c1"));
        assert!(!views.complete(&theirs, detail("c1", vec![])));
        assert!(views.complete(&mine, detail("c1", vec![student("u1")])));
        assert_eq!(mine.scope(), S);
        assert_eq!(mine.classroom_id(), "c1");
    }

    #[test]
    fn test_close_scope_drops_only_that_session() {
        let views = ClassroomViews::new();
        views.begin(S, "c1");
        views.begin(S, "c2");
        views.begin("teacher-2", "c1");

        assert_eq!(views.close_scope(S), 2);
        assert_eq!(views.len(), 1);
    }
}
