//! Task entity and completion state machine.
//!
//! A [`Task`] wraps one decoded checkbox line with its identity (document
//! path + 1-based line number) and the mutation API the presentation layer
//! drives. Completion is two-phase: [`Task::complete`] stages it in memory,
//! [`Task::uncomplete`] reverts the stage, and [`Task::commit`] stamps the
//! completion date and persists the re-encoded line.
//!
//! State is never hidden behind getters: `Completed` is derived purely from
//! the presence of a completion date, and the pending stage is one explicit
//! flag owned by this struct.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::category::Category;
use crate::date;
use crate::error::{Error, Result};
use crate::line::{self, TaskFields};
use crate::priority::Priority;
use crate::vault;

/// Stable composite identity: source document plus 1-based line number.
///
/// Derived at construction and never changes, even when fields mutate.
/// Only stable while the underlying document is not edited externally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId {
    pub path: PathBuf,
    pub line: usize,
}

impl TaskId {
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Parse the `<path>:<line>` form used on the CLI.
    pub fn parse(text: &str) -> Result<TaskId> {
        let (path, line) = text
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidArgument(format!("invalid task id: {text}")))?;
        let line: usize = line
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("invalid task id: {text}")))?;
        if path.is_empty() || line == 0 {
            return Err(Error::InvalidArgument(format!("invalid task id: {text}")));
        }
        Ok(TaskId::new(path, line))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

impl serde::Serialize for TaskId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Completion lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Todo,
    PendingCompletion,
    Completed,
}

/// One task line, parsed, with identity and mutation operations.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    raw_content: String,
    fields: TaskFields,
    staged: bool,
    modified_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Construct a task from a raw line at `line_number` (1-based) of
    /// `path`. The caller has already checked the task-line predicate.
    pub fn from_line(
        path: impl Into<PathBuf>,
        line_number: usize,
        raw: &str,
        modified_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: TaskId::new(path, line_number),
            raw_content: raw.to_string(),
            fields: line::decode(raw),
            staged: false,
            modified_date,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.id.path
    }

    pub fn line(&self) -> usize {
        self.id.line
    }

    /// The original unparsed line, verbatim.
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    pub fn fields(&self) -> &TaskFields {
        &self.fields
    }

    pub fn content(&self) -> &str {
        &self.fields.content
    }

    pub fn priority(&self) -> Priority {
        self.fields.priority
    }

    pub fn category(&self) -> Category {
        self.fields.category
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.fields.due_date
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.fields.completion_date
    }

    pub fn projects(&self) -> &[String] {
        &self.fields.projects
    }

    pub fn assignees(&self) -> &[String] {
        &self.fields.assignees
    }

    /// Last-modified timestamp of the source document. Informational only.
    pub fn modified_date(&self) -> Option<DateTime<Utc>> {
        self.modified_date
    }

    /// Pure state derivation: a completion date means `Completed`; the
    /// staged flag means `PendingCompletion`; otherwise `Todo`.
    pub fn state(&self) -> TaskState {
        if self.fields.completion_date.is_some() {
            TaskState::Completed
        } else if self.staged {
            TaskState::PendingCompletion
        } else {
            TaskState::Todo
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state() == TaskState::Completed
    }

    pub fn is_pending_completion(&self) -> bool {
        self.state() == TaskState::PendingCompletion
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(date::today())
    }

    pub fn is_due(&self) -> bool {
        self.is_due_on(date::today())
    }

    /// Due date strictly before `day`.
    pub fn is_overdue_on(&self, day: NaiveDate) -> bool {
        self.fields.due_date.map(|due| due < day).unwrap_or(false)
    }

    /// Due date on or before `day`.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.fields.due_date.map(|due| due <= day).unwrap_or(false)
    }

    /// Stage completion. Pure in-memory, no I/O; reversible with
    /// [`Task::uncomplete`] until [`Task::commit`] runs. Safe to call again
    /// while already staged; no effect on completed tasks.
    pub fn complete(&mut self) {
        if self.fields.completion_date.is_none() {
            self.staged = true;
        }
    }

    /// Revert a staged completion. No effect on committed tasks.
    pub fn uncomplete(&mut self) {
        self.staged = false;
    }

    /// Mutate the priority in memory. Persisted by the next `commit`.
    pub fn set_priority(&mut self, priority: Priority) {
        self.fields.priority = priority;
    }

    /// Mutate the due date in memory. Persisted by the next `commit`.
    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.fields.due_date = due_date;
    }

    /// Mutate the task text in memory. Persisted by the next `commit`.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.fields.content = content.into();
    }

    /// Persist the task back to its source line.
    ///
    /// A staged completion is stamped with today's date first, which
    /// transitions the derived state to `Completed`. Without a stage this
    /// still persists pending field edits. The write goes through
    /// [`vault::rewrite_line`]; its out-of-bounds error propagates.
    pub fn commit(&mut self) -> Result<()> {
        if self.staged && self.fields.completion_date.is_none() {
            self.fields.completion_date = Some(date::today());
        }
        self.staged = false;

        let encoded = line::encode(&self.fields);
        vault::rewrite_line(&self.id.path, self.id.line, &encoded)?;
        self.raw_content = encoded;
        Ok(())
    }

    /// Two-phase completion as an explicit handle: exactly one of
    /// [`StagedCompletion::confirm`] or [`StagedCompletion::cancel`] can
    /// run, because each consumes the handle and the handle holds the only
    /// mutable borrow of the task.
    pub fn stage_completion(&mut self) -> StagedCompletion<'_> {
        self.complete();
        StagedCompletion { task: self }
    }
}

/// Handle for a staged completion. Dropping it without calling either
/// method leaves the task pending, to be committed or reverted later
/// through the task itself.
pub struct StagedCompletion<'a> {
    task: &'a mut Task,
}

impl StagedCompletion<'_> {
    pub fn task(&self) -> &Task {
        self.task
    }

    /// Commit the completion to storage.
    pub fn confirm(self) -> Result<()> {
        self.task.commit()
    }

    /// Revert the stage; the task returns to `Todo` and no write happens.
    pub fn cancel(self) {
        self.task.uncomplete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn task_from(raw: &str) -> Task {
        Task::from_line("notes/inbox.md", 3, raw, None)
    }

    #[test]
    fn id_is_display_stable_and_parseable() {
        let task = task_from("- [ ] water the plants");
        let id = task.id().to_string();
        assert_eq!(id, "notes/inbox.md:3");
        assert_eq!(TaskId::parse(&id).unwrap(), *task.id());
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!(TaskId::parse("no-line-number").is_err());
        assert!(TaskId::parse("file.md:zero").is_err());
        assert!(TaskId::parse("file.md:0").is_err());
    }

    #[test]
    fn fresh_task_is_todo() {
        let task = task_from("- [ ] water the plants");
        assert_eq!(task.state(), TaskState::Todo);
        assert!(!task.is_completed());
        assert!(!task.is_pending_completion());
    }

    #[test]
    fn complete_stages_and_uncomplete_reverts() {
        let mut task = task_from("- [ ] water the plants");
        task.complete();
        assert_eq!(task.state(), TaskState::PendingCompletion);
        // Idempotent while staged.
        task.complete();
        assert_eq!(task.state(), TaskState::PendingCompletion);

        task.uncomplete();
        assert_eq!(task.state(), TaskState::Todo);
    }

    #[test]
    fn completed_task_ignores_stage_and_unstage() {
        let mut task = task_from("- [x] already done ✅ 2024-01-05");
        assert_eq!(task.state(), TaskState::Completed);
        task.complete();
        assert_eq!(task.state(), TaskState::Completed);
        task.uncomplete();
        assert_eq!(task.state(), TaskState::Completed);
    }

    #[test]
    fn due_and_overdue_boundaries() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut task = task_from("- [ ] pay rent");

        task.set_due_date(Some(day.pred_opt().unwrap()));
        assert!(task.is_overdue_on(day));
        assert!(task.is_due_on(day));

        task.set_due_date(Some(day));
        assert!(!task.is_overdue_on(day));
        assert!(task.is_due_on(day));

        task.set_due_date(Some(day.succ_opt().unwrap()));
        assert!(!task.is_overdue_on(day));
        assert!(!task.is_due_on(day));

        task.set_due_date(None);
        assert!(!task.is_overdue_on(day));
        assert!(!task.is_due_on(day));
    }

    #[test]
    fn commit_stamps_completion_and_rewrites_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inbox.md");
        fs::write(&path, "# Inbox\n- [ ] water the plants\n").unwrap();

        let mut task = Task::from_line(&path, 2, "- [ ] water the plants", None);
        task.complete();
        task.commit().unwrap();

        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.completion_date(), Some(date::today()));

        let contents = fs::read_to_string(&path).unwrap();
        let expected = format!(
            "# Inbox\n- [x] water the plants ✅ {}\n",
            date::format_date(date::today())
        );
        assert_eq!(contents, expected);
    }

    #[test]
    fn commit_without_stage_persists_field_edits_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inbox.md");
        fs::write(&path, "- [ ] water the plants\n").unwrap();

        let mut task = Task::from_line(&path, 1, "- [ ] water the plants", None);
        task.set_priority(Priority::P2);
        task.commit().unwrap();

        assert_eq!(task.state(), TaskState::Todo);
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "- [ ] water the plants {p2}\n");
    }

    #[test]
    fn set_priority_never_duplicates_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inbox.md");
        fs::write(&path, "- [ ] water the plants {p3}\n").unwrap();

        let mut task = Task::from_line(&path, 1, "- [ ] water the plants {p3}", None);
        task.set_priority(Priority::P2);
        task.commit().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("{p2}").count(), 1);
        assert!(!contents.contains("{p3}"));
    }

    #[test]
    fn staged_completion_handle_confirms_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inbox.md");
        fs::write(&path, "- [ ] water the plants\n").unwrap();

        let mut task = Task::from_line(&path, 1, "- [ ] water the plants", None);
        task.stage_completion().confirm().unwrap();
        assert!(task.is_completed());
    }

    #[test]
    fn staged_completion_handle_cancel_leaves_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inbox.md");
        let before = "- [ ] water the plants\n";
        fs::write(&path, before).unwrap();

        let mut task = Task::from_line(&path, 1, "- [ ] water the plants", None);
        task.stage_completion().cancel();

        assert_eq!(task.state(), TaskState::Todo);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}
