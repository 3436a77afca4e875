//! tick mutation command implementations: complete, priority, due, edit.
//!
//! Each command re-scans the task from its document, applies one in-memory
//! mutation, and commits it straight back to the source line. The staged
//! undo window only exists in the interactive browser.

use std::path::PathBuf;

use crate::date;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::priority::Priority;
use crate::task::TaskId;

use super::list::{open_vault, TaskReport};

pub struct CompleteOptions {
    pub id: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct PriorityOptions {
    pub id: String,
    pub value: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DueOptions {
    pub id: String,
    pub value: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub content: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct UpdateReport {
    task: TaskReport,
    line: String,
}

pub fn run_complete(options: CompleteOptions) -> Result<()> {
    let vault = open_vault(options.dir)?;
    let id = TaskId::parse(&options.id)?;
    let mut task = vault.find_task(&id)?;

    if task.is_completed() {
        return Err(Error::OperationFailed(format!(
            "task already completed: {id}"
        )));
    }

    task.complete();
    task.commit()?;

    let mut human = HumanOutput::new(format!("tick complete: {}", task.content()));
    human.push_summary("id", task.id().to_string());
    human.push_summary("completed", date::format_date(date::today()));
    human.push_next_step("tick done");

    let report = UpdateReport {
        line: task.raw_content().to_string(),
        task: TaskReport::from_task(&task),
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "complete",
        &report,
        Some(&human),
    )
}

pub fn run_priority(options: PriorityOptions) -> Result<()> {
    let priority = Priority::from_code(&options.value)
        .ok_or_else(|| Error::InvalidPriority(options.value.clone()))?;

    let vault = open_vault(options.dir)?;
    let id = TaskId::parse(&options.id)?;
    let mut task = vault.find_task(&id)?;

    task.set_priority(priority);
    task.commit()?;

    let mut human = HumanOutput::new(format!("tick priority: {}", task.content()));
    human.push_summary("id", task.id().to_string());
    human.push_summary("priority", priority.label());

    let report = UpdateReport {
        line: task.raw_content().to_string(),
        task: TaskReport::from_task(&task),
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "priority",
        &report,
        Some(&human),
    )
}

pub fn run_due(options: DueOptions) -> Result<()> {
    let due = if options.value.eq_ignore_ascii_case("clear") {
        None
    } else {
        Some(date::parse_date_strict(&options.value)?)
    };

    let vault = open_vault(options.dir)?;
    let id = TaskId::parse(&options.id)?;
    let mut task = vault.find_task(&id)?;

    task.set_due_date(due);
    task.commit()?;

    let mut human = HumanOutput::new(format!("tick due: {}", task.content()));
    human.push_summary("id", task.id().to_string());
    human.push_summary(
        "due",
        due.map(date::format_date).unwrap_or_else(|| "cleared".to_string()),
    );

    let report = UpdateReport {
        line: task.raw_content().to_string(),
        task: TaskReport::from_task(&task),
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "due",
        &report,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let content = options.content.trim();
    if content.is_empty() {
        return Err(Error::InvalidArgument(
            "task content cannot be empty".to_string(),
        ));
    }

    let vault = open_vault(options.dir)?;
    let id = TaskId::parse(&options.id)?;
    let mut task = vault.find_task(&id)?;

    task.set_content(content);
    task.commit()?;

    let mut human = HumanOutput::new(format!("tick edit: {}", task.content()));
    human.push_summary("id", task.id().to_string());

    let report = UpdateReport {
        line: task.raw_content().to_string(),
        task: TaskReport::from_task(&task),
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &report,
        Some(&human),
    )
}
