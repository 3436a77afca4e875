//! tick list/today/done/show command implementations.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::category::Category;
use crate::config;
use crate::date;
use crate::error::{Error, Result};
use crate::priority::{Priority, PRIORITIES};
use crate::task::{Task, TaskId};
use crate::vault::{TaskFilter, Vault};

pub struct ListOptions {
    pub category: Option<String>,
    pub priority: Option<String>,
    pub project: Option<String>,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct TodayOptions {
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DoneOptions {
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// One task as reported to the user.
#[derive(serde::Serialize)]
pub(crate) struct TaskReport {
    pub id: String,
    pub content: String,
    pub priority: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    pub overdue: bool,
}

impl TaskReport {
    pub(crate) fn from_task(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            content: task.content().to_string(),
            priority: task.priority().code().to_string(),
            category: task.category().code().to_string(),
            due_date: task.due_date().map(date::format_date),
            completion_date: task.completion_date().map(date::format_date),
            projects: task.projects().to_vec(),
            assignees: task.assignees().to_vec(),
            overdue: task.is_overdue(),
        }
    }
}

/// Resolve the vault for a command invocation.
pub(crate) fn open_vault(dir: Option<PathBuf>) -> Result<Vault> {
    let (root, config) = config::resolve_vault(dir)?;
    Vault::open(root)?.with_ignore(&config.vault.ignore)
}

#[derive(serde::Serialize)]
struct ListReport {
    vault: PathBuf,
    total: usize,
    tasks: Vec<TaskReport>,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let category = options
        .category
        .as_deref()
        .map(|code| {
            Category::from_code(code)
                .ok_or_else(|| Error::InvalidArgument(format!("unknown category: {code}")))
        })
        .transpose()?;
    let priority = options
        .priority
        .as_deref()
        .map(|code| {
            Priority::from_code(code).ok_or_else(|| Error::InvalidPriority(code.to_string()))
        })
        .transpose()?;

    let vault = open_vault(options.dir)?;
    let mut tasks = vault.query_tasks(TaskFilter::Unchecked)?;

    if let Some(category) = category {
        tasks.retain(|task| task.category() == category);
    }
    if let Some(priority) = priority {
        tasks.retain(|task| task.priority() == priority);
    }
    if let Some(project) = options.project.as_deref() {
        tasks.retain(|task| task.projects().iter().any(|tag| tag == project));
    }

    sort_tasks(&mut tasks);

    let report = ListReport {
        vault: vault.root().to_path_buf(),
        total: tasks.len(),
        tasks: tasks.iter().map(TaskReport::from_task).collect(),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !options.quiet {
        print_grouped_by_priority(&tasks);
    }

    Ok(())
}

pub fn run_today(options: TodayOptions) -> Result<()> {
    let vault = open_vault(options.dir)?;
    let mut tasks = vault.query_tasks(TaskFilter::Unchecked)?;
    tasks.retain(|task| task.is_due());
    sort_tasks(&mut tasks);

    let report = ListReport {
        vault: vault.root().to_path_buf(),
        total: tasks.len(),
        tasks: tasks.iter().map(TaskReport::from_task).collect(),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !options.quiet {
        if tasks.is_empty() {
            println!("Nothing due today.");
        } else {
            print_grouped_by_priority(&tasks);
        }
    }

    Ok(())
}

pub fn run_done(options: DoneOptions) -> Result<()> {
    let vault = open_vault(options.dir)?;
    let tasks = vault.query_tasks(TaskFilter::Completed)?;

    // Newest completion day first, per-document order within a day.
    let mut by_day: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in &tasks {
        let day = task
            .completion_date()
            .unwrap_or_else(date::unknown_completion);
        by_day.entry(day).or_default().push(task);
    }

    let report = ListReport {
        vault: vault.root().to_path_buf(),
        total: tasks.len(),
        tasks: by_day
            .values()
            .rev()
            .flatten()
            .map(|task| TaskReport::from_task(task))
            .collect(),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !options.quiet {
        if by_day.is_empty() {
            println!("No completed tasks.");
        } else {
            for (day, completed) in by_day.iter().rev() {
                println!(
                    "{} --- completed: {}",
                    date::format_date(*day),
                    completed.len()
                );
                for task in completed {
                    println!("  {}", task.content());
                }
                println!();
            }
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ShowReport {
    task: TaskReport,
    raw_content: String,
    state: String,
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let vault = open_vault(options.dir)?;
    let id = TaskId::parse(&options.id)?;
    let task = vault.find_task(&id)?;

    let report = ShowReport {
        task: TaskReport::from_task(&task),
        raw_content: task.raw_content().to_string(),
        state: format!("{:?}", task.state()),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !options.quiet {
        println!("{}", task.content());
        println!("  id:        {}", task.id());
        println!("  state:     {:?}", task.state());
        println!("  priority:  {}", task.priority().label());
        println!("  category:  {}", task.category().label());
        if let Some(due) = task.due_date() {
            println!(
                "  due:       {} ({})",
                date::format_date(due),
                date::relative_label(due, date::today())
            );
        }
        if let Some(done) = task.completion_date() {
            println!("  completed: {}", date::format_date(done));
        }
        if !task.projects().is_empty() {
            println!("  projects:  {}", task.projects().join(", "));
        }
        if !task.assignees().is_empty() {
            println!("  assignees: {}", task.assignees().join(", "));
        }
    }

    Ok(())
}

/// Priority rank first, then stable id order.
pub(crate) fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        left.priority()
            .rank()
            .cmp(&right.priority().rank())
            .then_with(|| left.id().to_string().cmp(&right.id().to_string()))
    });
}

fn print_grouped_by_priority(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No open tasks.");
        return;
    }

    for priority in PRIORITIES {
        let group: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.priority() == priority)
            .collect();
        if group.is_empty() {
            continue;
        }

        println!("{}:", priority.label());
        for task in group {
            println!("  {}  {}{}", task.id(), task.content(), accessories(task));
        }
        println!();
    }
}

fn accessories(task: &Task) -> String {
    let mut parts = Vec::new();

    if task.category() != Category::None {
        parts.push(task.category().glyph().to_string());
    }
    if let Some(due) = task.due_date() {
        let label = date::relative_label(due, date::today());
        if task.is_overdue() {
            parts.push(format!("overdue ({label})"));
        } else {
            parts.push(format!("due {label}"));
        }
    }
    for project in task.projects() {
        parts.push(format!("#{project}"));
    }
    for assignee in task.assignees() {
        parts.push(format!("@{assignee}"));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("  [{}]", parts.join("  "))
    }
}
