//! Interactive task browser.
//!
//! A ratatui list over the vault's open tasks, grouped by priority.
//! Completing a task stages it and shows a toast with an undo window; the
//! completion commits when the window expires, when another task is
//! completed, on reload, or on quit. Until then `u` cancels it and the
//! document is untouched.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tempfile::NamedTempFile;

use crate::category::{Category, CATEGORIES};
use crate::config;
use crate::error::Result;
use crate::priority::Priority;
use crate::task::{Task, TaskId};
use crate::vault::{TaskFilter, Vault};

use super::view;

const EVENT_POLL_MS: u64 = 120;

/// A staged completion waiting out its undo window.
pub(crate) struct PendingToast {
    pub(crate) task_id: TaskId,
    pub(crate) content: String,
    pub(crate) deadline: Instant,
}

pub struct AppState {
    pub(crate) tasks: Vec<Task>,
    pub(crate) filtered: Vec<usize>,
    pub(crate) selected: usize,
    pub(crate) filter: String,
    pub(crate) filter_active: bool,
    pub(crate) category_filter: Option<Category>,
    pub(crate) pending: Option<PendingToast>,
    pub(crate) status_message: Option<String>,
    pub(crate) show_completed: bool,
    grace: Duration,
    vault: Vault,
}

impl AppState {
    fn new(vault: Vault, grace: Duration, show_completed: bool) -> Self {
        Self {
            tasks: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            filter: String::new(),
            filter_active: false,
            category_filter: None,
            pending: None,
            status_message: None,
            show_completed,
            grace,
            vault,
        }
    }

    fn reload(&mut self) -> Result<()> {
        self.finalize_pending()?;
        let filter = if self.show_completed {
            TaskFilter::All
        } else {
            TaskFilter::Unchecked
        };
        let mut tasks = self.vault.query_tasks(filter)?;
        tasks.sort_by(|left, right| {
            left.priority()
                .rank()
                .cmp(&right.priority().rank())
                .then_with(|| left.id().to_string().cmp(&right.id().to_string()))
        });
        self.tasks = tasks;
        self.apply_filter();
        Ok(())
    }

    pub(crate) fn apply_filter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.filtered = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                if let Some(category) = self.category_filter {
                    if task.category() != category {
                        return false;
                    }
                }
                needle.is_empty() || task.content().to_lowercase().contains(&needle)
            })
            .map(|(index, _)| index)
            .collect();
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        let index = *self.filtered.get(self.selected)?;
        self.tasks.get(index)
    }

    fn selected_task_mut(&mut self) -> Option<&mut Task> {
        let index = *self.filtered.get(self.selected)?;
        self.tasks.get_mut(index)
    }

    /// Stage the selected task's completion and open the undo window.
    /// A previous pending completion commits first: only one toast at a
    /// time, as only one of confirm/cancel may ever run per stage.
    fn complete_selected(&mut self) -> Result<()> {
        self.finalize_pending()?;

        let grace = self.grace;
        let Some(task) = self.selected_task_mut() else {
            return Ok(());
        };
        if task.is_completed() {
            return Ok(());
        }

        task.complete();
        let toast = PendingToast {
            task_id: task.id().clone(),
            content: task.content().to_string(),
            deadline: Instant::now() + grace,
        };
        self.pending = Some(toast);
        Ok(())
    }

    /// Cancel the pending completion inside its undo window.
    fn undo_pending(&mut self) {
        let Some(toast) = self.pending.take() else {
            return;
        };
        if let Some(task) = self.task_by_id_mut(&toast.task_id) {
            task.uncomplete();
        }
        self.status_message = Some(format!("Undone: {}", toast.content));
    }

    /// Commit the pending completion, if any. Called on window expiry and
    /// before anything that would invalidate the staged task.
    fn finalize_pending(&mut self) -> Result<()> {
        let Some(toast) = self.pending.take() else {
            return Ok(());
        };
        if let Some(task) = self.task_by_id_mut(&toast.task_id) {
            task.commit()?;
        }
        self.status_message = Some(format!("Completed: {}", toast.content));
        Ok(())
    }

    fn pending_expired(&self) -> bool {
        self.pending
            .as_ref()
            .map(|toast| Instant::now() >= toast.deadline)
            .unwrap_or(false)
    }

    fn task_by_id_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    fn set_selected_priority(&mut self, priority: Priority) -> Result<()> {
        let Some(task) = self.selected_task_mut() else {
            return Ok(());
        };
        task.set_priority(priority);
        task.commit()?;
        let content = task.content().to_string();
        self.status_message = Some(format!("{}: {}", priority.label(), content));
        self.reload()
    }

    fn cycle_category_filter(&mut self) {
        self.category_filter = match self.category_filter {
            None => Some(CATEGORIES[0]),
            Some(current) => {
                let position = CATEGORIES.iter().position(|c| *c == current);
                position
                    .and_then(|index| CATEGORIES.get(index + 1))
                    .copied()
            }
        };
        self.apply_filter();
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.pending.is_some() {
            return "u undo  (completing...)".to_string();
        }
        if self.filter_active {
            return "type filter  backspace delete  enter done  esc clear".to_string();
        }
        "j/k move  x complete  u undo  1-4/0 priority  / filter  c category  e edit  r reload  q quit"
            .to_string()
    }
}

/// Open the browser over the resolved vault.
pub fn run(dir: Option<PathBuf>, show_completed: bool) -> Result<()> {
    let (root, cfg) = config::resolve_vault(dir)?;
    let vault = Vault::open(root)?.with_ignore(&cfg.vault.ignore)?;
    let grace = Duration::from_secs(cfg.browser.undo_grace_seconds);

    let mut app = AppState::new(vault, grace, show_completed);
    app.reload()?;
    run_terminal(&mut app)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    // Whatever happened, the staged completion must not be lost.
    let finalize = app.finalize_pending();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.and(finalize)
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut dirty = true;
    loop {
        if app.pending_expired() {
            app.finalize_pending()?;
            app.reload()?;
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(terminal, app, key)? {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        } else if app.pending.is_some() {
            // Keep the toast countdown visually fresh.
            dirty = true;
        }
    }
    Ok(())
}

/// Returns true when the app should quit.
fn handle_key(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    key: KeyEvent,
) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    if app.filter_active {
        match key.code {
            KeyCode::Esc => {
                app.filter.clear();
                app.filter_active = false;
                app.apply_filter();
            }
            KeyCode::Enter => {
                app.filter_active = false;
            }
            KeyCode::Backspace => {
                app.filter.pop();
                app.apply_filter();
            }
            KeyCode::Char(c) => {
                app.filter.push(c);
                app.apply_filter();
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Esc => {
            if app.filter.is_empty() && app.category_filter.is_none() {
                return Ok(true);
            }
            app.filter.clear();
            app.category_filter = None;
            app.apply_filter();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.selected + 1 < app.filtered.len() {
                app.selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.selected = app.selected.saturating_sub(1);
        }
        KeyCode::Char('x') | KeyCode::Char(' ') => app.complete_selected()?,
        KeyCode::Char('u') => app.undo_pending(),
        KeyCode::Char('/') => {
            app.filter_active = true;
            app.status_message = None;
        }
        KeyCode::Char('c') => app.cycle_category_filter(),
        KeyCode::Char('r') => app.reload()?,
        KeyCode::Char('e') => edit_selected(terminal, app)?,
        KeyCode::Char('1') => app.set_selected_priority(Priority::P1)?,
        KeyCode::Char('2') => app.set_selected_priority(Priority::P2)?,
        KeyCode::Char('3') => app.set_selected_priority(Priority::P3)?,
        KeyCode::Char('4') => app.set_selected_priority(Priority::P4)?,
        KeyCode::Char('0') => app.set_selected_priority(Priority::None)?,
        _ => {}
    }

    Ok(false)
}

/// Edit the selected task's text in `$VISUAL`/`$EDITOR`, then commit.
fn edit_selected(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    app.finalize_pending()?;
    let Some(task) = app.selected_task() else {
        return Ok(());
    };
    let body = task.content().to_string();

    match edit_body_external(terminal, &body) {
        Ok(edited) => {
            let content = edited.lines().next().unwrap_or("").trim().to_string();
            if content.is_empty() || content == body {
                return Ok(());
            }
            if let Some(task) = app.selected_task_mut() {
                task.set_content(content);
                task.commit()?;
            }
            app.reload()?;
        }
        Err(message) => {
            app.status_message = Some(message);
        }
    }

    Ok(())
}

fn edit_body_external(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    body: &str,
) -> std::result::Result<String, String> {
    let mut temp = NamedTempFile::new()
        .map_err(|err| format!("failed to create temp file for editor: {err}"))?;
    temp.write_all(body.as_bytes())
        .map_err(|err| format!("failed to write body to temp file: {err}"))?;
    temp.flush()
        .map_err(|err| format!("failed to flush temp file: {err}"))?;
    let path = temp.path().to_path_buf();

    suspend_terminal(terminal).map_err(|err| format!("failed to suspend terminal: {err}"))?;
    let editor_result = launch_editor(&path);
    let restore_result = resume_terminal(terminal);
    if let Err(err) = restore_result {
        return Err(format!("failed to restore terminal: {err}"));
    }

    let status = editor_result?;
    if !status.success() {
        let detail = status
            .code()
            .map(|code| format!("exit code {code}"))
            .unwrap_or_else(|| "signal".to_string());
        return Err(format!("editor exited with {detail}"));
    }

    fs::read_to_string(&path).map_err(|err| format!("failed to read editor buffer: {err}"))
}

fn suspend_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

fn resume_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;
    Ok(())
}

fn launch_editor(path: &Path) -> std::result::Result<std::process::ExitStatus, String> {
    let candidates = editor_candidates();
    let mut attempted: Vec<String> = Vec::new();
    for candidate in candidates {
        let parts = split_editor_command(&candidate);
        if parts.is_empty() {
            continue;
        }
        attempted.push(parts[0].clone());
        let mut command = Command::new(&parts[0]);
        if parts.len() > 1 {
            command.args(&parts[1..]);
        }
        command.arg(path);
        match command.status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                continue;
            }
            Err(err) => {
                return Err(format!("failed to launch editor '{}': {err}", parts[0]));
            }
        }
    }
    let tried = if attempted.is_empty() {
        "no editor candidates".to_string()
    } else {
        attempted.join(", ")
    };
    Err(format!(
        "no editor found (tried {tried}); set $VISUAL or $EDITOR"
    ))
}

fn editor_candidates() -> Vec<String> {
    let mut out = Vec::new();
    if let Ok(value) = std::env::var("VISUAL") {
        if !value.trim().is_empty() {
            out.push(value);
        }
    }
    if let Ok(value) = std::env::var("EDITOR") {
        if !value.trim().is_empty() {
            out.push(value);
        }
    }
    out.push("vi".to_string());
    out
}

fn split_editor_command(command: &str) -> Vec<String> {
    command
        .split_whitespace()
        .map(|part| part.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_tasks(contents: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("inbox.md"), contents).unwrap();
        let vault = Vault::open(dir.path()).unwrap();
        let mut app = AppState::new(vault, Duration::from_secs(3), false);
        app.reload().unwrap();
        (dir, app)
    }

    #[test]
    fn reload_sorts_by_priority_rank() {
        let (_dir, app) = app_with_tasks("- [ ] low {p4}\n- [ ] high {p1}\n- [ ] none\n");
        let priorities: Vec<Priority> =
            app.tasks.iter().map(|task| task.priority()).collect();
        assert_eq!(priorities, vec![Priority::P1, Priority::P4, Priority::None]);
    }

    #[test]
    fn filter_narrows_by_content() {
        let (_dir, mut app) = app_with_tasks("- [ ] water plants\n- [ ] call mom\n");
        app.filter = "water".to_string();
        app.apply_filter();
        assert_eq!(app.filtered.len(), 1);
        assert_eq!(app.selected_task().unwrap().content(), "water plants");
    }

    #[test]
    fn category_filter_cycles_back_to_all() {
        let (_dir, mut app) = app_with_tasks("- [ ] 💾 code\n");
        assert!(app.category_filter.is_none());
        for _ in 0..CATEGORIES.len() {
            app.cycle_category_filter();
            assert!(app.category_filter.is_some());
        }
        app.cycle_category_filter();
        assert!(app.category_filter.is_none());
    }

    #[test]
    fn undo_within_window_leaves_file_untouched() {
        let (dir, mut app) = app_with_tasks("- [ ] water plants\n");
        app.complete_selected().unwrap();
        assert!(app.pending.is_some());
        assert!(app.selected_task().unwrap().is_pending_completion());

        app.undo_pending();
        assert!(app.pending.is_none());
        assert!(!app.selected_task().unwrap().is_pending_completion());
        assert_eq!(
            fs::read_to_string(dir.path().join("inbox.md")).unwrap(),
            "- [ ] water plants\n"
        );
    }

    #[test]
    fn finalize_commits_staged_completion() {
        let (dir, mut app) = app_with_tasks("- [ ] water plants\n");
        app.complete_selected().unwrap();
        app.finalize_pending().unwrap();

        let written = fs::read_to_string(dir.path().join("inbox.md")).unwrap();
        assert!(written.starts_with("- [x] water plants ✅ "));
    }

    #[test]
    fn completing_again_commits_previous_toast() {
        let (dir, mut app) = app_with_tasks("- [ ] first\n- [ ] second\n");
        app.complete_selected().unwrap();
        app.selected = 1;
        app.complete_selected().unwrap();

        let written = fs::read_to_string(dir.path().join("inbox.md")).unwrap();
        assert!(written.contains("- [x] first ✅ "));
        assert!(written.contains("- [ ] second"));
        assert_eq!(
            app.pending.as_ref().map(|toast| toast.content.as_str()),
            Some("second")
        );
    }
}
