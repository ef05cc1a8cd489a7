//! Prompt and confirmation seams
//!
//! Front ends implement [`Prompter`] and [`Confirm`]; the flows here turn
//! their answers into [`AppCommand`]s, so a dialog, a terminal or a test
//! double all drive the board the same way.

use bento::{Category, Dashboard};
use chrono::NaiveDate;

use crate::app::state::AppCommand;

/// What to ask for: a title and one or two input placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub title: &'static str,
    pub first: &'static str,
    /// Placeholder of the second input; `None` hides it
    pub second: Option<&'static str>,
    /// Pre-filled value of the first input
    pub initial: Option<String>,
}

impl PromptRequest {
    /// Name and url of a new item
    pub fn add_item(category: Category) -> Self {
        let (title, first) = match category {
            Category::Favorites => ("Add Shortcut", "Website name"),
            Category::Playlist => ("Add Playlist", "Song name"),
            Category::Readings => ("Add Reading", "Material name"),
            Category::Resources => ("Add Learning Resource", "Platform/course name"),
        };
        let second = match category {
            Category::Favorites => "URL (https://...)",
            _ => "Link URL",
        };
        Self {
            title,
            first,
            second: Some(second),
            initial: None,
        }
    }

    pub fn add_todo() -> Self {
        Self {
            title: "Add Task",
            first: "What needs doing?",
            second: None,
            initial: None,
        }
    }

    /// Suggests "Dashboard N" for the next dashboard
    pub fn add_dashboard(existing: usize) -> Self {
        Self {
            title: "Dashboard name:",
            first: "Name",
            second: None,
            initial: Some(format!("Dashboard {}", existing + 1)),
        }
    }

    pub fn rename_dashboard(current_name: &str) -> Self {
        Self {
            title: "Rename dashboard:",
            first: "Name",
            second: None,
            initial: Some(current_name.to_string()),
        }
    }
}

/// Values entered for a [`PromptRequest`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptAnswer {
    pub first: String,
    /// Empty when the request had no second input
    pub second: String,
}

impl PromptAnswer {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Asks the user for one or two text values
pub trait Prompter {
    /// `None` when the user cancels
    fn prompt(&mut self, request: &PromptRequest) -> Option<PromptAnswer>;
}

/// Asks the user a yes/no question
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Answers every question with yes (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// An empty first value counts as cancelled
fn answered(prompter: &mut dyn Prompter, request: &PromptRequest) -> Option<PromptAnswer> {
    prompter.prompt(request).filter(|a| !a.first.is_empty())
}

pub fn add_item_flow(prompter: &mut dyn Prompter, category: Category) -> Option<AppCommand> {
    let answer = answered(prompter, &PromptRequest::add_item(category))?;
    Some(AppCommand::AddItem {
        category,
        name: answer.first,
        url: answer.second,
    })
}

pub fn add_todo_flow(prompter: &mut dyn Prompter, day: NaiveDate) -> Option<AppCommand> {
    let answer = answered(prompter, &PromptRequest::add_todo())?;
    Some(AppCommand::AddTodo {
        day,
        text: answer.first,
    })
}

pub fn add_dashboard_flow(prompter: &mut dyn Prompter, existing: usize) -> Option<AppCommand> {
    let answer = answered(prompter, &PromptRequest::add_dashboard(existing))?;
    Some(AppCommand::AddDashboard(answer.first))
}

pub fn rename_dashboard_flow(
    prompter: &mut dyn Prompter,
    dashboard: &Dashboard,
) -> Option<AppCommand> {
    let answer = answered(prompter, &PromptRequest::rename_dashboard(&dashboard.name))?;
    Some(AppCommand::RenameDashboard {
        id: dashboard.id.clone(),
        name: answer.first,
    })
}

/// Confirmation text for deleting a dashboard
pub fn delete_dashboard_message(name: &str) -> String {
    format!("Delete \"{name}\"? This cannot be undone.")
}

/// Asks before deleting; the last dashboard is refused without asking
pub fn delete_dashboard_flow(
    confirm: &mut dyn Confirm,
    dashboard: &Dashboard,
    can_delete: bool,
) -> Option<AppCommand> {
    if !can_delete {
        return None;
    }
    confirm
        .confirm(&delete_dashboard_message(&dashboard.name))
        .then(|| AppCommand::DeleteDashboard(dashboard.id.clone()))
}

/// Favorites ask before deleting; other lists delete straight away
pub fn delete_item_flow(
    confirm: &mut dyn Confirm,
    category: Category,
    index: usize,
) -> Option<AppCommand> {
    if category == Category::Favorites && !confirm.confirm("Delete this shortcut?") {
        return None;
    }
    Some(AppCommand::DeleteItem { category, index })
}

pub fn reset_theme_flow(confirm: &mut dyn Confirm) -> Option<AppCommand> {
    confirm
        .confirm("Reset all settings to default?")
        .then_some(AppCommand::ResetTheme)
}
