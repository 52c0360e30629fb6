use tracing::debug;

use crate::todo::{parse_due_date, parse_priority, SortOrder, Todo, TodoError, TodoList};

pub const ADD_FORMAT_HINT: &str =
    "Invalid add format. Expected <string>:<YYYY-MM-DD>:<high | medium | low>";
pub const EDIT_FORMAT_HINT: &str = "Invalid edit format. Expected <int>:<string>";

/// One raw user request, before any field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add(String),
    Remove(i64),
    Toggle(i64),
    Edit(String),
    List,
    CountCompleted,
    Sort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Added { index: usize },
    Removed { index: usize, todo: Todo },
    Toggled { index: usize, completed: bool },
    Edited { index: usize },
    Listed,
    NoTodos,
    CompletedCount(usize),
    Sorted(Option<SortOrder>),
}

impl CommandOutcome {
    /// Whether the collection changed and needs persisting.
    pub fn mutated(&self) -> bool {
        match self {
            CommandOutcome::Added { .. }
            | CommandOutcome::Removed { .. }
            | CommandOutcome::Toggled { .. }
            | CommandOutcome::Edited { .. } => true,
            CommandOutcome::Sorted(order) => order.is_some(),
            CommandOutcome::Listed | CommandOutcome::NoTodos | CommandOutcome::CompletedCount(_) => {
                false
            }
        }
    }
}

pub fn execute(intent: Option<&Intent>, todos: &mut TodoList) -> Result<CommandOutcome, TodoError> {
    let Some(intent) = intent else {
        return Err(TodoError::Validation(
            "No command provided. Use --help to see the list of available commands".to_string(),
        ));
    };
    debug!(?intent, "executing command");
    match intent {
        Intent::Add(raw) => handle_add(raw, todos),
        Intent::Remove(index) => {
            let todo = todos.remove(*index)?;
            Ok(CommandOutcome::Removed {
                index: *index as usize,
                todo,
            })
        }
        Intent::Toggle(index) => {
            let completed = todos.toggle_complete(*index)?.completed;
            Ok(CommandOutcome::Toggled {
                index: *index as usize,
                completed,
            })
        }
        Intent::Edit(raw) => handle_edit(raw, todos),
        Intent::List => {
            if todos.is_empty() {
                Ok(CommandOutcome::NoTodos)
            } else {
                Ok(CommandOutcome::Listed)
            }
        }
        Intent::CountCompleted => Ok(CommandOutcome::CompletedCount(todos.count_completed())),
        Intent::Sort(raw) => {
            let order = parse_sort_order(raw)?;
            if let Some(order) = order {
                todos.sort_by_priority(order);
            }
            Ok(CommandOutcome::Sorted(order))
        }
    }
}

/// Empty input means "no sort requested".
pub fn parse_sort_order(raw: &str) -> Result<Option<SortOrder>, TodoError> {
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.to_lowercase().as_str() {
        "asc" => Ok(Some(SortOrder::Asc)),
        "desc" => Ok(Some(SortOrder::Desc)),
        _ => Err(TodoError::Validation(
            "Invalid sort order. Expected asc or desc".to_string(),
        )),
    }
}

fn handle_add(raw: &str, todos: &mut TodoList) -> Result<CommandOutcome, TodoError> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [title, due, priority] = parts.as_slice() else {
        return Err(TodoError::Validation(ADD_FORMAT_HINT.to_string()));
    };
    let due_date = parse_due_date(due)?;
    let priority = parse_priority(priority)?;
    let index = todos.add(*title, Some(due_date), Some(priority));
    Ok(CommandOutcome::Added { index })
}

fn handle_edit(raw: &str, todos: &mut TodoList) -> Result<CommandOutcome, TodoError> {
    let Some((index, title)) = raw.split_once(':') else {
        return Err(TodoError::Validation(EDIT_FORMAT_HINT.to_string()));
    };
    let index: i64 = index
        .parse()
        .map_err(|_| TodoError::Validation("Invalid index. Expected an integer".to_string()))?;
    todos.edit_title(index, title)?;
    Ok(CommandOutcome::Edited {
        index: index as usize,
    })
}
