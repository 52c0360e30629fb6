use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("Index {0} is out of range")]
    IndexOutOfRange(i64),
    #[error("Invalid date format: '{0}'. Expected format: YYYY-MM-DD")]
    DateParse(String),
    #[error("Invalid priority level: '{0}'. Expected high, medium, or low")]
    PriorityParse(String),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key for a priority. Unknown priorities rank above `high` so they land last
/// in ascending order.
pub fn priority_rank(priority: Option<Priority>) -> u8 {
    match priority {
        Some(Priority::High) => 3,
        Some(Priority::Medium) => 2,
        Some(Priority::Low) => 1,
        None => 4,
    }
}

pub fn parse_priority(raw: &str) -> Result<Priority, TodoError> {
    match raw.to_lowercase().as_str() {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        "low" => Ok(Priority::Low),
        _ => Err(TodoError::PriorityParse(raw.to_string())),
    }
}

/// Parses a strict `YYYY-MM-DD` date. Forms chrono would otherwise accept, such as
/// unpadded months, are rejected.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, TodoError> {
    NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DUE_DATE_FORMAT).to_string() == raw)
        .ok_or_else(|| TodoError::DateParse(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Todo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        serialize_with = "serialize_priority",
        deserialize_with = "deserialize_priority"
    )]
    pub priority: Option<Priority>,
}

impl Todo {
    pub fn new(
        title: impl Into<String>,
        due_date: Option<NaiveDate>,
        priority: Option<Priority>,
    ) -> Self {
        Self {
            title: title.into(),
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            due_date,
            priority,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList {
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Todo> {
        self.todos.iter()
    }

    pub fn as_slice(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, index: usize) -> Option<&Todo> {
        self.todos.get(index)
    }

    /// Appends a new open task and returns its index.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        due_date: Option<NaiveDate>,
        priority: Option<Priority>,
    ) -> usize {
        self.todos.push(Todo::new(title, due_date, priority));
        self.todos.len() - 1
    }

    pub fn remove(&mut self, index: i64) -> Result<Todo, TodoError> {
        let idx = self.validate_index(index)?;
        Ok(self.todos.remove(idx))
    }

    pub fn toggle_complete(&mut self, index: i64) -> Result<&Todo, TodoError> {
        let idx = self.validate_index(index)?;
        let todo = &mut self.todos[idx];
        todo.completed = !todo.completed;
        todo.completed_at = if todo.completed { Some(Utc::now()) } else { None };
        Ok(todo)
    }

    pub fn edit_title(&mut self, index: i64, title: impl Into<String>) -> Result<(), TodoError> {
        let idx = self.validate_index(index)?;
        self.todos[idx].title = title.into();
        Ok(())
    }

    /// Stable sort by priority rank.
    pub fn sort_by_priority(&mut self, order: SortOrder) {
        match order {
            SortOrder::Asc => self.todos.sort_by_key(|todo| priority_rank(todo.priority)),
            SortOrder::Desc => self
                .todos
                .sort_by_key(|todo| std::cmp::Reverse(priority_rank(todo.priority))),
        }
    }

    pub fn count_completed(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    fn validate_index(&self, index: i64) -> Result<usize, TodoError> {
        usize::try_from(index)
            .ok()
            .filter(|idx| *idx < self.todos.len())
            .ok_or(TodoError::IndexOutOfRange(index))
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Todo;
    type IntoIter = std::slice::Iter<'a, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.todos.iter()
    }
}

fn serialize_priority<S>(value: &Option<Priority>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.map(Priority::as_str).unwrap_or(""))
}

// Empty or unrecognized values load as unknown.
fn deserialize_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| parse_priority(raw.trim()).ok()))
}

// Legacy files stored due dates as full RFC 3339 timestamps.
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT) {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.date_naive()))
        .map_err(|err| serde::de::Error::custom(format!("invalid due date '{raw}': {err}")))
}
