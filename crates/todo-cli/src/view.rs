use chrono::{DateTime, Local, Utc};

use todo_core::todo::{TodoList, DUE_DATE_FORMAT};
use todo_render::Table;

pub const HEADERS: [&str; 7] = [
    "#",
    "Title",
    "Completed",
    "Created At",
    "Completed At",
    "Due Date",
    "Priority",
];

/// Table rows for the list view. The `#` column is the same 0-based index the
/// remove/toggle/edit flags take.
pub fn todo_table(todos: &TodoList) -> Table {
    let mut table = Table::new(HEADERS);
    for (idx, todo) in todos.iter().enumerate() {
        table.push_row([
            idx.to_string(),
            todo.title.clone(),
            todo.completed.to_string(),
            format_timestamp(&todo.created_at),
            todo.completed_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
            todo.due_date
                .map(|date| date.format(DUE_DATE_FORMAT).to_string())
                .unwrap_or_else(|| "No due date".to_string()),
            todo.priority.map(|p| p.to_string()).unwrap_or_default(),
        ]);
    }
    table
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).to_rfc2822()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use todo_core::todo::Priority;

    #[test]
    fn rows_use_zero_based_index_and_placeholders() {
        let mut todos = TodoList::new();
        todos.add("Plain", None, None);
        todos.add("Dated", NaiveDate::from_ymd_opt(2025, 3, 9), Some(Priority::Medium));
        todos.toggle_complete(1).expect("toggle");

        let table = todo_table(&todos);
        assert_eq!(table.headers.len(), HEADERS.len());
        assert_eq!(table.rows.len(), 2);

        let plain = &table.rows[0];
        assert_eq!(plain[0], "0");
        assert_eq!(plain[2], "false");
        assert_eq!(plain[4], "-");
        assert_eq!(plain[5], "No due date");
        assert_eq!(plain[6], "");

        let dated = &table.rows[1];
        assert_eq!(dated[0], "1");
        assert_eq!(dated[2], "true");
        assert_ne!(dated[4], "-");
        assert_eq!(dated[5], "2025-03-09");
        assert_eq!(dated[6], "medium");
    }
}
