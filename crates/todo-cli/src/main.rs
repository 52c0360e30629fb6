use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use todo_core::command::{execute, CommandOutcome, Intent};
use todo_core::config::resolve_settings;
use todo_core::storage::Storage;
use todo_core::todo::{SortOrder, TodoList};

mod view;

#[derive(Parser)]
#[command(name = "todo", version, about = "Manage a local todo list")]
#[command(group(ArgGroup::new("intent").multiple(false)))]
struct Cli {
    /// Add a new todo
    #[arg(long, value_name = "TITLE:YYYY-MM-DD:PRIORITY", group = "intent")]
    add: Option<String>,
    /// Remove a todo by index
    #[arg(long, value_name = "INDEX", allow_negative_numbers = true, group = "intent")]
    remove: Option<i64>,
    /// Toggle the completion status of a todo by index
    #[arg(long, value_name = "INDEX", allow_negative_numbers = true, group = "intent")]
    toggle: Option<i64>,
    /// Edit the title of a todo by index
    #[arg(long, value_name = "INDEX:TITLE", group = "intent")]
    edit: Option<String>,
    /// List all todos
    #[arg(long, group = "intent")]
    list: bool,
    /// Show the number of completed todos
    #[arg(long, group = "intent")]
    completed: bool,
    /// Sort the todos by priority in asc or desc order
    #[arg(
        long,
        value_name = "asc|desc",
        num_args = 0..=1,
        default_missing_value = "",
        group = "intent"
    )]
    sort: Option<String>,
    /// Todo data file (overrides TODO_FILE and config files)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Output format for --list
    #[arg(long, value_enum)]
    format: Option<Format>,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

impl Cli {
    fn intent(&self) -> Option<Intent> {
        if let Some(raw) = &self.add {
            return Some(Intent::Add(raw.clone()));
        }
        if let Some(index) = self.remove {
            return Some(Intent::Remove(index));
        }
        if let Some(index) = self.toggle {
            return Some(Intent::Toggle(index));
        }
        if let Some(raw) = &self.edit {
            return Some(Intent::Edit(raw.clone()));
        }
        if self.list {
            return Some(Intent::List);
        }
        if self.completed {
            return Some(Intent::CountCompleted);
        }
        self.sort.clone().map(Intent::Sort)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "todo=debug,todo_core=debug"
    } else {
        "todo=warn,todo_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let env_file = std::env::var("TODO_FILE").ok();
    let settings = resolve_settings(&cwd, cli.file.as_deref(), env_file.as_deref())
        .context("load configuration")?;
    let format = cli
        .format
        .or_else(|| settings.default_format.as_deref().and_then(config_format))
        .unwrap_or(Format::Table);

    let storage = Storage::new(&settings.data_file);
    let mut todos = storage
        .load_or_default()
        .with_context(|| format!("load todos from {}", storage.path().display()))?;

    let intent = cli.intent();
    let outcome = match execute(intent.as_ref(), &mut todos) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!(error = %err, "command rejected; leaving todo file untouched");
            eprintln!("Error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if outcome.mutated() {
        storage
            .save(&todos)
            .with_context(|| format!("save todos to {}", storage.path().display()))?;
    }
    report(&outcome, &todos, format)?;
    Ok(ExitCode::SUCCESS)
}

fn config_format(raw: &str) -> Option<Format> {
    let parsed = Format::from_str(raw.trim(), true).ok();
    if parsed.is_none() {
        warn!(value = raw, "ignoring unknown default_format in config");
    }
    parsed
}

fn report(outcome: &CommandOutcome, todos: &TodoList, format: Format) -> Result<()> {
    match outcome {
        CommandOutcome::Added { index } => {
            let title = todos.get(*index).map(|t| t.title.as_str()).unwrap_or_default();
            println!("Added todo #{index}: {title}");
        }
        CommandOutcome::Removed { index, todo } => {
            println!("Removed todo #{index}: {}", todo.title);
        }
        CommandOutcome::Toggled { index, completed } => {
            let state = if *completed { "completed" } else { "not completed" };
            println!("Marked todo #{index} as {state}");
        }
        CommandOutcome::Edited { index } => {
            println!("Updated title of todo #{index}");
        }
        CommandOutcome::Listed => print_list(todos, format)?,
        CommandOutcome::NoTodos => match format {
            Format::Table => println!("You have no todos!"),
            Format::Json | Format::Csv => print_list(todos, format)?,
        },
        CommandOutcome::CompletedCount(count) => {
            println!("You have {count} completed todos");
        }
        CommandOutcome::Sorted(Some(order)) => {
            let order = match order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            println!("Sorted todos by priority ({order})");
        }
        CommandOutcome::Sorted(None) => {
            println!("No sort order given; todos left as they were");
        }
    }
    Ok(())
}

fn print_list(todos: &TodoList, format: Format) -> Result<()> {
    match format {
        Format::Table => print!("{}", todo_render::render_table(&view::todo_table(todos))),
        Format::Csv => print!("{}", todo_render::render_csv(&view::todo_table(todos))?),
        Format::Json => println!("{}", todo_render::render_json(todos)?),
    }
    Ok(())
}
