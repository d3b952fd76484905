use clap::Parser;
use clap::error::ErrorKind;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use todo_core::config::{self, ConfigOverrides, Settings};
use todo_core::error::AppError;
use todo_core::model::{Subtask, Task};
use todo_core::storage::TaskStore;
use todo_server::cli::{Cli, Command, SubtaskCommand, collect_config_overrides};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const SERVE_LOG_FILTER: &str = "todo_server=info,todo_core=info,tower_http=info";
const COMMAND_LOG_FILTER: &str = "warn";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn status_label(completed: bool) -> &'static str {
    if completed { "completed" } else { "pending" }
}

fn task_rows(tasks: &[Task]) -> Vec<TaskRow> {
    let mut rows = Vec::new();
    for task in tasks {
        rows.push(TaskRow {
            id: task.id.to_string(),
            title: task.title.clone(),
            status: status_label(task.completed),
        });
        for subtask in &task.subtasks {
            rows.push(TaskRow {
                id: format!("{}.{}", task.id, subtask.id),
                title: format!("  - {}", subtask.title),
                status: status_label(subtask.completed),
            });
        }
    }
    rows
}

fn print_tasks_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks");
        return;
    }
    let mut table = Table::new(task_rows(tasks));
    table.with(Style::psql());
    println!("{table}");
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn report_task(json: bool, verb: &str, task: &Task) -> Result<(), AppError> {
    if json {
        print_json(task)
    } else {
        println!("{verb} task: {} ({})", task.title, task.id);
        Ok(())
    }
}

fn report_subtask(
    json: bool,
    verb: &str,
    task_id: u64,
    subtask: &Subtask,
) -> Result<(), AppError> {
    if json {
        print_json(subtask)
    } else {
        println!("{verb} subtask: {} ({}.{})", subtask.title, task_id, subtask.id);
        Ok(())
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_settings(cli: &Cli) -> Result<Settings, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        tracing::warn!("ignoring config file: {}", err);
    }

    let mut overrides: ConfigOverrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    if let Some(store) = cli.store.as_ref() {
        overrides.store_path = Some(store.clone());
    }
    if let Some(Command::Serve { host, port }) = cli.command.as_ref() {
        if let Some(host) = host {
            overrides.host = Some(host.clone());
        }
        if let Some(port) = port {
            overrides.port = Some(*port);
        }
    }

    config::resolve_settings(&loaded.config, &overrides)
}

fn serve(settings: Settings) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(todo_server::api::serve(settings))
}

fn run_subtask_command(
    store: &TaskStore,
    json: bool,
    command: SubtaskCommand,
) -> Result<(), AppError> {
    match command {
        SubtaskCommand::Add { task_id, title } => {
            let subtask = store.add_subtask(task_id, &title)?;
            report_subtask(json, "Added", task_id, &subtask)?;
        }
        SubtaskCommand::Rename {
            task_id,
            subtask_id,
            title,
        } => {
            let subtask = store.rename_subtask(task_id, subtask_id, &title)?;
            report_subtask(json, "Updated", task_id, &subtask)?;
        }
        SubtaskCommand::Done {
            task_id,
            subtask_id,
        } => {
            let subtask = store.complete_subtask(task_id, subtask_id)?;
            report_subtask(json, "Completed", task_id, &subtask)?;
        }
        SubtaskCommand::Reopen {
            task_id,
            subtask_id,
        } => {
            let subtask = store.set_subtask_completed(task_id, subtask_id, false)?;
            report_subtask(json, "Reopened", task_id, &subtask)?;
        }
        SubtaskCommand::Delete {
            task_id,
            subtask_id,
        } => {
            store.delete_subtask(task_id, subtask_id)?;
            if !json {
                println!("Deleted subtask: {task_id}.{subtask_id}");
            }
        }
    }

    Ok(())
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = resolve_settings(&cli)?;
    let command = cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    });

    if let Command::Serve { .. } = command {
        return serve(settings);
    }

    let store = TaskStore::new(settings.store_path);
    let json = cli.json;

    match command {
        Command::Serve { .. } => {}
        Command::List => {
            let tasks = store.list_tasks()?;
            if json {
                print_json(&tasks)?;
            } else {
                print_tasks_table(&tasks);
            }
        }
        Command::Show { id } => {
            let task = store.get_task(id)?;
            if json {
                print_json(&task)?;
            } else {
                print_tasks_table(std::slice::from_ref(&task));
            }
        }
        Command::Add { title } => {
            let task = store.create_task(&title)?;
            report_task(json, "Added", &task)?;
        }
        Command::Rename { id, title } => {
            let task = store.rename_task(id, &title)?;
            report_task(json, "Updated", &task)?;
        }
        Command::Done { id } => {
            let task = store.complete_task(id)?;
            report_task(json, "Completed", &task)?;
        }
        Command::Reopen { id } => {
            let task = store.set_task_completed(id, false)?;
            report_task(json, "Reopened", &task)?;
        }
        Command::Delete { id } => {
            store.delete_task(id)?;
            if !json {
                println!("Deleted task: {id}");
            }
        }
        Command::Subtask { subtask } => run_subtask_command(&store, json, subtask)?,
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let is_serve = matches!(cli.command, None | Some(Command::Serve { .. }));
    init_tracing(if is_serve {
        SERVE_LOG_FILTER
    } else {
        COMMAND_LOG_FILTER
    });

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
