use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todo_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal task list server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the task store file
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default when no command is given)
    ///
    /// Example: todo_server serve --port 3001
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// List all tasks with their subtasks
    ///
    /// Example: todo_server list
    List,
    /// Show one task
    ///
    /// Example: todo_server show 1
    Show { id: u64 },
    /// Add a new task
    ///
    /// Example: todo_server add "Buy milk"
    Add { title: String },
    /// Change a task's title
    ///
    /// Example: todo_server rename 1 "Buy oat milk"
    Rename { id: u64, title: String },
    /// Mark a task as completed
    ///
    /// Example: todo_server done 1
    Done { id: u64 },
    /// Mark a completed task as not completed
    ///
    /// Example: todo_server reopen 1
    Reopen { id: u64 },
    /// Delete a task and its subtasks
    ///
    /// Example: todo_server delete 1
    Delete { id: u64 },
    /// Manage the subtasks of a task
    ///
    /// Example: todo_server subtask add 1 "Check the fridge"
    Subtask {
        #[command(subcommand)]
        subtask: SubtaskCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    /// Add a subtask
    Add { task_id: u64, title: String },
    /// Change a subtask's title
    Rename {
        task_id: u64,
        subtask_id: u64,
        title: String,
    },
    /// Mark a subtask as completed
    Done { task_id: u64, subtask_id: u64 },
    /// Mark a completed subtask as not completed
    Reopen { task_id: u64, subtask_id: u64 },
    /// Delete a subtask
    Delete { task_id: u64, subtask_id: u64 },
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Host,
    Port,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "host" => ConfigOverrideTarget::Host,
        "port" => ConfigOverrideTarget::Port,
        "store" | "store_path" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("{CONFIG_OVERRIDE_FLAG} {canonical_field} requires a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Fold parsed `--config-override` values into [`ConfigOverrides`].
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Host => overrides.host = Some(parsed.value),
            ConfigOverrideTarget::Port => {
                let port = parsed
                    .value
                    .parse::<u16>()
                    .map_err(|err| format!("invalid port '{}': {err}", parsed.value))?;
                overrides.port = Some(port);
            }
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value))
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, ConfigOverrideTarget, SubtaskCommand, collect_config_overrides,
        parse_config_override,
    };
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" Store-Path = /tmp/tasks.json ").unwrap();

        assert_eq!(parsed.target, ConfigOverrideTarget::StorePath);
        assert_eq!(parsed.value, "/tmp/tasks.json");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("theme=noir").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("port3000").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_value() {
        let err = parse_config_override("host=  ").unwrap_err();
        assert!(err.contains("requires a value"));
    }

    #[test]
    fn collect_config_overrides_last_value_wins() {
        let raw = vec![
            "port=4000".to_string(),
            "host=0.0.0.0".to_string(),
            "PORT=4001".to_string(),
        ];

        let overrides = collect_config_overrides(&raw).unwrap();

        assert_eq!(overrides.port, Some(4001));
        assert_eq!(overrides.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(overrides.store_path, None);
    }

    #[test]
    fn collect_config_overrides_rejects_bad_port() {
        let err = collect_config_overrides(&["port=http".to_string()]).unwrap_err();
        assert!(err.contains("invalid port"));
    }

    #[test]
    fn cli_parses_nested_subtask_commands() {
        let cli = Cli::try_parse_from([
            "todo_server",
            "--store",
            "/tmp/t.json",
            "subtask",
            "rename",
            "1",
            "2",
            "new title",
        ])
        .unwrap();

        assert_eq!(cli.store, Some(PathBuf::from("/tmp/t.json")));
        match cli.command {
            Some(Command::Subtask {
                subtask:
                    SubtaskCommand::Rename {
                        task_id,
                        subtask_id,
                        title,
                    },
            }) => {
                assert_eq!((task_id, subtask_id), (1, 2));
                assert_eq!(title, "new title");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_without_command_defaults_to_none() {
        let cli = Cli::try_parse_from(["todo_server"]).unwrap();
        assert!(cli.command.is_none());
    }
}
