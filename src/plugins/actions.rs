//! Abstract project actions and the built-in interpreter.
//!
//! An action is one unit of work applied to a project directory: write a
//! file, edit a file in place, append to a file, or run an external command.
//! Actions arrive from the UI as tagged JSON and dispatch by kind; a `type`
//! string outside this vocabulary fails at parse time with a typed error
//! instead of a lookup miss deep in an executor.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// The kind tag of an action, used as the dispatch-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Add,
    Modify,
    Append,
    RunCommand,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Add => "add",
            ActionKind::Modify => "modify",
            ActionKind::Append => "append",
            ActionKind::RunCommand => "runCommand",
        };
        f.write_str(name)
    }
}

/// One abstract instruction applied to a project.
///
/// Paths are always relative to the project directory; absolute paths and
/// `..` segments are rejected by the interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PluginAction {
    /// Create a file with the given content.
    Add {
        path: String,
        #[serde(default)]
        template: String,
        /// When set, an existing file is left alone instead of failing.
        #[serde(default)]
        skip_if_exists: bool,
    },

    /// Rewrite every match of `pattern` (a regular expression, capture
    /// groups usable as `$1` in `template`) inside an existing file.
    Modify {
        path: String,
        pattern: String,
        template: String,
    },

    /// Append content to an existing file.
    Append {
        path: String,
        template: String,
        /// When set, content already present in the file is not repeated.
        #[serde(default)]
        unique: bool,
    },

    /// Run an external command inside the project directory.
    RunCommand {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl PluginAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PluginAction::Add { .. } => ActionKind::Add,
            PluginAction::Modify { .. } => ActionKind::Modify,
            PluginAction::Append { .. } => ActionKind::Append,
            PluginAction::RunCommand { .. } => ActionKind::RunCommand,
        }
    }
}

/// Result of one successfully handled action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub detail: String,
}

impl ActionOutcome {
    fn file(kind: ActionKind, path: &str, detail: impl Into<String>) -> Self {
        ActionOutcome {
            kind,
            path: Some(path.to_string()),
            detail: detail.into(),
        }
    }
}

/// Target project handed to every action handler.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub project_path: PathBuf,
}

impl ActionContext {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        ActionContext {
            project_path: project_path.into(),
        }
    }

    /// Resolve an action's relative path inside the project, rejecting
    /// absolute paths and `..` escapes.
    fn resolve(&self, relative: &str) -> Result<PathBuf, String> {
        let candidate = Path::new(relative);
        if candidate.is_absolute() {
            return Err(format!("path '{}' must be relative to the project", relative));
        }
        for component in candidate.components() {
            if matches!(component, Component::ParentDir) {
                return Err(format!("path '{}' escapes the project directory", relative));
            }
        }
        Ok(self.project_path.join(candidate))
    }
}

/// Run one action with the built-in behavior for its kind.
///
/// Errors are plain messages; callers attach the action index and kind when
/// they surface the failure.
pub async fn run_action(
    ctx: &ActionContext,
    action: &PluginAction,
) -> Result<ActionOutcome, String> {
    match action {
        PluginAction::Add {
            path,
            template,
            skip_if_exists,
        } => add_file(ctx, path, template, *skip_if_exists).await,
        PluginAction::Modify {
            path,
            pattern,
            template,
        } => modify_file(ctx, path, pattern, template).await,
        PluginAction::Append {
            path,
            template,
            unique,
        } => append_file(ctx, path, template, *unique).await,
        PluginAction::RunCommand { command, args } => run_command(ctx, command, args).await,
    }
}

async fn add_file(
    ctx: &ActionContext,
    path: &str,
    template: &str,
    skip_if_exists: bool,
) -> Result<ActionOutcome, String> {
    let target = ctx.resolve(path)?;
    if tokio::fs::try_exists(&target)
        .await
        .map_err(|e| format!("cannot stat '{}': {}", path, e))?
    {
        if skip_if_exists {
            return Ok(ActionOutcome::file(
                ActionKind::Add,
                path,
                "skipped, file already exists",
            ));
        }
        return Err(format!("file '{}' already exists", path));
    }

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("cannot create parent directories for '{}': {}", path, e))?;
    }
    tokio::fs::write(&target, template)
        .await
        .map_err(|e| format!("cannot write '{}': {}", path, e))?;

    Ok(ActionOutcome::file(ActionKind::Add, path, "file created"))
}

async fn modify_file(
    ctx: &ActionContext,
    path: &str,
    pattern: &str,
    template: &str,
) -> Result<ActionOutcome, String> {
    let target = ctx.resolve(path)?;
    let pattern =
        regex::Regex::new(pattern).map_err(|e| format!("invalid pattern for '{}': {}", path, e))?;
    let contents = tokio::fs::read_to_string(&target)
        .await
        .map_err(|e| format!("cannot read '{}': {}", path, e))?;

    let matches = pattern.find_iter(&contents).count();
    if matches == 0 {
        return Ok(ActionOutcome::file(
            ActionKind::Modify,
            path,
            "no matches, file unchanged",
        ));
    }

    let rewritten = pattern.replace_all(&contents, template).into_owned();
    tokio::fs::write(&target, rewritten)
        .await
        .map_err(|e| format!("cannot write '{}': {}", path, e))?;

    Ok(ActionOutcome::file(
        ActionKind::Modify,
        path,
        format!("rewrote {} match(es)", matches),
    ))
}

async fn append_file(
    ctx: &ActionContext,
    path: &str,
    template: &str,
    unique: bool,
) -> Result<ActionOutcome, String> {
    let target = ctx.resolve(path)?;
    let mut contents = tokio::fs::read_to_string(&target)
        .await
        .map_err(|e| format!("cannot read '{}': {}", path, e))?;

    if unique && contents.contains(template) {
        return Ok(ActionOutcome::file(
            ActionKind::Append,
            path,
            "skipped, content already present",
        ));
    }

    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(template);
    tokio::fs::write(&target, contents)
        .await
        .map_err(|e| format!("cannot write '{}': {}", path, e))?;

    Ok(ActionOutcome::file(ActionKind::Append, path, "content appended"))
}

async fn run_command(
    ctx: &ActionContext,
    command: &str,
    args: &[String],
) -> Result<ActionOutcome, String> {
    let output = Command::new(command)
        .args(args)
        .current_dir(&ctx.project_path)
        .output()
        .await
        .map_err(|e| format!("failed to run '{}': {}", command, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        return Err(if detail.is_empty() {
            format!("'{}' exited with {}", command, output.status)
        } else {
            format!("'{}' exited with {}: {}", command, output.status, detail)
        });
    }

    Ok(ActionOutcome {
        kind: ActionKind::RunCommand,
        path: None,
        detail: format!("'{}' completed", command),
    })
}
