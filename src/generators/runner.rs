//! Running a named generator's action pipeline.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::GeneratorError;
use crate::plugins::{run_action, ActionContext, ActionOutcome, PluginAction};

use super::plopfile::{load_definitions, GeneratorDefinitions};

/// Payload of the `run-plop-generator` channel.
///
/// `actions` carries the generator's input data: a list of JSON objects whose
/// entries are flattened into one map and substituted into the definition's
/// `{{key}}` placeholders. Non-object entries are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunGeneratorRequest {
    pub generator_name: String,
    #[serde(default)]
    pub actions: Vec<Value>,
    pub project_path: PathBuf,
}

/// Resolve and run a generator from the project's definition file.
pub async fn run_generator(
    request: RunGeneratorRequest,
) -> Result<Vec<ActionOutcome>, GeneratorError> {
    if !request.project_path.is_dir() {
        return Err(GeneratorError::ProjectPath {
            path: request.project_path,
        });
    }

    let (path, definitions) = load_definitions(&request.project_path).await?;
    run_named_generator(
        &path,
        &definitions,
        &request.generator_name,
        &request.actions,
        &request.project_path,
    )
    .await
}

/// Run one generator out of already loaded definitions.
///
/// Split from [`run_generator`] so resolution and pipeline semantics do not
/// depend on a JavaScript runtime being present.
pub async fn run_named_generator(
    path: &Path,
    definitions: &GeneratorDefinitions,
    name: &str,
    data_inputs: &[Value],
    project_path: &Path,
) -> Result<Vec<ActionOutcome>, GeneratorError> {
    let definition = definitions.get(name).ok_or_else(|| {
        let available = if definitions.is_empty() {
            "none".to_string()
        } else {
            definitions
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        GeneratorError::UnknownGenerator {
            path: path.to_path_buf(),
            name: name.to_string(),
            available,
        }
    })?;

    let data = flatten_data(data_inputs);
    info!(
        generator = name,
        actions = definition.actions.len(),
        project = %project_path.display(),
        "Running generator pipeline"
    );

    let ctx = ActionContext::new(project_path);
    let mut outcomes = Vec::with_capacity(definition.actions.len());
    for (index, template) in definition.actions.iter().enumerate() {
        let action = render_action(template, &data);
        let kind = action.kind();
        debug!(index, %kind, "Running generator action");
        let outcome =
            run_action(&ctx, &action)
                .await
                .map_err(|message| GeneratorError::ActionFailed {
                    index,
                    kind,
                    message,
                })?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Merge the request's data objects into one map. Later entries win, which
/// lets callers layer overrides over defaults.
fn flatten_data(inputs: &[Value]) -> Map<String, Value> {
    let mut data = Map::new();
    for input in inputs {
        if let Value::Object(entries) = input {
            for (key, value) in entries {
                data.insert(key.clone(), value.clone());
            }
        }
    }
    data
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("valid pattern"))
}

/// Substitute `{{key}}` placeholders from the data map. Placeholders with no
/// matching key are left untouched so literal braces survive rendering.
fn render_str(input: &str, data: &Map<String, Value>) -> String {
    placeholder_pattern()
        .replace_all(input, |caps: &regex::Captures<'_>| {
            match data.get(&caps[1]) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Render every string field of an action template.
fn render_action(template: &PluginAction, data: &Map<String, Value>) -> PluginAction {
    match template {
        PluginAction::Add {
            path,
            template: content,
            skip_if_exists,
        } => PluginAction::Add {
            path: render_str(path, data),
            template: render_str(content, data),
            skip_if_exists: *skip_if_exists,
        },
        PluginAction::Modify {
            path,
            pattern,
            template: content,
        } => PluginAction::Modify {
            path: render_str(path, data),
            pattern: pattern.clone(),
            template: render_str(content, data),
        },
        PluginAction::Append {
            path,
            template: content,
            unique,
        } => PluginAction::Append {
            path: render_str(path, data),
            template: render_str(content, data),
            unique: *unique,
        },
        PluginAction::RunCommand { command, args } => PluginAction::RunCommand {
            command: render_str(command, data),
            args: args.iter().map(|arg| render_str(arg, data)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_data_merges_objects_in_order() {
        let inputs = vec![
            json!({ "name": "button", "style": "css" }),
            json!("ignored"),
            json!({ "style": "scss" }),
        ];
        let data = flatten_data(&inputs);
        assert_eq!(data.get("name"), Some(&json!("button")));
        assert_eq!(data.get("style"), Some(&json!("scss")));
    }

    #[test]
    fn render_str_substitutes_known_keys_only() {
        let mut data = Map::new();
        data.insert("name".to_string(), json!("button"));
        data.insert("count".to_string(), json!(3));

        assert_eq!(
            render_str("src/{{name}}/{{ name }}.js", &data),
            "src/button/button.js"
        );
        assert_eq!(render_str("{{count}} items", &data), "3 items");
        assert_eq!(render_str("{{missing}} stays", &data), "{{missing}} stays");
    }

    #[test]
    fn render_action_reaches_every_string_field() {
        let mut data = Map::new();
        data.insert("pkg".to_string(), json!("left-pad"));

        let rendered = render_action(
            &PluginAction::RunCommand {
                command: "npm".to_string(),
                args: vec!["install".to_string(), "{{pkg}}".to_string()],
            },
            &data,
        );
        assert_eq!(
            rendered,
            PluginAction::RunCommand {
                command: "npm".to_string(),
                args: vec!["install".to_string(), "left-pad".to_string()],
            }
        );
    }
}
