//! Loading generator definitions from a project's `plopfile.js`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::GeneratorError;
use crate::plugins::PluginAction;

/// Conventional definition file name, looked up directly under the project
/// root, never in subdirectories.
pub const GENERATOR_FILE: &str = "plopfile.js";

/// Snippet handed to `node -e`. Serializes the file's exported mapping so the
/// shell can consume it without embedding a JavaScript engine.
const EVAL_SNIPPET: &str =
    "const defs = require(process.argv[1]); process.stdout.write(JSON.stringify(defs));";

/// One named generator: an optional description and its action templates.
///
/// String fields of the templates may contain `{{key}}` placeholders, filled
/// from the run request's data before execution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorDefinition {
    #[serde(default)]
    pub description: Option<String>,
    pub actions: Vec<PluginAction>,
}

/// Name-keyed generator definitions, ordered for stable error messages.
pub type GeneratorDefinitions = BTreeMap<String, GeneratorDefinition>;

/// Parse the JSON form of a definition file's exports.
pub fn parse_definitions(
    path: &Path,
    json: &str,
) -> Result<GeneratorDefinitions, GeneratorError> {
    serde_json::from_str(json).map_err(|e| GeneratorError::DefinitionsInvalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load generator definitions for a project by evaluating its `plopfile.js`.
///
/// Evaluating the file runs project-supplied code (see the module docs for
/// the trust boundary). A missing file, a missing `node`, and a file that
/// evaluates but exports garbage are all distinct errors.
pub async fn load_definitions(
    project_path: &Path,
) -> Result<(PathBuf, GeneratorDefinitions), GeneratorError> {
    let path = project_path.join(GENERATOR_FILE);
    if !path.is_file() {
        return Err(GeneratorError::DefinitionsNotFound { path });
    }

    let node = which::which("node")
        .map_err(|_| GeneratorError::RuntimeUnavailable { path: path.clone() })?;

    debug!(plopfile = %path.display(), node = %node.display(), "Evaluating generator definitions");
    let output = tokio::process::Command::new(node)
        .arg("-e")
        .arg(EVAL_SNIPPET)
        .arg(&path)
        .current_dir(project_path)
        .output()
        .await
        .map_err(|e| GeneratorError::DefinitionsInvalid {
            path: path.clone(),
            message: format!("failed to run node: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GeneratorError::DefinitionsInvalid {
            path,
            message: format!("evaluation failed: {}", stderr.trim()),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let definitions = parse_definitions(&path, stdout.trim())?;
    info!(
        plopfile = %path.display(),
        generators = definitions.len(),
        "Loaded generator definitions"
    );
    Ok((path, definitions))
}
