//! Batch execution of plugin actions against a project.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::PluginError;

use super::{ActionContext, ActionOutcome, PluginAction, PluginRegistry};

/// Payload of the `apply-plugin-actions` channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPluginRequest {
    pub plugin_name: String,
    pub actions: Vec<PluginAction>,
    pub project_path: PathBuf,
}

/// Apply a batch of actions through the named plugin.
///
/// Actions run strictly in the order given with no concurrency between them;
/// later actions routinely depend on earlier ones (create a file, then modify
/// it). The batch aborts on the first failure and surfaces it, so callers
/// never see partial results mixed with an error.
pub async fn apply_plugin_actions(
    registry: &PluginRegistry,
    request: ApplyPluginRequest,
) -> Result<Vec<ActionOutcome>, PluginError> {
    let plugin = registry.resolve(&request.plugin_name)?;

    if !request.project_path.is_dir() {
        return Err(PluginError::ProjectPath {
            path: request.project_path,
        });
    }
    let ctx = ActionContext::new(&request.project_path);

    info!(
        plugin = %plugin.name(),
        actions = request.actions.len(),
        project = %request.project_path.display(),
        "Applying plugin actions"
    );

    let mut outcomes = Vec::with_capacity(request.actions.len());
    for (index, action) in request.actions.into_iter().enumerate() {
        let kind = action.kind();
        let handler =
            plugin
                .handler_for(kind)
                .ok_or_else(|| PluginError::UnsupportedAction {
                    plugin: plugin.name().to_string(),
                    kind,
                    supported: plugin
                        .supported_kinds()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                })?;

        debug!(index, %kind, "Running plugin action");
        let outcome = handler(ctx.clone(), action)
            .await
            .map_err(|message| PluginError::ActionFailed {
                index,
                kind,
                message,
            })?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
