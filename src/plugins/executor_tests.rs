use super::*;
use crate::error::PluginError;
use serde_json::json;
use std::path::Path;

fn request(plugin: &str, project: &Path, actions: serde_json::Value) -> ApplyPluginRequest {
    serde_json::from_value(json!({
        "pluginName": plugin,
        "actions": actions,
        "projectPath": project,
    }))
    .expect("request should deserialize")
}

fn registry_with_defaults(name: &str) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Plugin::with_default_handlers(name));
    registry
}

#[tokio::test]
async fn unknown_plugin_is_a_resolution_error() {
    let project = tempfile::tempdir().unwrap();
    let registry = registry_with_defaults("scaffold");

    let err = apply_plugin_actions(&registry, request("mystery", project.path(), json!([])))
        .await
        .unwrap_err();
    assert!(matches!(err, PluginError::UnknownPlugin(name) if name == "mystery"));
}

#[tokio::test]
async fn missing_project_directory_fails_fast() {
    let registry = registry_with_defaults("scaffold");
    let err = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            Path::new("/definitely/not/a/real/project"),
            json!([{ "type": "add", "path": "a.txt", "template": "x" }]),
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PluginError::ProjectPath { .. }));
}

#[tokio::test]
async fn actions_execute_strictly_in_input_order() {
    let project = tempfile::tempdir().unwrap();
    let registry = registry_with_defaults("scaffold");

    // B modifies what A wrote, C appends after B's rewrite. Any reordering
    // would change the final file.
    let outcomes = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            project.path(),
            json!([
                { "type": "add", "path": "src/index.js", "template": "const name = '__NAME__';\n" },
                { "type": "modify", "path": "src/index.js", "pattern": "__NAME__", "template": "jsui" },
                { "type": "append", "path": "src/index.js", "template": "export default name;\n" },
            ]),
        ),
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 3);
    let contents = std::fs::read_to_string(project.path().join("src/index.js")).unwrap();
    assert_eq!(contents, "const name = 'jsui';\nexport default name;\n");
}

#[tokio::test]
async fn batch_aborts_on_first_failure() {
    let project = tempfile::tempdir().unwrap();
    let registry = registry_with_defaults("scaffold");

    // The modify targets a file that does not exist, so the trailing add
    // must never run.
    let err = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            project.path(),
            json!([
                { "type": "modify", "path": "missing.txt", "pattern": "x", "template": "y" },
                { "type": "add", "path": "after.txt", "template": "never" },
            ]),
        ),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PluginError::ActionFailed { index: 0, .. }));
    assert!(!project.path().join("after.txt").exists());
}

#[tokio::test]
async fn plugin_without_a_handler_for_the_kind_is_fatal() {
    let project = tempfile::tempdir().unwrap();
    let mut registry = PluginRegistry::new();
    registry.register(
        Plugin::builder("files-only")
            .default_handler(ActionKind::Add)
            .build(),
    );

    let err = apply_plugin_actions(
        &registry,
        request(
            "files-only",
            project.path(),
            json!([{ "type": "runCommand", "command": "true" }]),
        ),
    )
    .await
    .unwrap_err();

    match err {
        PluginError::UnsupportedAction {
            plugin,
            kind,
            supported,
        } => {
            assert_eq!(plugin, "files-only");
            assert_eq!(kind, ActionKind::RunCommand);
            assert_eq!(supported, "add");
        }
        other => panic!("expected UnsupportedAction, got {:?}", other),
    }
}

#[tokio::test]
async fn add_respects_skip_if_exists() {
    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("keep.txt"), "original").unwrap();
    let registry = registry_with_defaults("scaffold");

    let outcomes = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            project.path(),
            json!([{ "type": "add", "path": "keep.txt", "template": "clobber", "skipIfExists": true }]),
        ),
    )
    .await
    .unwrap();

    assert!(outcomes[0].detail.contains("skipped"));
    assert_eq!(
        std::fs::read_to_string(project.path().join("keep.txt")).unwrap(),
        "original"
    );
}

#[tokio::test]
async fn add_fails_on_existing_file_without_skip() {
    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("keep.txt"), "original").unwrap();
    let registry = registry_with_defaults("scaffold");

    let err = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            project.path(),
            json!([{ "type": "add", "path": "keep.txt", "template": "clobber" }]),
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PluginError::ActionFailed { index: 0, .. }));
}

#[tokio::test]
async fn unique_append_does_not_duplicate() {
    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("deps.txt"), "react\n").unwrap();
    let registry = registry_with_defaults("scaffold");

    let outcomes = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            project.path(),
            json!([
                { "type": "append", "path": "deps.txt", "template": "react", "unique": true },
                { "type": "append", "path": "deps.txt", "template": "redux", "unique": true },
            ]),
        ),
    )
    .await
    .unwrap();

    assert!(outcomes[0].detail.contains("already present"));
    assert_eq!(
        std::fs::read_to_string(project.path().join("deps.txt")).unwrap(),
        "react\nredux"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn run_command_surfaces_nonzero_exit() {
    let project = tempfile::tempdir().unwrap();
    let registry = registry_with_defaults("scaffold");

    let err = apply_plugin_actions(
        &registry,
        request(
            "scaffold",
            project.path(),
            json!([{ "type": "runCommand", "command": "false" }]),
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        PluginError::ActionFailed {
            kind: ActionKind::RunCommand,
            ..
        }
    ));
}

#[tokio::test]
async fn custom_handlers_override_the_builtin() {
    let project = tempfile::tempdir().unwrap();
    let mut registry = PluginRegistry::new();
    registry.register(Plugin::builder("audit").handler(ActionKind::Add, |_ctx, action| async move {
        let PluginAction::Add { path, .. } = action else {
            return Err("wrong kind dispatched".to_string());
        };
        Ok(ActionOutcome {
            kind: ActionKind::Add,
            path: Some(path),
            detail: "recorded only".to_string(),
        })
    })
    .build());

    let outcomes = apply_plugin_actions(
        &registry,
        request(
            "audit",
            project.path(),
            json!([{ "type": "add", "path": "ghost.txt", "template": "x" }]),
        ),
    )
    .await
    .unwrap();

    assert_eq!(outcomes[0].detail, "recorded only");
    // The override never touched the filesystem.
    assert!(!project.path().join("ghost.txt").exists());
}
