use super::*;
use crate::error::GeneratorError;
use serde_json::json;
use std::path::Path;

fn definitions(json: serde_json::Value) -> GeneratorDefinitions {
    parse_definitions(Path::new("/project/plopfile.js"), &json.to_string())
        .expect("fixture definitions should parse")
}

fn component_definitions() -> GeneratorDefinitions {
    definitions(json!({
        "component": {
            "description": "React component with a stylesheet",
            "actions": [
                {
                    "type": "add",
                    "path": "src/components/{{name}}/{{name}}.js",
                    "template": "export const {{name}} = () => null;\n"
                },
                {
                    "type": "add",
                    "path": "src/components/{{name}}/{{name}}.css",
                    "template": ".{{name}} {}\n"
                }
            ]
        },
        "reducer": {
            "actions": [
                { "type": "add", "path": "src/reducers/{{name}}.js", "template": "// {{name}}\n" }
            ]
        }
    }))
}

#[tokio::test]
async fn missing_plopfile_is_not_found() {
    let project = tempfile::tempdir().unwrap();
    let request: RunGeneratorRequest = serde_json::from_value(json!({
        "generatorName": "component",
        "actions": [],
        "projectPath": project.path(),
    }))
    .unwrap();

    let err = run_generator(request).await.unwrap_err();
    match err {
        GeneratorError::DefinitionsNotFound { path } => {
            assert!(path.ends_with("plopfile.js"));
        }
        other => panic!("expected DefinitionsNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_project_directory_fails_fast() {
    let request: RunGeneratorRequest = serde_json::from_value(json!({
        "generatorName": "component",
        "projectPath": "/definitely/not/a/real/project",
    }))
    .unwrap();

    assert!(matches!(
        run_generator(request).await.unwrap_err(),
        GeneratorError::ProjectPath { .. }
    ));
}

#[test]
fn invalid_definitions_report_the_file() {
    let err = parse_definitions(Path::new("/p/plopfile.js"), "{\"component\": 42}").unwrap_err();
    match err {
        GeneratorError::DefinitionsInvalid { path, .. } => {
            assert!(path.ends_with("plopfile.js"));
        }
        other => panic!("expected DefinitionsInvalid, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_generator_lists_available_names() {
    let project = tempfile::tempdir().unwrap();
    let defs = component_definitions();

    let err = run_named_generator(
        Path::new("/project/plopfile.js"),
        &defs,
        "page",
        &[],
        project.path(),
    )
    .await
    .unwrap_err();

    match err {
        GeneratorError::UnknownGenerator {
            name, available, ..
        } => {
            assert_eq!(name, "page");
            assert_eq!(available, "component, reducer");
        }
        other => panic!("expected UnknownGenerator, got {:?}", other),
    }
}

#[tokio::test]
async fn pipeline_renders_templates_and_reports_each_action() {
    let project = tempfile::tempdir().unwrap();
    let defs = component_definitions();

    let outcomes = run_named_generator(
        Path::new("/project/plopfile.js"),
        &defs,
        "component",
        &[json!({ "name": "Button" })],
        project.path(),
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    let source = project.path().join("src/components/Button/Button.js");
    assert_eq!(
        std::fs::read_to_string(source).unwrap(),
        "export const Button = () => null;\n"
    );
    assert!(project
        .path()
        .join("src/components/Button/Button.css")
        .exists());
}

#[tokio::test]
async fn pipeline_aborts_on_first_failing_action() {
    let project = tempfile::tempdir().unwrap();
    let defs = definitions(json!({
        "broken": {
            "actions": [
                { "type": "modify", "path": "missing.js", "pattern": "x", "template": "y" },
                { "type": "add", "path": "after.js", "template": "never" }
            ]
        }
    }));

    let err = run_named_generator(
        Path::new("/project/plopfile.js"),
        &defs,
        "broken",
        &[],
        project.path(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, GeneratorError::ActionFailed { index: 0, .. }));
    assert!(!project.path().join("after.js").exists());
}

// End-to-end through node. Skipped quietly on hosts without a JavaScript
// runtime, same as the executor tests tolerate a missing `sleep`.
#[tokio::test]
async fn evaluates_a_real_plopfile_with_node() {
    if which::which("node").is_err() {
        return;
    }

    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        project.path().join(GENERATOR_FILE),
        r#"module.exports = {
  store: {
    description: "mobx store",
    actions: [
      { type: "add", path: "src/stores/{{name}}.js", template: "export class {{name}} {}\n" }
    ]
  }
};
"#,
    )
    .unwrap();

    let request: RunGeneratorRequest = serde_json::from_value(json!({
        "generatorName": "store",
        "actions": [{ "name": "AppStore" }],
        "projectPath": project.path(),
    }))
    .unwrap();

    let outcomes = run_generator(request).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        std::fs::read_to_string(project.path().join("src/stores/AppStore.js")).unwrap(),
        "export class AppStore {}\n"
    );
}
