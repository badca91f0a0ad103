//! Tests for building pipelines from definitions.

use super::*;
use crate::errors::PipelineError;
use crate::testing::{test_document, test_factory};
use pretty_assertions::assert_eq;
use serde_json::json;

fn processor_names(steps: &[ExecutionStep]) -> Vec<String> {
    let mut names = Vec::new();
    for step in steps {
        match step {
            ExecutionStep::Processor(step) => {
                names.push(step.name().to_string());
                for handler in step.on_failure().unwrap_or_default() {
                    names.push(handler.name().to_string());
                }
            }
            ExecutionStep::Conditional(step) => {
                names.extend(processor_names(step.on_true()));
                names.extend(processor_names(step.on_false()));
            }
        }
    }
    names
}

#[test]
fn test_create_simple_pipeline() {
    let pipeline = test_factory()
        .create(
            "p1",
            r#"{
                "name": "simple",
                "description": "adds a field",
                "steps": [{"addField": {"config": {"path": "x", "value": "v"}}}]
            }"#,
        )
        .unwrap();

    assert_eq!(pipeline.id(), "p1");
    assert_eq!(pipeline.name(), "simple");
    assert_eq!(pipeline.description(), Some("adds a field"));
    assert!(!pipeline.ignore_failure());
    assert_eq!(processor_names(pipeline.steps()), vec!["[addField1]"]);
}

#[test]
fn test_name_defaults_to_id() {
    let pipeline = test_factory()
        .create_from_value("nginx", json!({"steps": [{"drop": {}}]}))
        .unwrap();

    assert_eq!(pipeline.name(), "nginx");
    assert!(pipeline.description().is_none());
}

#[test]
fn test_step_naming_is_depth_first() {
    let pipeline = test_factory()
        .create_from_value(
            "p",
            json!({
                "ignoreFailure": true,
                "steps": [
                    {"addField": {"name": "first", "config": {"path": "a", "value": 1}}},
                    {"fail": {"onFailure": [
                        {"addField": {"config": {"path": "b", "value": 2}}},
                        {"drop": {"name": "bail"}}
                    ]}},
                    {"if": {
                        "condition": {"exists": {"field": "a"}},
                        "then": [{"addField": {"config": {"path": "c", "value": 3}}}],
                        "else": [{"drop": {}}]
                    }},
                    {"addField": {"config": {"path": "d", "value": 4}}}
                ]
            }),
        )
        .unwrap();

    assert!(pipeline.ignore_failure());
    assert_eq!(
        processor_names(pipeline.steps()),
        vec![
            "[addField1]first",
            "[fail2]",
            "[addField3]",
            "[drop4]bail",
            "[addField5]",
            "[drop6]",
            "[addField7]",
        ]
    );
    assert_eq!(pipeline.processor_count(), 7);
}

#[test]
fn test_conditional_is_evaluated_against_registry() {
    let pipeline = test_factory()
        .create_from_value(
            "p",
            json!({"steps": [{"if": {
                "condition": {"not": {"exists": {"field": "a"}}},
                "then": [{"drop": {}}]
            }}]}),
        )
        .unwrap();

    let ExecutionStep::Conditional(step) = &pipeline.steps()[0] else {
        panic!("expected a conditional step");
    };
    assert!(!step.condition().evaluate(&test_document(json!({"a": 1}))));
    assert!(step.condition().evaluate(&test_document(json!({"b": 1}))));
    assert!(step.on_false().is_empty());
}

#[test]
fn test_empty_id_is_rejected_first() {
    let factory = test_factory();

    assert!(matches!(factory.create("", "not json"), Err(PipelineError::EmptyId)));
    assert!(matches!(
        factory.create_from_value("  ", json!({"steps": []})),
        Err(PipelineError::EmptyId)
    ));
}

#[test]
fn test_empty_steps_are_rejected() {
    let result = test_factory().create_from_value("p", json!({"steps": []}));
    assert!(matches!(result, Err(PipelineError::NoSteps { pipeline }) if pipeline == "p"));
}

#[test]
fn test_invalid_json_is_rejected() {
    assert!(matches!(
        test_factory().create("p", "{ steps: "),
        Err(PipelineError::Json(_))
    ));
    assert!(matches!(
        test_factory().create_from_value("p", json!({"steps": [{"a": {}, "b": {}}]})),
        Err(PipelineError::Json(_))
    ));
}

#[test]
fn test_unknown_types_are_rejected() {
    let factory = test_factory();

    assert!(matches!(
        factory.create_from_value("p", json!({"steps": [{"grok": {}}]})),
        Err(PipelineError::UnknownProcessor { name }) if name == "grok"
    ));
    assert!(matches!(
        factory.create_from_value(
            "p",
            json!({"steps": [{"if": {"condition": {"regex": {}}, "then": [{"drop": {}}]}}]})
        ),
        Err(PipelineError::UnknownCondition { name }) if name == "regex"
    ));
}

#[test]
fn test_factory_errors_are_wrapped() {
    let result = test_factory()
        .create_from_value("p", json!({"steps": [{"addField": {"config": {"value": 1}}}]}));

    let err = result.unwrap_err();
    assert!(matches!(err, PipelineError::Factory { kind: "processor", .. }));
    assert!(err.to_string().contains("missing string field 'path'"));
}

#[test]
fn test_conditional_in_on_failure_is_rejected() {
    let result = test_factory().create_from_value(
        "p",
        json!({"steps": [{"fail": {"onFailure": [
            {"if": {"condition": {"fixed": {"value": true}}, "then": [{"drop": {}}]}}
        ]}}]}),
    );

    let err = result.unwrap_err();
    assert!(matches!(err, PipelineError::Definition { .. }));
    assert!(err.to_string().contains("[fail1]"));
}

#[test]
fn test_create_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    std::fs::write(
        &path,
        r#"{"steps": [{"addField": {"config": {"path": "x", "value": "v"}}}]}"#,
    )
    .unwrap();

    let pipeline = test_factory().create_from_file("from-file", &path).unwrap();
    assert_eq!(pipeline.id(), "from-file");

    assert!(matches!(
        test_factory().create_from_file("missing", dir.path().join("missing.json")),
        Err(PipelineError::Io(_))
    ));
}

#[test]
fn test_create_from_definition() {
    let definition = PipelineDefinition {
        name: Some("built".to_string()),
        description: None,
        ignore_failure: false,
        steps: vec![ProcessorDefinition::new("drop").with_name("all").into()],
    };

    let pipeline = test_factory().create_from_definition("p", definition).unwrap();
    assert_eq!(processor_names(pipeline.steps()), vec!["[drop1]all"]);
}
