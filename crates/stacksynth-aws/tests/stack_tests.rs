use pretty_assertions::assert_eq;
use stacksynth_aws::{LambdaStack, StackConfig, OUTPUT_NAME};
use stacksynth_core::prelude::*;
use stacksynth_core::InterpolationSyntax;
use stacksynth_test_utils::{assert_precedes, record_names};
use std::io::Write;

fn synthesize(config: &StackConfig) -> OutputDocument {
    let graph = LambdaStack::build(config, SynthConfig::default()).unwrap();
    SynthesisRun::from_graph(graph).synthesize().unwrap()
}

#[test]
fn role_before_function_before_url_before_output() {
    let doc = synthesize(&StackConfig::default());

    assert_precedes(&doc, "dale-test-iam_for_lambda", "dale-test-test_lambda");
    assert_precedes(&doc, "dale-test-lambda", "dale-test-test_lambda");
    assert_precedes(&doc, "dale-test-test_lambda", "dale-test-lambda-url");
    assert_precedes(&doc, "dale-test-lambda-url", OUTPUT_NAME);
    assert_precedes(&doc, "dale-test-assume_role", "dale-test-iam_for_lambda");
    assert_precedes(&doc, "dale-test-iamPolicyDoc", "dale-test-iamPolicy");
    assert_eq!(doc.len(), 10);
}

#[test]
fn emission_order_for_defaults() {
    let doc = synthesize(&StackConfig::default());
    assert_eq!(
        record_names(&doc),
        vec![
            "archiveProvider",
            "dale-test-aws",
            "dale-test-assume_role",
            "dale-test-iam_for_lambda",
            "dale-test-iamPolicyDoc",
            "dale-test-iamPolicy",
            "dale-test-lambda",
            "dale-test-test_lambda",
            "dale-test-lambda-url",
            "lambda-function",
        ]
    );
}

#[test]
fn function_url_gets_literal_function_name() {
    let doc = synthesize(&StackConfig::default());
    let url = doc.get("dale-test-lambda-url").unwrap();
    assert_eq!(url.attributes["function_name"], "dale_test_auto");
    assert_eq!(url.attributes["authorization_type"], "NONE");
}

#[test]
fn computed_attributes_become_placeholders() {
    let doc = synthesize(&StackConfig::default());

    let function = doc.get("dale-test-test_lambda").unwrap();
    assert_eq!(function.attributes["role"], "${role.dale-test-iam_for_lambda.arn}");
    assert_eq!(
        function.attributes["source_code_hash"],
        "${archive.dale-test-lambda.output_base64sha256}"
    );
    assert_eq!(
        function.attributes["environment"],
        serde_json::json!({ "variables": { "foo": "bar" } })
    );

    let policy = doc.get("dale-test-iamPolicy").unwrap();
    assert_eq!(policy.attributes["role"], "${role.dale-test-iam_for_lambda.id}");
    assert_eq!(
        policy.attributes["policy"],
        "${policy-document.dale-test-iamPolicyDoc.json}"
    );

    let output = doc.get(OUTPUT_NAME).unwrap();
    assert_eq!(
        output.attributes["value"],
        "${function-url.dale-test-lambda-url.function_url}"
    );
}

#[test]
fn provider_carries_region_account_and_tags() {
    let config = StackConfig::default()
        .with_region("us-east-1")
        .with_account_id("123456789012")
        .with_tag("team", "platform");
    let doc = synthesize(&config);

    let provider = doc.get("dale-test-aws").unwrap();
    assert_eq!(
        serde_json::Value::Object(provider.attributes.clone()),
        serde_json::json!({
            "region": "us-east-1",
            "allowed_account_ids": ["123456789012"],
            "default_tags": [{
                "tags": {
                    "name": "dale-test-lambda-stack",
                    "team": "platform",
                    "version": "1.0"
                }
            }]
        })
    );
}

#[test]
fn config_file_drives_names() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
prefix = "prod-"
log_group_function = "billing"

[function]
name = "billing"
"#
    )
    .unwrap();

    let config = StackConfig::from_path(file.path()).unwrap();
    let doc = synthesize(&config);

    assert!(doc.get("prod-test_lambda").is_some());
    assert_eq!(
        doc.get("prod-lambda-url").unwrap().attributes["function_name"],
        "billing"
    );
    let log_doc = doc.get("prod-iamPolicyDoc").unwrap();
    assert_eq!(
        log_doc.attributes["statement"][1]["resources"][0],
        "arn:aws:logs:eu-west-2:<account-id>:log-group:/aws/lambda/billing:*"
    );
}

#[test]
fn synthesizes_to_file_in_both_formats() {
    let dir = tempfile::tempdir().unwrap();

    for format in [DocumentFormat::Json, DocumentFormat::Yaml] {
        let path = dir.path().join(format!("stack.{}", format.extension()));
        let graph = LambdaStack::build(&StackConfig::default(), SynthConfig::default()).unwrap();
        let mut run = SynthesisRun::from_graph(graph);

        let doc = run.synthesize_to(&DocumentSink::new(&path, format)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, doc.render(format).unwrap());
        assert_eq!(run.state(), RunState::Emitted);
    }
}

#[test]
fn plain_interpolation_for_whole_stack() {
    let graph = LambdaStack::build(
        &StackConfig::default(),
        SynthConfig::default().with_interpolation(InterpolationSyntax::Plain),
    )
    .unwrap();
    let doc = SynthesisRun::from_graph(graph).synthesize().unwrap();

    assert_eq!(
        doc.get("dale-test-test_lambda").unwrap().attributes["role"],
        "((dale-test-iam_for_lambda.arn))"
    );
}

#[test]
fn repeated_synthesis_is_identical() {
    let first = synthesize(&StackConfig::default());
    let second = synthesize(&StackConfig::default());
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
}
