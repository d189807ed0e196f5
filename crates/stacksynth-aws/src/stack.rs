//! Serverless function deployment stack
//!
//! Declares a packaged function behind a public URL, with an execution role
//! that may write its own logs:
//!
//! ```text
//! assume_role ─json─▶ iam_for_lambda ─id──▶ iamPolicy ◀─json─ iamPolicyDoc
//!                           │arn
//!                           ▼
//!  lambda (archive) ─sha─▶ test_lambda ─function_name─▶ lambda-url ─▶ lambda-function
//! ```

use crate::config::StackConfig;
use crate::error::StackError;
use stacksynth_core::{
    kinds, Arn, Graph, NodeHandle, NodeSpec, PolicyDocument, PolicyStatement, Principal,
    SynthConfig, Value,
};

/// Policy language version for the log policy
pub const POLICY_VERSION: &str = "2012-10-17";

/// Logical name of the stack output
pub const OUTPUT_NAME: &str = "lambda-function";

/// Builds the deployment graph from a [`StackConfig`]
#[derive(Debug, Clone)]
pub struct LambdaStack<'a> {
    config: &'a StackConfig,
}

impl<'a> LambdaStack<'a> {
    /// Stack over `config`
    #[must_use]
    pub fn new(config: &'a StackConfig) -> Self {
        Self { config }
    }

    /// Declare every node of the stack into a fresh graph
    pub fn build(config: &StackConfig, synth: SynthConfig) -> Result<Graph, StackError> {
        let mut graph = Graph::new(synth);
        LambdaStack::new(config).declare(&mut graph)?;
        Ok(graph)
    }

    /// Declare every node of the stack into `graph`
    ///
    /// Returns the handle of the stack output.
    pub fn declare(&self, graph: &mut Graph) -> Result<NodeHandle, StackError> {
        let cfg = self.config;

        graph.register_spec(NodeSpec::new("archiveProvider", kinds::PROVIDER))?;
        graph.register_spec(self.aws_provider())?;

        let role = self.roles_and_permissions(graph)?;

        let archive = graph.register_spec(
            NodeSpec::new(cfg.prefixed("lambda"), kinds::ARCHIVE)
                .attr("output_path", &cfg.function.archive_path)
                .attr("source_dir", &cfg.function.source_dir)
                .attr("type", "zip"),
        )?;

        let function = graph.register_spec(
            NodeSpec::new(cfg.prefixed("test_lambda"), kinds::FUNCTION)
                .attr(
                    "environment",
                    Value::map([("variables", Value::map(&cfg.function.environment))]),
                )
                .attr("filename", &cfg.function.archive_path)
                .attr("function_name", &cfg.function.name)
                .attr("handler", &cfg.function.handler)
                .attr("role", role.attr("arn"))
                .attr("runtime", &cfg.function.runtime)
                .attr("source_code_hash", archive.attr("output_base64sha256")),
        )?;

        let url = graph.register_spec(
            NodeSpec::new(cfg.prefixed("lambda-url"), kinds::FUNCTION_URL)
                .attr("function_name", function.attr("function_name"))
                .attr("authorization_type", &cfg.function.url_auth_type),
        )?;

        let output = graph.register_spec(
            NodeSpec::new(OUTPUT_NAME, kinds::OUTPUT).attr("value", url.attr("function_url")),
        )?;

        tracing::debug!(nodes = graph.len(), prefix = %cfg.prefix, "lambda stack declared");
        Ok(output)
    }

    fn aws_provider(&self) -> NodeSpec {
        let cfg = self.config;
        let mut spec = NodeSpec::new(cfg.prefixed("aws"), kinds::PROVIDER)
            .attr("region", &cfg.region)
            .attr("allowed_account_ids", Value::list([&cfg.account_id]));

        if !cfg.default_tags.is_empty() {
            spec = spec.attr(
                "default_tags",
                Value::list([Value::map([("tags", Value::map(&cfg.default_tags))])]),
            );
        }
        spec
    }

    fn roles_and_permissions(&self, graph: &mut Graph) -> Result<NodeHandle, StackError> {
        let cfg = self.config;

        let assume_role = graph.register_spec(
            PolicyDocument::new(vec![PolicyStatement::allow(["sts:AssumeRole"])
                .principal(Principal::service("lambda.amazonaws.com"))])
            .into_spec(cfg.prefixed("assume_role")),
        )?;

        let role_name = cfg.prefixed("iam_for_lambda");
        let role = graph.register_spec(
            NodeSpec::new(role_name.clone(), kinds::ROLE)
                .attr("assume_role_policy", assume_role.attr("json"))
                .attr("name", role_name),
        )?;

        let all_logs = Arn::new("logs", &cfg.region, &cfg.account_id, "*");
        let function_logs = Arn::new(
            "logs",
            &cfg.region,
            &cfg.account_id,
            format!("log-group:/aws/lambda/{}:*", cfg.log_group_function),
        );
        let log_policy = graph.register_spec(
            PolicyDocument::new(vec![
                PolicyStatement::allow(["logs:CreateLogGroup"]).on([all_logs]),
                PolicyStatement::allow(["logs:CreateLogStream", "logs:PutLogEvents"])
                    .on([function_logs]),
            ])
            .with_version(POLICY_VERSION)
            .into_spec(cfg.prefixed("iamPolicyDoc")),
        )?;

        graph.register_spec(
            NodeSpec::new(cfg.prefixed("iamPolicy"), kinds::ROLE_POLICY)
                .attr("name", cfg.prefixed("iamPolicy-state"))
                .attr("role", role.attr("id"))
                .attr("policy", log_policy.attr("json")),
        )?;

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_every_node_in_source_order() {
        let graph = LambdaStack::build(&StackConfig::default(), SynthConfig::default()).unwrap();
        let names: Vec<&str> = graph.iter().map(|n| n.name()).collect();
        assert_eq!(
            names,
            [
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
    fn log_resources_are_structured_arns() {
        let graph = LambdaStack::build(&StackConfig::default(), SynthConfig::default()).unwrap();
        let doc = graph.lookup("dale-test-iamPolicyDoc").unwrap();
        let Some(Value::List(statements)) = doc.attribute("statement") else {
            panic!("statement list missing");
        };
        let Value::Map(second) = &statements[1] else {
            panic!("statement is not a map");
        };
        assert_eq!(
            second["resources"],
            Value::list([
                "arn:aws:logs:eu-west-2:<account-id>:log-group:/aws/lambda/dale-test-manual:*"
            ])
        );
    }

    #[test]
    fn empty_tags_omit_tag_block() {
        let mut config = StackConfig::default();
        config.default_tags.clear();
        let graph = LambdaStack::build(&config, SynthConfig::default()).unwrap();
        let provider = graph.lookup("dale-test-aws").unwrap();
        assert!(provider.attribute("default_tags").is_none());
    }

    #[test]
    fn declaring_twice_into_one_graph_collides() {
        let config = StackConfig::default();
        let mut graph = Graph::default();
        LambdaStack::new(&config).declare(&mut graph).unwrap();

        assert!(matches!(
            LambdaStack::new(&config).declare(&mut graph),
            Err(StackError::Graph(stacksynth_core::GraphError::DuplicateName { .. }))
        ));
    }
}
