//! `stacksynth` command line
//!
//! `synth` writes the lambda stack document to a file; `plan` prints the
//! emission order. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use stacksynth_aws::{LambdaStack, StackConfig};
use stacksynth_core::{
    DocumentFormat, DocumentSink, InterpolationSyntax, SynthConfig, SynthesisRun,
};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Stack config TOML; built-in defaults when omitted");
    let interpolation_arg = Arg::new("interpolation")
        .long("interpolation")
        .default_value("terraform")
        .value_parser(["terraform", "plain"])
        .help("Placeholder syntax for engine-computed attributes");

    let cli = Command::new("stacksynth")
        .version(stacksynth_aws::VERSION)
        .about("Synthesize the serverless function stack into a deployment document")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("synth")
                .about("Write the ordered document atomically")
                .arg(config_arg.clone())
                .arg(interpolation_arg.clone())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination file"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .value_parser(["json", "yaml", "yml"])
                        .help("Document format"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Print node names and kinds in emission order")
                .arg(config_arg)
                .arg(interpolation_arg),
        );

    let matches = cli.get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("synth", args)) => synth(args),
        Some(("plan", args)) => plan(args),
        _ => Ok(()),
    }
}

fn synth(args: &ArgMatches) -> anyhow::Result<()> {
    let mut run = build_run(args)?;

    let out = args
        .get_one::<PathBuf>("out")
        .context("--out is required")?;
    let format: DocumentFormat = args
        .get_one::<String>("format")
        .map_or(Ok(DocumentFormat::Json), |f| f.parse())
        .map_err(anyhow::Error::msg)?;

    let document = run
        .synthesize_to(&DocumentSink::new(out, format))
        .with_context(|| format!("synthesis to {} failed", out.display()))?;

    println!("wrote {} records to {}", document.len(), out.display());
    Ok(())
}

fn plan(args: &ArgMatches) -> anyhow::Result<()> {
    let document = build_run(args)?
        .synthesize()
        .context("synthesis failed")?;

    for (index, record) in document.records().iter().enumerate() {
        println!("{index:>3}  {:<16} {}", record.kind, record.name);
    }
    Ok(())
}

fn build_run(args: &ArgMatches) -> anyhow::Result<SynthesisRun> {
    let stack = match args.get_one::<PathBuf>("config") {
        Some(path) => StackConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StackConfig::default(),
    };

    let interpolation = match args.get_one::<String>("interpolation").map(String::as_str) {
        Some("plain") => InterpolationSyntax::Plain,
        _ => InterpolationSyntax::Terraform,
    };
    let synth = SynthConfig::default()
        .with_stack_name(stack.prefixed("lambda"))
        .with_interpolation(interpolation);

    let graph = LambdaStack::build(&stack, synth).context("declaring lambda stack")?;
    Ok(SynthesisRun::from_graph(graph))
}

fn init_tracing(json: bool) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let text = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let structured =
        json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(structured)
        .init();
}
