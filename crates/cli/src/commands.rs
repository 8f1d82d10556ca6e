//! Subcommand implementations.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use components::BuiltinCatalog;
use pipeline_config::{
    Catalog, ComponentCategory, ConfigTree, DefaultConfigFactory, Endpoint, Manager, Mutator,
    MutatorSettings, Pipeline, Slot, TypeName,
};
use serde_json::{json, Map};
use tracing::info;

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Configuration file to read; stdin when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write the result back to the configuration file instead of stdout.
    #[arg(long, requires = "config")]
    in_place: bool,

    /// Input type to add (repeatable).
    #[arg(long = "input", value_name = "TYPE")]
    inputs: Vec<String>,

    /// Processor type to add (repeatable).
    #[arg(long = "processor", value_name = "TYPE")]
    processors: Vec<String>,

    /// Condition type to add as a filter_parts processor (repeatable).
    #[arg(long = "condition", value_name = "TYPE")]
    conditions: Vec<String>,

    /// Output type to add (repeatable).
    #[arg(long = "output", value_name = "TYPE")]
    outputs: Vec<String>,

    /// Cache type to add under a generated key (repeatable).
    #[arg(long = "cache", value_name = "TYPE")]
    caches: Vec<String>,

    /// Rate limit type to add under a generated key (repeatable).
    #[arg(long = "rate-limit", value_name = "TYPE")]
    rate_limits: Vec<String>,
}

impl AddArgs {
    /// Requested additions, in the order they are applied.
    fn additions(&self) -> impl Iterator<Item = (ComponentCategory, &str)> + '_ {
        [
            (ComponentCategory::Input, &self.inputs),
            (ComponentCategory::Processor, &self.processors),
            (ComponentCategory::Condition, &self.conditions),
            (ComponentCategory::Output, &self.outputs),
            (ComponentCategory::Cache, &self.caches),
            (ComponentCategory::RateLimit, &self.rate_limits),
        ]
        .into_iter()
        .flat_map(|(category, names)| names.iter().map(move |name| (category, name.as_str())))
    }
}

pub fn add(args: &AddArgs, settings: MutatorSettings) -> anyhow::Result<()> {
    let catalog = BuiltinCatalog::new();
    let mutator = Mutator::with_settings(&catalog, &catalog, settings).context("invalid settings")?;

    let mut tree = load_tree(args.config.as_ref())?;
    for (category, type_name) in args.additions() {
        let outcome = mutator
            .add(category, type_name, &mut tree)
            .with_context(|| format!("failed to add {category} '{type_name}'"))?;
        info!(%category, type_name, %outcome, "added component");
    }

    match (&args.config, args.in_place) {
        (Some(path), true) => {
            let encoded = encode(&tree)?;
            fs::write(path, encoded).with_context(|| format!("failed to write {}", path.display()))
        }
        _ => print_tree(&tree),
    }
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// `inputs/processors/outputs`, each a comma-separated list of types.
    #[arg(default_value = "")]
    expression: String,
}

/// The three segments of a create expression.
#[derive(Debug, Default, PartialEq, Eq)]
struct Blueprint {
    inputs: Vec<String>,
    processors: Vec<String>,
    outputs: Vec<String>,
}

impl Blueprint {
    fn parse(expression: &str) -> anyhow::Result<Self> {
        let segments: Vec<&str> = expression.split('/').collect();
        if segments.len() > 3 {
            bail!("expected at most three '/'-separated segments, found {}", segments.len());
        }
        let list = |index: usize| -> Vec<String> {
            segments
                .get(index)
                .map(|segment| {
                    segment
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        };
        Ok(Self {
            inputs: list(0),
            processors: list(1),
            outputs: list(2),
        })
    }
}

pub fn create(args: &CreateArgs, settings: MutatorSettings) -> anyhow::Result<()> {
    let blueprint = Blueprint::parse(&args.expression)?;
    let catalog = BuiltinCatalog::new();
    let mutator = Mutator::with_settings(&catalog, &catalog, settings).context("invalid settings")?;

    let (first_input, more_inputs) = split_first_or(&blueprint.inputs, "stdin");
    let (first_output, more_outputs) = split_first_or(&blueprint.outputs, "stdout");
    let mut tree = ConfigTree {
        input: base_endpoint(&catalog, first_input)?,
        pipeline: Pipeline::default(),
        output: base_endpoint(&catalog, first_output)?,
        manager: Manager::default(),
        extra: Map::new(),
    };

    for name in more_inputs {
        mutator.add_input(name, &mut tree).with_context(|| format!("failed to add input '{name}'"))?;
    }
    for name in &blueprint.processors {
        mutator
            .add_processor(name, &mut tree)
            .with_context(|| format!("failed to add processor '{name}'"))?;
    }
    for name in more_outputs {
        mutator.add_output(name, &mut tree).with_context(|| format!("failed to add output '{name}'"))?;
    }

    print_tree(&tree)
}

fn split_first_or<'a>(names: &'a [String], fallback: &'a str) -> (&'a str, &'a [String]) {
    match names.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => (fallback, &[]),
    }
}

/// Builds the starting endpoint of a slot from a registered type.
fn base_endpoint<S: Slot>(catalog: &BuiltinCatalog, name: &str) -> anyhow::Result<Endpoint<S>> {
    if !catalog.is_registered(S::CATEGORY, name) {
        bail!("{} type '{name}' not recognised", S::CATEGORY);
    }
    let type_name = TypeName::new(name).context("empty type name")?;
    let payload = catalog.build_default(S::CATEGORY, &type_name);
    Endpoint::from_value(json!({ "type": name, name: payload }))
        .with_context(|| format!("default {} '{name}' is malformed", S::CATEGORY))
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

pub fn list(category: Option<ComponentCategory>) {
    let catalog = BuiltinCatalog::new();
    let categories = match category {
        Some(category) => vec![category],
        None => ComponentCategory::ALL.to_vec(),
    };
    for category in categories {
        println!("{category}:");
        for name in catalog.names(category) {
            println!("  {name}");
        }
    }
}

// ---------------------------------------------------------------------------
// I/O
// ---------------------------------------------------------------------------

fn load_tree(path: Option<&PathBuf>) -> anyhow::Result<ConfigTree> {
    let raw = match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw).context("failed to read stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("failed to decode configuration")
}

fn encode(tree: &ConfigTree) -> anyhow::Result<String> {
    let mut encoded = serde_json::to_string_pretty(tree).context("failed to encode configuration")?;
    encoded.push('\n');
    Ok(encoded)
}

fn print_tree(tree: &ConfigTree) -> anyhow::Result<()> {
    let encoded = encode(tree)?;
    io::stdout().lock().write_all(encoded.as_bytes()).context("failed to write stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_parses_all_segments() {
        let blueprint = Blueprint::parse("stdin, kafka/jmespath/stdout").unwrap();
        assert_eq!(
            blueprint,
            Blueprint {
                inputs: vec!["stdin".into(), "kafka".into()],
                processors: vec!["jmespath".into()],
                outputs: vec!["stdout".into()],
            }
        );
    }

    #[test]
    fn test_blueprint_segments_are_optional() {
        assert_eq!(Blueprint::parse("").unwrap(), Blueprint::default());
        assert_eq!(Blueprint::parse("//kafka").unwrap().outputs, vec!["kafka".to_string()]);
        assert!(Blueprint::parse("a/b/c/d").is_err());
    }

    #[test]
    fn test_base_endpoint_rejects_unknown_types() {
        let catalog = BuiltinCatalog::new();
        assert!(base_endpoint::<pipeline_config::InputSlot>(&catalog, "nope").is_err());
        let broker = base_endpoint::<pipeline_config::OutputSlot>(&catalog, "broker").unwrap();
        assert!(broker.is_broker());
    }
}
