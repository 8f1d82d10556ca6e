//! Behaviour of the six insertion entry points against fake registries.

use std::collections::BTreeSet;

use pipeline_config::{
    candidate_key, Component, ComponentCategory, ConfigTree, DefaultConfigFactory, Endpoint,
    InsertOutcome, MutationError, Mutator, Processor, ResourceKey, ResourceKind, TypeName,
    TypeRegistry,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeCatalog {
    inputs: BTreeSet<String>,
    outputs: BTreeSet<String>,
    processors: BTreeSet<String>,
    conditions: BTreeSet<String>,
    caches: BTreeSet<String>,
    rate_limits: BTreeSet<String>,
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl FakeCatalog {
    fn new() -> Self {
        Self {
            inputs: names(&["stdin", "kafka", "http_server", "broker"]),
            outputs: names(&["stdout", "kafka", "file", "broker"]),
            processors: names(&["jmespath", "sleep", "filter_parts"]),
            conditions: names(&["text", "static"]),
            caches: names(&["memory", "redis"]),
            rate_limits: names(&["local"]),
        }
    }
}

impl pipeline_config::Catalog for FakeCatalog {
    fn registry(&self, category: ComponentCategory) -> &dyn TypeRegistry {
        match category {
            ComponentCategory::Input => &self.inputs,
            ComponentCategory::Output => &self.outputs,
            ComponentCategory::Processor => &self.processors,
            ComponentCategory::Condition => &self.conditions,
            ComponentCategory::Cache => &self.caches,
            ComponentCategory::RateLimit => &self.rate_limits,
        }
    }
}

/// Produces `{"category": ..., "default_of": <type>}` so tests can tell
/// defaults apart. `broker` and `filter_parts` get their structured shapes.
struct FakeFactory;

impl DefaultConfigFactory for FakeFactory {
    fn build_default(&self, category: ComponentCategory, type_name: &TypeName) -> Value {
        match (category, type_name.as_str()) {
            (_, "broker") => json!({ "copies": 1 }),
            (ComponentCategory::Processor, "filter_parts") => {
                json!({ "type": "static", "static": true })
            }
            (category, name) => json!({ "category": category.as_str(), "default_of": name }),
        }
    }
}

fn component(name: &str, payload: Value) -> Component {
    Component::new(TypeName::new(name).unwrap(), payload)
}

fn default_component(category: ComponentCategory, name: &str) -> Component {
    component(name, FakeFactory.build_default(category, &TypeName::new(name).unwrap()))
}

fn base_tree() -> ConfigTree {
    let input = component("stdin", json!({ "delimiter": "\n", "max_buffer": 65536 }));
    let output = component("stdout", json!({ "delimiter": "" }));
    ConfigTree::new(input, output).unwrap()
}

fn input_endpoints(tree: &ConfigTree) -> Vec<Endpoint<pipeline_config::InputSlot>> {
    match &tree.input {
        Endpoint::Broker(broker) => broker.endpoints().to_vec(),
        Endpoint::Component(_) => panic!("input is not a broker"),
    }
}

// ---------------------------------------------------------------------------
// Processors and conditions
// ---------------------------------------------------------------------------

#[test]
fn test_same_processor_twice_appends_twice_in_order() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();

    mutator.add_processor("jmespath", &mut tree).unwrap();
    mutator.add_processor("sleep", &mut tree).unwrap();
    let outcome = mutator.add_processor("jmespath", &mut tree).unwrap();

    assert_eq!(outcome, InsertOutcome::Appended { position: 2 });
    let types: Vec<_> = tree.pipeline.processors.iter().map(Processor::type_name).collect();
    assert_eq!(types, vec!["jmespath", "sleep", "jmespath"]);
}

#[test]
fn test_filter_parts_processor_gets_embedded_default_condition() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();

    mutator.add_processor("filter_parts", &mut tree).unwrap();

    let Processor::FilterParts(filter) = &tree.pipeline.processors[0] else {
        panic!("expected a filter_parts processor");
    };
    assert_eq!(filter.condition(), &component("static", json!(true)));
}

#[test]
fn test_condition_is_wrapped_in_filter_parts() {
    // GIVEN a tree with one processor already present
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    mutator.add_processor("sleep", &mut tree).unwrap();

    // WHEN a text condition is added
    let outcome = mutator.add_condition("text", &mut tree).unwrap();

    // THEN exactly one filter_parts processor is appended, hosting the default
    assert_eq!(outcome, InsertOutcome::Appended { position: 1 });
    assert_eq!(tree.pipeline.processors.len(), 2);
    let Processor::FilterParts(filter) = &tree.pipeline.processors[1] else {
        panic!("expected a filter_parts processor");
    };
    assert_eq!(
        filter.condition(),
        &default_component(ComponentCategory::Condition, "text")
    );
    assert_eq!(
        tree.pipeline.processors[1].to_value(),
        json!({
            "type": "filter_parts",
            "filter_parts": {
                "type": "text",
                "text": { "category": "condition", "default_of": "text" }
            }
        })
    );
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

#[test]
fn test_second_input_promotes_and_preserves_original() {
    // GIVEN a plain stdin input D
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    let original = tree.input.clone();

    // WHEN a kafka input E is added
    let outcome = mutator.add_input("kafka", &mut tree).unwrap();

    // THEN the input is a broker holding exactly [D, E]
    assert_eq!(outcome, InsertOutcome::Promoted { appended: Some(1) });
    assert_eq!(
        input_endpoints(&tree),
        vec![
            original,
            Endpoint::Component(default_component(ComponentCategory::Input, "kafka")),
        ]
    );
}

#[test]
fn test_adding_broker_input_only_promotes() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    let original = tree.input.clone();

    let outcome = mutator.add_input("broker", &mut tree).unwrap();

    assert_eq!(outcome, InsertOutcome::Promoted { appended: None });
    assert_eq!(input_endpoints(&tree), vec![original]);
}

#[test]
fn test_existing_broker_is_not_promoted_again() {
    // GIVEN an input broker [D, E]
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    mutator.add_input("kafka", &mut tree).unwrap();
    let before = input_endpoints(&tree);

    // WHEN F is added
    let outcome = mutator.add_input("http_server", &mut tree).unwrap();

    // THEN the broker holds [D, E, F] and no extra nesting appears
    assert_eq!(outcome, InsertOutcome::Appended { position: 2 });
    let after = input_endpoints(&tree);
    assert_eq!(after.len(), 3);
    assert_eq!(&after[..2], &before[..]);
    assert_eq!(after[2].type_name(), "http_server");
    assert!(after.iter().all(|e| !e.is_broker()));
}

#[test]
fn test_tree_built_with_broker_component_is_appended_to() {
    // GIVEN a tree constructed directly from a broker-typed input component
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let broker = component("broker", json!({ "inputs": [{ "type": "stdin" }] }));
    let mut tree = ConfigTree::new(broker, component("stdout", json!({}))).unwrap();

    // WHEN a kafka input is added
    let outcome = mutator.add_input("kafka", &mut tree).unwrap();

    // THEN kafka joins the existing broker instead of wrapping it
    assert_eq!(outcome, InsertOutcome::Appended { position: 1 });
    assert_eq!(
        serde_json::to_value(&tree.input).unwrap(),
        json!({
            "type": "broker",
            "broker": {
                "inputs": [
                    { "type": "stdin" },
                    { "type": "kafka", "kafka": { "category": "input", "default_of": "kafka" } }
                ]
            }
        })
    );
}

#[test]
fn test_output_promotion_uses_fan_out_broker() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();

    mutator.add_output("file", &mut tree).unwrap();

    assert_eq!(
        serde_json::to_value(&tree.output).unwrap(),
        json!({
            "type": "broker",
            "broker": {
                "copies": 1,
                "pattern": "fan_out",
                "outputs": [
                    { "type": "stdout", "stdout": { "delimiter": "" } },
                    { "type": "file", "file": { "category": "output", "default_of": "file" } }
                ]
            }
        })
    );
    // The input slot is untouched.
    assert!(!tree.input.is_broker());
}

#[test]
fn test_promotion_keeps_stored_fields_of_loaded_endpoint() {
    // GIVEN an input loaded from disk with fields the model does not know
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let raw_input = json!({
        "type": "kafka",
        "kafka": { "addresses": ["a:9092"], "topic": "orders" },
        "label": "ingest",
        "processors": [{ "type": "sleep", "sleep": { "duration": "1s" } }]
    });
    let mut tree: ConfigTree = serde_json::from_value(json!({
        "input": raw_input.clone(),
        "output": { "type": "stdout" }
    }))
    .unwrap();

    // WHEN another input is added
    mutator.add_input("stdin", &mut tree).unwrap();

    // THEN the first nested input encodes exactly as before
    let encoded = serde_json::to_value(&tree).unwrap();
    assert_eq!(encoded["input"]["broker"]["inputs"][0], raw_input);
}

// ---------------------------------------------------------------------------
// Caches and rate limits
// ---------------------------------------------------------------------------

#[test]
fn test_first_cache_is_named_example() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();

    let outcome = mutator.add_cache("memory", &mut tree).unwrap();

    let key = ResourceKey::new("example").unwrap();
    assert_eq!(
        outcome,
        InsertOutcome::Keyed {
            kind: ResourceKind::Cache,
            key: key.clone(),
        }
    );
    assert_eq!(
        tree.manager.caches.get(&key),
        Some(&default_component(ComponentCategory::Cache, "memory"))
    );
    assert!(tree.manager.rate_limits.is_empty());
}

#[test]
fn test_next_cache_after_example_and_example1_is_example2() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    for key in ["example", "example1"] {
        tree.manager
            .caches
            .insert(ResourceKey::new(key).unwrap(), component("redis", json!({})));
    }

    let outcome = mutator.add_cache("memory", &mut tree).unwrap();

    assert_eq!(
        outcome,
        InsertOutcome::Keyed {
            kind: ResourceKind::Cache,
            key: ResourceKey::new("example2").unwrap(),
        }
    );
    assert_eq!(tree.manager.caches.len(), 3);
}

#[test]
fn test_full_cache_key_space_fails_without_change() {
    // GIVEN all 10,000 candidate keys in use
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    for index in 0..10_000 {
        tree.manager.caches.insert(
            ResourceKey::new(candidate_key("example", index)).unwrap(),
            component("memory", json!({ "index": index })),
        );
    }
    let before = tree.clone();

    // WHEN another cache is added
    let result = mutator.add_cache("memory", &mut tree);

    // THEN the call fails closed and nothing changed
    assert_eq!(
        result,
        Err(MutationError::KeySpaceExhausted {
            kind: ResourceKind::Cache,
            prefix: "example".to_string(),
            attempts: 10_000,
        })
    );
    assert_eq!(tree, before);
}

#[test]
fn test_rate_limit_keys_are_independent_of_cache_keys() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    mutator.add_cache("memory", &mut tree).unwrap();

    let first = mutator.add_rate_limit("local", &mut tree).unwrap();
    let second = mutator.add_rate_limit("local", &mut tree).unwrap();

    assert_eq!(first.to_string(), "added rate_limit 'example'");
    assert_eq!(second.to_string(), "added rate_limit 'example1'");
    assert_eq!(tree.manager.caches.len(), 1);
}

#[test]
fn test_removed_key_is_reused() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    for _ in 0..3 {
        mutator.add_cache("memory", &mut tree).unwrap();
    }
    tree.manager.caches.remove(&ResourceKey::new("example1").unwrap());

    let outcome = mutator.add_cache("redis", &mut tree).unwrap();

    assert_eq!(
        outcome,
        InsertOutcome::Keyed {
            kind: ResourceKind::Cache,
            key: ResourceKey::new("example1").unwrap(),
        }
    );
}

// ---------------------------------------------------------------------------
// Unknown types
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_types_are_rejected_and_tree_is_unchanged() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();
    mutator.add_cache("memory", &mut tree).unwrap();
    let before = serde_json::to_string(&tree).unwrap();

    for category in ComponentCategory::ALL {
        let result = mutator.add(category, "does_not_exist", &mut tree);

        assert_eq!(
            result,
            Err(MutationError::UnrecognisedType {
                category,
                type_name: "does_not_exist".to_string(),
            })
        );
        assert_eq!(serde_json::to_string(&tree).unwrap(), before);
    }
}

#[test]
fn test_types_are_checked_against_their_own_category() {
    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &FakeFactory);
    let mut tree = base_tree();

    // "stdout" is an output, not an input; "memory" is a cache, not a rate limit.
    assert!(mutator.add_input("stdout", &mut tree).is_err());
    assert!(mutator.add_rate_limit("memory", &mut tree).is_err());
    assert_eq!(tree, base_tree());
}

#[test]
fn test_malformed_default_is_reported_before_mutation() {
    struct BrokenBroker;

    impl DefaultConfigFactory for BrokenBroker {
        fn build_default(&self, _category: ComponentCategory, _type_name: &TypeName) -> Value {
            json!({ "outputs": "not a list" })
        }
    }

    let catalog = FakeCatalog::new();
    let mutator = Mutator::new(&catalog, &BrokenBroker);
    let mut tree = base_tree();

    let result = mutator.add_output("broker", &mut tree);

    assert!(matches!(
        result,
        Err(MutationError::MalformedDefault {
            category: ComponentCategory::Output,
            ..
        })
    ));
    assert_eq!(tree, base_tree());
}
