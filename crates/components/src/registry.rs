//! Static type registries for the built-in components.

use pipeline_config::{ComponentCategory, TypeRegistry};

/// A registry backed by a fixed list of type names.
#[derive(Debug, Clone, Copy)]
pub struct StaticRegistry {
    names: &'static [&'static str],
}

impl StaticRegistry {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// Registered names, in declaration order.
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
}

impl TypeRegistry for StaticRegistry {
    fn contains(&self, type_name: &str) -> bool {
        self.names.iter().any(|name| *name == type_name)
    }
}

pub(crate) const INPUTS: StaticRegistry = StaticRegistry::new(&[
    "amqp",
    "broker",
    "file",
    "http_client",
    "http_server",
    "kafka",
    "nats",
    "redis_list",
    "stdin",
]);

pub(crate) const OUTPUTS: StaticRegistry = StaticRegistry::new(&[
    "amqp",
    "broker",
    "drop",
    "file",
    "http_client",
    "http_server",
    "kafka",
    "nats",
    "redis_list",
    "stdout",
]);

pub(crate) const PROCESSORS: StaticRegistry = StaticRegistry::new(&[
    "bounds_check",
    "compress",
    "decompress",
    "filter_parts",
    "jmespath",
    "log",
    "noop",
    "sleep",
    "split",
    "text",
]);

pub(crate) const CONDITIONS: StaticRegistry = StaticRegistry::new(&[
    "and",
    "bounds_check",
    "check_field",
    "jmespath",
    "not",
    "or",
    "static",
    "text",
]);

pub(crate) const CACHES: StaticRegistry = StaticRegistry::new(&["file", "memcached", "memory", "redis"]);

pub(crate) const RATE_LIMITS: StaticRegistry = StaticRegistry::new(&["local"]);

/// Returns the built-in registry for `category`.
pub fn registry_for(category: ComponentCategory) -> &'static StaticRegistry {
    match category {
        ComponentCategory::Input => &INPUTS,
        ComponentCategory::Output => &OUTPUTS,
        ComponentCategory::Processor => &PROCESSORS,
        ComponentCategory::Condition => &CONDITIONS,
        ComponentCategory::Cache => &CACHES,
        ComponentCategory::RateLimit => &RATE_LIMITS,
    }
}
