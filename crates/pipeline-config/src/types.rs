//! Shared value types for the configuration domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these are closed sets of
//! values: the component categories a registry can be asked about, the two
//! keyed resource mappings, and the broker routing patterns.

use serde::{Deserialize, Serialize};

/// Type name of the multi-endpoint fan-in / fan-out component.
pub const BROKER_TYPE: &str = "broker";

/// Type name of the processor that hosts an embedded condition.
pub const FILTER_PARTS_TYPE: &str = "filter_parts";

// ---------------------------------------------------------------------------
// Component categories
// ---------------------------------------------------------------------------

/// The category a component declaration belongs to.
///
/// Each category has its own type registry; a type name is only meaningful
/// together with its category (`"kafka"` is both an input and an output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Message sources.
    Input,
    /// Message sinks.
    Output,
    /// Pipeline steps.
    Processor,
    /// Boolean checks, hosted by `filter_parts` processors.
    Condition,
    /// Keyed cache resources.
    Cache,
    /// Keyed rate limit resources.
    RateLimit,
}

impl ComponentCategory {
    /// All categories, in display order.
    pub const ALL: [ComponentCategory; 6] = [
        ComponentCategory::Input,
        ComponentCategory::Output,
        ComponentCategory::Processor,
        ComponentCategory::Condition,
        ComponentCategory::Cache,
        ComponentCategory::RateLimit,
    ];

    /// Returns the snake_case name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentCategory::Input => "input",
            ComponentCategory::Output => "output",
            ComponentCategory::Processor => "processor",
            ComponentCategory::Condition => "condition",
            ComponentCategory::Cache => "cache",
            ComponentCategory::RateLimit => "rate_limit",
        }
    }
}

impl std::fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s || (*c == ComponentCategory::RateLimit && s == "ratelimit"))
            .ok_or_else(|| format!("unknown component category '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Keyed resources
// ---------------------------------------------------------------------------

/// Selects one of the keyed resource mappings held by the manager section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// `manager.caches`
    Cache,
    /// `manager.rate_limits`
    RateLimit,
}

impl ResourceKind {
    /// The component category whose registry validates entries of this kind.
    pub fn category(self) -> ComponentCategory {
        match self {
            ResourceKind::Cache => ComponentCategory::Cache,
            ResourceKind::RateLimit => ComponentCategory::RateLimit,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.category().as_str())
    }
}

// ---------------------------------------------------------------------------
// Broker routing
// ---------------------------------------------------------------------------

/// How a broker distributes messages across its nested endpoints.
///
/// Only meaningful for output brokers; input brokers always fan in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerPattern {
    /// Every message goes to every output, in parallel.
    FanOut,
    /// Every message goes to every output, one after another.
    FanOutSequential,
    /// Outputs take turns.
    RoundRobin,
    /// Whichever output is ready first takes the message.
    Greedy,
    /// Outputs are tried in order until one succeeds.
    Try,
}
