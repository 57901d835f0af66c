use super::traits::ConfigSection;
use crate::engines::generation::{
    AllSelector, BestClassifierSelector, NaturalSelector, SelectionCount, ThresholdSelector,
};
use crate::error::LcsError;
use crate::types::{ComparisonMode, FitnessMetric};
use serde::{Deserialize, Serialize};

/// How a received rule's numerosity is carried into the local population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumerosityPolicy {
    /// Keep the sender's numerosity
    #[default]
    Retain,
    /// Every received rule enters with numerosity 1
    Normalize,
}

/// What a socket does when a second router registers on a taken address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    #[default]
    FirstWriterWins,
    Replace,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    All,
    Threshold,
    Best,
}

/// Selector applied to outgoing or incoming rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFilterConfig {
    pub kind: FilterKind,
    pub mode: ComparisonMode,
    /// Lower bound for `Threshold`
    pub min_value: f64,
    /// Cap for `Best`; `None` takes the full ranking
    pub count: Option<usize>,
}

impl Default for RuleFilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::All,
            mode: ComparisonMode::Exploitation,
            min_value: 0.0,
            count: None,
        }
    }
}

impl RuleFilterConfig {
    pub fn threshold(mode: ComparisonMode, min_value: f64) -> Self {
        Self {
            kind: FilterKind::Threshold,
            mode,
            min_value,
            count: None,
        }
    }

    pub fn best(mode: ComparisonMode, count: usize) -> Self {
        Self {
            kind: FilterKind::Best,
            mode,
            min_value: 0.0,
            count: Some(count),
        }
    }

    pub fn selector(&self) -> Box<dyn NaturalSelector> {
        match self.kind {
            FilterKind::All => Box::new(AllSelector),
            FilterKind::Threshold => Box::new(ThresholdSelector::new(self.mode, self.min_value)),
            FilterKind::Best => Box::new(BestClassifierSelector::new(FitnessMetric::maximize(self.mode))),
        }
    }

    pub fn count(&self) -> SelectionCount {
        match (self.kind, self.count) {
            (FilterKind::Best, Some(count)) => SelectionCount::Count(count),
            _ => SelectionCount::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub numerosity_policy: NumerosityPolicy,
    pub collision_policy: CollisionPolicy,
    /// Let one router sit on several addresses of the same socket
    pub allow_router_aliases: bool,
    pub send_filter: RuleFilterConfig,
    pub receive_filter: RuleFilterConfig,
    /// Epochs between exchange rounds
    pub exchange_interval: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            numerosity_policy: NumerosityPolicy::Retain,
            collision_policy: CollisionPolicy::FirstWriterWins,
            allow_router_aliases: false,
            send_filter: RuleFilterConfig::best(ComparisonMode::Exploitation, 10),
            receive_filter: RuleFilterConfig::default(),
            exchange_interval: 1,
        }
    }
}

impl ConfigSection for ExchangeConfig {
    fn section_name() -> &'static str {
        "exchange"
    }

    fn validate(&self) -> Result<(), LcsError> {
        if self.exchange_interval == 0 {
            return Err(LcsError::Configuration(
                "exchange.exchange_interval must be at least 1".to_string(),
            ));
        }
        for (name, filter) in [("send_filter", &self.send_filter), ("receive_filter", &self.receive_filter)] {
            if filter.kind == FilterKind::Best && filter.count == Some(0) {
                return Err(LcsError::Configuration(format!(
                    "exchange.{}.count must be at least 1",
                    name
                )));
            }
        }
        Ok(())
    }
}
