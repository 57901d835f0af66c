use super::traits::{check_rate, ConfigSection};
use crate::engines::generation::{
    BestClassifierSelector, NaturalSelector, RouletteWheelSelector, TournamentSelector, TournamentSize,
};
use crate::error::LcsError;
use crate::types::{ComparisonMode, FitnessMetric};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    Tournament,
    Roulette,
    Best,
}

impl SelectionMethod {
    /// Build a selector of this kind weighting individuals by `metric`
    pub fn build(
        &self,
        metric: FitnessMetric,
        tournament_size: usize,
        tournament_fraction: Option<f64>,
    ) -> Box<dyn NaturalSelector> {
        match self {
            SelectionMethod::Roulette => Box::new(RouletteWheelSelector::new(metric)),
            SelectionMethod::Tournament => {
                let size = match tournament_fraction {
                    Some(fraction) => TournamentSize::Fraction(fraction),
                    None => TournamentSize::Fixed(tournament_size),
                };
                Box::new(TournamentSelector::new(metric, size))
            }
            SelectionMethod::Best => Box::new(BestClassifierSelector::new(metric)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Mean niche age required before the GA fires
    pub theta_ga: f64,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub selection_method: SelectionMethod,
    pub tournament_size: usize,
    /// When set, tournaments use this fraction of the niche instead of a fixed size
    pub tournament_fraction: Option<f64>,
    pub parent_mode: ComparisonMode,
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            theta_ga: 25.0,
            crossover_rate: 0.8,
            mutation_rate: 0.04,
            selection_method: SelectionMethod::Roulette,
            tournament_size: 5,
            tournament_fraction: None,
            parent_mode: ComparisonMode::Exploration,
            seed: None,
        }
    }
}

impl GeneticConfig {
    pub fn parent_selector(&self) -> Box<dyn NaturalSelector> {
        self.selection_method.build(
            FitnessMetric::maximize(self.parent_mode),
            self.tournament_size,
            self.tournament_fraction,
        )
    }
}

impl ConfigSection for GeneticConfig {
    fn section_name() -> &'static str {
        "genetic"
    }

    fn validate(&self) -> Result<(), LcsError> {
        check_rate("genetic", "crossover_rate", self.crossover_rate)?;
        check_rate("genetic", "mutation_rate", self.mutation_rate)?;
        if self.theta_ga < 0.0 {
            return Err(LcsError::Configuration(
                "genetic.theta_ga must not be negative".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(LcsError::Configuration(
                "genetic.tournament_size must be at least 1".to_string(),
            ));
        }
        if let Some(fraction) = self.tournament_fraction {
            check_rate("genetic", "tournament_fraction", fraction)?;
        }
        Ok(())
    }
}
