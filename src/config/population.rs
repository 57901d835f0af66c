use super::genetic::SelectionMethod;
use super::traits::ConfigSection;
use crate::engines::control::{PostProcessPopulationControl, SortPopulationControl};
use crate::engines::generation::NaturalSelector;
use crate::error::LcsError;
use crate::types::{ComparisonMode, FitnessMetric};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessConfig {
    pub min_experience: u64,
    pub min_coverage: f64,
    pub min_fitness: f64,
    pub mode: ComparisonMode,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            min_experience: 10,
            min_coverage: 0.0,
            min_fitness: 0.0,
            mode: ComparisonMode::Exploitation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Total numerosity the population is trimmed back to after each step
    pub max_population: usize,
    pub deletion_method: SelectionMethod,
    /// Metric victims are weighted by; the deletion vote mode is maximized
    pub deletion_metric: FitnessMetric,
    pub tournament_size: usize,
    /// Remove rules checked this many times without covering anything
    pub inadequate_min_instances: Option<u64>,
    pub post_process: PostProcessConfig,
    pub sort_mode: ComparisonMode,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_population: 1000,
            deletion_method: SelectionMethod::Roulette,
            deletion_metric: FitnessMetric::maximize(ComparisonMode::Deletion),
            tournament_size: 5,
            inadequate_min_instances: None,
            post_process: PostProcessConfig::default(),
            sort_mode: ComparisonMode::Exploitation,
        }
    }
}

impl PopulationConfig {
    pub fn deletion_selector(&self) -> Box<dyn NaturalSelector> {
        self.deletion_method
            .build(self.deletion_metric, self.tournament_size, None)
    }

    pub fn post_process_control(&self) -> PostProcessPopulationControl {
        PostProcessPopulationControl::new(
            self.post_process.min_experience,
            self.post_process.min_coverage,
            self.post_process.min_fitness,
            self.post_process.mode,
        )
    }

    pub fn sort_control(&self) -> SortPopulationControl {
        SortPopulationControl::new(self.sort_mode)
    }
}

impl ConfigSection for PopulationConfig {
    fn section_name() -> &'static str {
        "population"
    }

    fn validate(&self) -> Result<(), LcsError> {
        if self.max_population == 0 {
            return Err(LcsError::Configuration(
                "population.max_population must be at least 1".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(LcsError::Configuration(
                "population.tournament_size must be at least 1".to_string(),
            ));
        }
        if self.post_process.min_coverage < 0.0 {
            return Err(LcsError::Configuration(
                "population.post_process.min_coverage must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
