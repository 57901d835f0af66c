use super::{
    exchange::ExchangeConfig, genetic::GeneticConfig, population::PopulationConfig,
    simulation::SimulationConfig, traits::ConfigSection,
};
use crate::error::LcsError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Environment variables starting with this prefix override file values,
/// e.g. `LCSEVO__GENETIC__THETA_GA=10`
pub const ENV_PREFIX: &str = "LCSEVO";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub genetic: GeneticConfig,
    pub population: PopulationConfig,
    pub exchange: ExchangeConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), LcsError> {
        self.genetic.validate()?;
        self.population.validate()?;
        self.exchange.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    pub fn section_names() -> [&'static str; 4] {
        [
            GeneticConfig::section_name(),
            PopulationConfig::section_name(),
            ExchangeConfig::section_name(),
            SimulationConfig::section_name(),
        ]
    }
}

#[derive(Debug, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML or JSON file (by extension), layering environment overrides on top
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LcsError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LcsError> {
        let toml_str = {
            let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
            toml::to_string_pretty(&*config)?
        };
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply `f` and keep the result only if it still validates
    pub fn update<F>(&self, f: F) -> Result<(), LcsError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}
