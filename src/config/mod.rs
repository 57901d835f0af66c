pub mod exchange;
pub mod genetic;
pub mod manager;
pub mod population;
pub mod simulation;
pub mod traits;

pub use exchange::{CollisionPolicy, ExchangeConfig, FilterKind, NumerosityPolicy, RuleFilterConfig};
pub use genetic::{GeneticConfig, SelectionMethod};
pub use manager::{AppConfig, ConfigManager, ENV_PREFIX};
pub use population::{PopulationConfig, PostProcessConfig};
pub use simulation::SimulationConfig;
pub use traits::ConfigSection;
