use crate::error::LcsError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), LcsError>;
}

pub(crate) fn check_rate(section: &str, name: &str, value: f64) -> Result<(), LcsError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(LcsError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, name, value
        )));
    }
    Ok(())
}
