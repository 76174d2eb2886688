use serde::{Deserialize, Serialize};

/// Constructor-time configuration for the tile engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of tile records held in the LRU cache
    pub cache_capacity: usize,
    /// Maximum number of concurrent fetch workers
    pub max_workers: usize,
    /// Ring of extra tiles loaded around the visible area
    pub buffer_radius: u32,
    /// Highest tile zoom level the engine will request
    pub max_zoom: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 2048,
            max_workers: 8,
            buffer_radius: 1,
            max_zoom: 18,
        }
    }
}

/// Unified configuration presets
impl EngineConfig {
    pub fn low_resource() -> Self {
        Self {
            cache_capacity: 256,
            max_workers: 2,
            buffer_radius: 0,
            max_zoom: 16,
        }
    }

    pub fn high_performance() -> Self {
        Self {
            cache_capacity: 8192,
            max_workers: 16,
            buffer_radius: 2,
            max_zoom: 18,
        }
    }

    pub fn for_testing() -> Self {
        Self {
            cache_capacity: 32,
            max_workers: 2,
            buffer_radius: 0,
            max_zoom: 18,
        }
    }

    /// Validates the configuration bounds
    pub fn validate(&self) -> crate::Result<()> {
        if self.cache_capacity == 0 {
            return Err(
                crate::EngineError::Config("cache_capacity must be >= 1".to_string()).into(),
            );
        }
        if self.max_workers == 0 {
            return Err(crate::EngineError::Config("max_workers must be >= 1".to_string()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::low_resource().validate().is_ok());
        assert!(EngineConfig::high_performance().validate().is_ok());
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let mut config = EngineConfig::default();
        config.cache_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.max_workers = 0;
        assert!(config.validate().is_err());
    }
}
