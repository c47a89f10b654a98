//! Registry configuration

/// Tuning knobs for an [`Edm`](crate::Edm) registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmConfig {
    /// Longest base-type or container-extension chain accepted
    pub max_inheritance_depth: usize,
    /// Load a whole container with one provider call on first child lookup
    pub bulk_load_containers: bool,
}

impl Default for EdmConfig {
    fn default() -> Self {
        Self {
            max_inheritance_depth: 64,
            bulk_load_containers: false,
        }
    }
}

impl EdmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_inheritance_depth(mut self, depth: usize) -> Self {
        self.max_inheritance_depth = depth;
        self
    }

    pub fn with_bulk_load_containers(mut self, bulk: bool) -> Self {
        self.bulk_load_containers = bulk;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EdmConfig::default();
        assert_eq!(config.max_inheritance_depth, 64);
        assert!(!config.bulk_load_containers);
    }

    #[test]
    fn test_builder() {
        let config = EdmConfig::new()
            .with_max_inheritance_depth(4)
            .with_bulk_load_containers(true);
        assert_eq!(config.max_inheritance_depth, 4);
        assert!(config.bulk_load_containers);
    }
}
