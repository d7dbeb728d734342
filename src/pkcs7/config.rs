/// Tuning for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Starting size of the reverse buffer in bytes. It doubles whenever an
    /// element does not fit, so the default keeps the first allocation tiny.
    pub initial_capacity: usize,
}

impl GeneratorConfig {
    pub fn with_initial_capacity(initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 2,
        }
    }
}
