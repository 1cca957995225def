//! Builder configuration.

/// Knobs for `NetworkBuilder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NetworkOptions {
    /// Ordering passes allowed per level (`None` means N² for N elements)
    pub max_sort_passes: Option<usize>,
    /// Re-insert process heat exchangers after their second side
    pub pair_heat_exchangers: bool,
    /// Collapse recycle sets onto a single outlet where possible
    pub reduce_recycles: bool,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            max_sort_passes: None,
            pair_heat_exchangers: true,
            reduce_recycles: true,
        }
    }
}
