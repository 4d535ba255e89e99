use std::fmt;
use std::time::Duration;

/// Counters collected over one harvest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Categories found on the root page
    pub categories: usize,

    /// Categories replaced by an error marker
    pub categories_failed: usize,

    /// Groups visited
    pub groups: usize,

    /// Groups replaced by an error marker
    pub groups_failed: usize,

    /// Component leaves collected
    pub components: usize,

    /// Component blocks that could not be read
    pub block_failures: usize,

    pub elapsed: Duration,
}

impl HarvestStats {
    /// Total number of nodes that ended as error markers
    pub fn error_markers(&self) -> usize {
        self.categories_failed + self.groups_failed
    }

    /// Logs the summary at info level
    pub fn log(&self) {
        tracing::info!("Harvest complete: {}", self);
        if self.error_markers() > 0 {
            tracing::warn!(
                "{} nodes could not be harvested and hold error markers",
                self.error_markers()
            );
        }
    }
}

impl fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} categories ({} failed), {} groups ({} failed), {} components ({} blocks failed) in {:.1}s",
            self.categories,
            self.categories_failed,
            self.groups,
            self.groups_failed,
            self.components,
            self.block_failures,
            self.elapsed.as_secs_f64()
        )
    }
}
