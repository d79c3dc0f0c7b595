//! DDR5 Placeholder.
//!
//! The DDR5 timing model is not included in this build. Construction fails
//! fast with a named diagnostic: the scheduler must never run on a zeroed
//! timing table, so a missing model is a configuration error rather than a
//! degenerate simulation.

use crate::common::error::ConfigError;
use crate::memspec::{MemSpec, RawMemSpec};

/// Always fails: the DDR5 model is not included.
pub(crate) fn build(raw: &RawMemSpec) -> Result<MemSpec, ConfigError> {
    let _ = raw;
    Err(ConfigError::UnsupportedGeneration(
        "DDR5 model not included".to_string(),
    ))
}
