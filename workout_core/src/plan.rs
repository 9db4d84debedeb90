//! Loading session plans from TOML files.

use crate::validation::validate_plan;
use crate::{Result, SessionPlan};
use std::path::Path;

impl SessionPlan {
    /// Parse and validate a plan file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let plan: SessionPlan = toml::from_str(&contents)?;
        validate_plan(&plan)?;
        tracing::debug!(
            "Loaded plan {} with {} exercises from {:?}",
            plan.id,
            plan.exercises.len(),
            path
        );
        Ok(plan)
    }
}
