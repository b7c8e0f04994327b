//! Response parser chain configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{OcmError, Result};
use crate::llm::parser::ParserStage;

/// Which parser stages run, in preference order.
///
/// ```toml
/// [parser]
/// stages = ["structured", "pattern"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserConfig {
    #[serde(default = "default_stages")]
    pub stages: Vec<ParserStage>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(OcmError::Config(
                "parser.stages must name at least one stage".into(),
            ));
        }
        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(*stage) {
                return Err(OcmError::Config(format!(
                    "parser.stages lists '{}' more than once",
                    stage.name()
                )));
            }
        }
        Ok(())
    }
}

fn default_stages() -> Vec<ParserStage> {
    vec![
        ParserStage::Structured,
        ParserStage::Permissive,
        ParserStage::Pattern,
    ]
}
