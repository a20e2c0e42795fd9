//! Tree and mutation engine configuration.

use serde::{Deserialize, Serialize};

/// Settings for the mutation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum length of a node label, in characters, after trimming.
    #[serde(default = "default_max_label_length")]
    pub max_label_length: usize,
    /// Capacity of the domain event broadcast channel.
    #[serde(default = "default_events_capacity")]
    pub events_capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_label_length: default_max_label_length(),
            events_capacity: default_events_capacity(),
        }
    }
}

fn default_max_label_length() -> usize {
    255
}

fn default_events_capacity() -> usize {
    256
}
