//! Fractal memory loop: experience → identity fragment → essence principle.
//!
//! Three bounded buffers. Appending to a full buffer first compresses its
//! whole contents into one record for the next buffer, then clears it and
//! stores the new record. The last buffer has nowhere to compress into and
//! evicts its oldest record instead.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{EssenceMode, MemoryConfig};
use crate::constants::ESSENCE_STATEMENT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub timestamp: String,
    pub content: String,
    pub role: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityFragment {
    pub timestamp: String,
    /// "Recent focus: <focus>..."
    pub content: String,
    /// Truncated content of the newest experience in the batch.
    pub focus: String,
    pub source_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EssencePrinciple {
    pub timestamp: String,
    pub content: String,
    pub weight: f64,
    pub source_count: usize,
}

/// FIFO with a fixed capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundedLoop<T> {
    capacity: usize,
    records: VecDeque<T>,
}

impl<T> BoundedLoop<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.records.iter()
    }

    fn take_all(&mut self) -> Vec<T> {
        self.records.drain(..).collect()
    }

    /// Append, evicting the oldest record when full. Returns true on eviction.
    fn push_evicting(&mut self, record: T) -> bool {
        let evicted = self.is_full() && self.records.pop_front().is_some();
        self.records.push_back(record);
        evicted
    }
}

/// Side effects of one experience insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Compression {
    pub identity_appended: bool,
    pub essence_appended: bool,
    pub essence_evicted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalLoops {
    pub experience: BoundedLoop<ExperienceRecord>,
    pub identity: BoundedLoop<IdentityFragment>,
    pub essence: BoundedLoop<EssencePrinciple>,
    summary_max_chars: usize,
    essence_mode: EssenceMode,
}

impl FractalLoops {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            experience: BoundedLoop::new(config.experience_capacity),
            identity: BoundedLoop::new(config.identity_capacity),
            essence: BoundedLoop::new(config.essence_capacity),
            summary_max_chars: config.identity_summary_max_chars,
            essence_mode: config.essence_mode,
        }
    }

    /// Record a raw experience stamped `now`.
    pub fn add_experience(&mut self, content: &str, role: &str, now: &str) -> Compression {
        let mut compression = Compression::default();
        if self.experience.is_full() {
            let batch = self.experience.take_all();
            compression = self.distill_to_identity(&batch, now);
        }
        // Cannot evict: the buffer was just emptied if it was full.
        self.experience.push_evicting(ExperienceRecord {
            timestamp: now.to_string(),
            content: content.to_string(),
            role: role.to_string(),
        });
        compression
    }

    fn distill_to_identity(&mut self, batch: &[ExperienceRecord], now: &str) -> Compression {
        let mut compression = Compression::default();
        let Some(last) = batch.last() else {
            return compression;
        };

        let focus: String = last.content.chars().take(self.summary_max_chars).collect();
        let fragment = IdentityFragment {
            timestamp: now.to_string(),
            content: format!("Recent focus: {focus}..."),
            focus,
            source_count: batch.len(),
        };
        tracing::debug!(source_count = batch.len(), "distilled identity fragment");

        if self.identity.is_full() {
            let fragments = self.identity.take_all();
            let principle = self.distill_to_essence(&fragments, now);
            tracing::info!(principle = %principle.content, "distilled essence principle");
            compression.essence_evicted = self.essence.push_evicting(principle);
            compression.essence_appended = true;
        }
        self.identity.push_evicting(fragment);
        compression.identity_appended = true;
        compression
    }

    fn distill_to_essence(&self, fragments: &[IdentityFragment], now: &str) -> EssencePrinciple {
        let content = match self.essence_mode {
            EssenceMode::Constant => ESSENCE_STATEMENT.to_string(),
            EssenceMode::Digest => {
                let focuses: Vec<&str> = fragments.iter().map(|f| f.focus.as_str()).collect();
                format!("Recurring focus: {}", focuses.join(" | "))
            }
        };
        EssencePrinciple {
            timestamp: now.to_string(),
            content,
            weight: 1.0,
            source_count: fragments.len(),
        }
    }
}
