//! Mapping from native event indices to positions in the compact
//! generator-particle list

use crate::error::PipelineError;

/// Native index → compact position map, filled in the same order as the
/// generator-particle list is written
#[derive(Clone, Debug, Default)]
pub struct IndexRemapper {
    positions: Vec<Option<usize>>,
}
//
impl IndexRemapper {
    /// Build an empty remapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every mapping, keeping the allocation for the next event
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Record that the particle at `native` was written at `position`
    pub fn insert(&mut self, native: usize, position: usize) {
        if native >= self.positions.len() {
            self.positions.resize(native + 1, None);
        }
        self.positions[native] = Some(position);
    }

    /// Compact position of a particle, if it was written out
    pub fn get(&self, native: usize) -> Option<usize> {
        self.positions.get(native).copied().flatten()
    }

    /// Compact position of a jet constituent
    ///
    /// A constituent that was never written out means the classifier let a
    /// clustering input bypass the generator list, which the record cannot
    /// represent: this is reported as a fatal pipeline error.
    ///
    pub fn resolve(&self, event: u64, tag: usize) -> Result<usize, PipelineError> {
        self.get(tag)
            .ok_or(PipelineError::UnmappedConstituent { event, tag })
    }
}
