use std::collections::HashMap;

use crate::geometry::CoordinateSystem;
use crate::topology::{SolidId, TopologyStore};

use super::mapping::ParameterMapping;
use super::options::ExportOptions;

/// Identifier of a geometric representation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

/// Identifier of an emitted shape representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepresentationId(pub u64);

/// Host identity of a shared symbol geometry (a family type, a block).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryKey(pub u64);

/// The model context every body representation refers to.
#[derive(Debug, Clone)]
pub struct GeometricContext {
    pub id: ContextId,
    pub coordinate_system: CoordinateSystem,
    pub precision: f64,
    pub unit_scale: f64,
}

/// Counters for one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub elements: usize,
    pub representations: usize,
    pub skipped_elements: usize,
    pub skipped_solids: usize,
    pub extrusions: usize,
    pub sweeps: usize,
    pub breps: usize,
    pub tessellations: usize,
    pub mapped: usize,
}

/// State shared by every element of one export run.
///
/// Holds the options, the parameter mapping table, the shared context, the
/// symbol cache, and the temporary solids created while classifying the
/// current element.
#[derive(Debug)]
pub struct ExportSession {
    options: ExportOptions,
    mapping: ParameterMapping,
    context: GeometricContext,
    symbols: HashMap<GeometryKey, RepresentationId>,
    temporaries: Vec<SolidId>,
    stats: ExportStats,
    next_id: u64,
}

impl ExportSession {
    /// Creates a session with an empty mapping table and a world context.
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        let context = GeometricContext {
            id: ContextId(1),
            coordinate_system: CoordinateSystem::world(),
            precision: options.precision,
            unit_scale: options.length_scale,
        };
        Self {
            options,
            mapping: ParameterMapping::default(),
            context,
            symbols: HashMap::new(),
            temporaries: Vec::new(),
            stats: ExportStats::default(),
            next_id: 1,
        }
    }

    /// Replaces the parameter mapping table.
    #[must_use]
    pub fn with_mapping(mut self, mapping: ParameterMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Places the shared context at `coordinate_system`.
    #[must_use]
    pub fn with_context_placement(mut self, coordinate_system: CoordinateSystem) -> Self {
        self.context.coordinate_system = coordinate_system;
        self
    }

    #[must_use]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    #[must_use]
    pub fn mapping(&self) -> &ParameterMapping {
        &self.mapping
    }

    #[must_use]
    pub fn context(&self) -> &GeometricContext {
        &self.context
    }

    #[must_use]
    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ExportStats {
        &mut self.stats
    }

    pub(crate) fn next_representation_id(&mut self) -> RepresentationId {
        let id = RepresentationId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Representation already emitted for a symbol.
    #[must_use]
    pub fn cached_symbol(&self, key: GeometryKey) -> Option<RepresentationId> {
        self.symbols.get(&key).copied()
    }

    /// Remembers the representation emitted for a symbol. The first entry wins.
    pub fn cache_symbol(&mut self, key: GeometryKey, id: RepresentationId) {
        self.symbols.entry(key).or_insert(id);
    }

    /// Records a solid created during classification so it can be released.
    pub fn register_temporary(&mut self, solid: SolidId) {
        self.temporaries.push(solid);
    }

    /// Number of temporaries awaiting release.
    #[must_use]
    pub fn temporary_count(&self) -> usize {
        self.temporaries.len()
    }

    /// Removes every registered temporary solid from `store`.
    ///
    /// Solids already gone are skipped with a debug log.
    pub fn release_temporaries(&mut self, store: &mut TopologyStore) {
        for solid in self.temporaries.drain(..) {
            if let Err(err) = store.remove_solid(solid) {
                tracing::debug!(error = %err, "Temporary solid already released");
            }
        }
    }

    /// Clears the symbol cache, counters and id sequence for a new run.
    ///
    /// Temporaries still registered are forgotten, not removed; release them
    /// first.
    pub fn reset(&mut self) {
        if !self.temporaries.is_empty() {
            tracing::warn!(count = self.temporaries.len(), "Reset with unreleased temporaries");
            self.temporaries.clear();
        }
        self.symbols.clear();
        self.stats = ExportStats::default();
        self.next_id = 1;
    }
}
