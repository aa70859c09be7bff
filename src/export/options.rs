use crate::math::Vector3;
use crate::tessellation::LevelOfDetail;

/// Target schema flavour, which limits the item kinds that may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputProfile {
    /// IFC2x3: no triangulated face sets.
    Ifc2x3,
    /// Full IFC4.
    #[default]
    Ifc4,
    /// IFC4 reference view: extrusions and tessellations only.
    Ifc4ReferenceView,
}

impl OutputProfile {
    /// Whether faceted BReps may be written.
    #[must_use]
    pub fn allows_brep(self) -> bool {
        !matches!(self, Self::Ifc4ReferenceView)
    }

    /// Whether swept solids other than extrusions may be written.
    #[must_use]
    pub fn allows_advanced_sweeps(self) -> bool {
        !matches!(self, Self::Ifc4ReferenceView)
    }

    /// Whether the schema has triangulated face sets.
    #[must_use]
    pub fn has_triangulated_face_sets(self) -> bool {
        !matches!(self, Self::Ifc2x3)
    }
}

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Tessellation density for the BRep fallback.
    pub level_of_detail: LevelOfDetail,
    /// Triangle ceiling above which a tessellated solid is not sewn into a BRep.
    pub triangle_limit: usize,
    /// Try sweep analysis when no extrusion fits.
    pub export_sweeps: bool,
    /// Merge coplanar triangles into polygonal facets.
    pub merge_facets: bool,
    /// Turn rectangular through-holes into openings instead of profile holes.
    pub extract_openings: bool,
    /// Target schema flavour.
    pub output_profile: OutputProfile,
    /// Model units to output units.
    pub length_scale: f64,
    /// Precision written to the geometric context.
    pub precision: f64,
    /// Extrusion axes tried after caller hints.
    pub default_axes: Vec<Vector3>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            level_of_detail: LevelOfDetail::Default,
            triangle_limit: 50_000,
            export_sweeps: true,
            merge_facets: true,
            extract_openings: true,
            output_profile: OutputProfile::Ifc4,
            length_scale: 1.0,
            precision: 1e-5,
            default_axes: vec![Vector3::z(), Vector3::x(), Vector3::y()],
        }
    }
}

impl ExportOptions {
    /// Sets the tessellation level of detail.
    #[must_use]
    pub fn with_level_of_detail(mut self, level: LevelOfDetail) -> Self {
        self.level_of_detail = level;
        self
    }

    /// Sets the triangle ceiling.
    #[must_use]
    pub fn with_triangle_limit(mut self, limit: usize) -> Self {
        self.triangle_limit = limit;
        self
    }

    /// Enables or disables sweep analysis.
    #[must_use]
    pub fn with_sweeps(mut self, enabled: bool) -> Self {
        self.export_sweeps = enabled;
        self
    }

    /// Enables or disables facet merging.
    #[must_use]
    pub fn with_facet_merging(mut self, enabled: bool) -> Self {
        self.merge_facets = enabled;
        self
    }

    /// Enables or disables opening extraction.
    #[must_use]
    pub fn with_openings(mut self, enabled: bool) -> Self {
        self.extract_openings = enabled;
        self
    }

    /// Sets the output profile.
    #[must_use]
    pub fn with_output_profile(mut self, profile: OutputProfile) -> Self {
        self.output_profile = profile;
        self
    }

    /// Sets the length scale.
    #[must_use]
    pub fn with_length_scale(mut self, scale: f64) -> Self {
        self.length_scale = scale;
        self
    }

    /// Sets the context precision.
    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    /// Replaces the default axis set.
    #[must_use]
    pub fn with_default_axes(mut self, axes: Vec<Vector3>) -> Self {
        self.default_axes = axes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = ExportOptions::default();
        assert_eq!(o.triangle_limit, 50_000);
        assert_eq!(o.level_of_detail, LevelOfDetail::Default);
        assert!(o.export_sweeps && o.merge_facets && o.extract_openings);
        assert_eq!(o.default_axes.len(), 3);
    }

    #[test]
    fn reference_view_restrictions() {
        let rv = OutputProfile::Ifc4ReferenceView;
        assert!(!rv.allows_brep());
        assert!(!rv.allows_advanced_sweeps());
        assert!(rv.has_triangulated_face_sets());
        assert!(!OutputProfile::Ifc2x3.has_triangulated_face_sets());
    }

    #[test]
    fn builders_chain() {
        let o = ExportOptions::default()
            .with_level_of_detail(LevelOfDetail::Fine)
            .with_sweeps(false)
            .with_triangle_limit(10);
        assert_eq!(o.level_of_detail, LevelOfDetail::Fine);
        assert!(!o.export_sweeps);
        assert_eq!(o.triangle_limit, 10);
    }
}
