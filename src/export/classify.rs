use crate::geometry::CoordinateSystem;
use crate::math::{is_parallel, polygon_3d::polygon_area_3d, Vector3, TOLERANCE};
use crate::operations::transform::TransformedCopy;
use crate::tessellation::{LevelOfDetail, TessellateSolid, TessellationParams, TriangleMesh};
use crate::topology::{SolidId, SolidQuery, TopologyStore};

use super::brep::{BrepConversion, FacetedBody};
use super::error::{FallbackReason, StageResult};
use super::extrusion::{ExtrusionAnalysis, ExtrusionDescriptor};
use super::loops::planar_normal;
use super::session::ExportSession;
use super::sweep::{SweepAnalysis, SweepDescriptor};

/// Tier a solid was classified into, most compact first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BodyKind {
    Extrusion,
    Sweep,
    Brep,
    Tessellation,
}

/// Classified geometry of one solid.
#[derive(Debug, Clone)]
pub enum BodyGeometry {
    Extrusion(ExtrusionDescriptor),
    Sweep(SweepDescriptor),
    Brep(FacetedBody),
    Tessellation(TriangleMesh),
}

impl BodyGeometry {
    #[must_use]
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Extrusion(_) => BodyKind::Extrusion,
            Self::Sweep(_) => BodyKind::Sweep,
            Self::Brep(_) => BodyKind::Brep,
            Self::Tessellation(_) => BodyKind::Tessellation,
        }
    }
}

/// Classifies one solid.
///
/// Tried in order:
///
/// 1. With a local frame, a copy of the solid moved into that frame is
///    tested as an extrusion along local +Z. The copy is registered with the
///    session for release.
/// 2. Extrusion along each candidate axis: caller hints, the configured
///    default axes, then the normal of the largest planar face. Parallel
///    candidates are tried once.
/// 3. Sweep, when enabled and allowed by the output profile.
/// 4. Faceted BRep, when allowed by the output profile.
/// 5. A coarse triangle mesh without a triangle ceiling.
pub struct Classify<'a> {
    solid: SolidId,
    frame: Option<&'a CoordinateSystem>,
    axis_hints: &'a [Vector3],
}

impl<'a> Classify<'a> {
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            frame: None,
            axis_hints: &[],
        }
    }

    /// Tests the solid in `frame` first.
    #[must_use]
    pub fn with_frame(mut self, frame: &'a CoordinateSystem) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Extrusion axes to try before the defaults.
    #[must_use]
    pub fn with_axis_hints(mut self, hints: &'a [Vector3]) -> Self {
        self.axis_hints = hints;
        self
    }

    /// Runs the classification.
    ///
    /// # Errors
    ///
    /// Returns a kernel error if even the coarse tessellation fails.
    pub fn execute(
        &self,
        session: &mut ExportSession,
        store: &mut TopologyStore,
    ) -> StageResult<BodyGeometry> {
        if let Some(frame) = self.frame {
            let local = TransformedCopy::new(self.solid, frame.to_local()).execute(store)?;
            session.register_temporary(local);
            match ExtrusionAnalysis::new(local, Vector3::z())
                .with_options(session.options())
                .with_placement(frame)
                .execute(store)
            {
                Ok(descriptor) => {
                    tracing::debug!(length = descriptor.length, "Extrusion in local frame");
                    return Ok(BodyGeometry::Extrusion(descriptor));
                }
                Err(reason) => tracing::debug!(%reason, "No extrusion in local frame"),
            }
        }

        let store: &TopologyStore = store;
        let options = session.options();
        for axis in self.candidate_axes(store, &options.default_axes)? {
            match ExtrusionAnalysis::new(self.solid, axis)
                .with_options(options)
                .execute(store)
            {
                Ok(descriptor) => {
                    tracing::debug!(?axis, length = descriptor.length, "Extrusion");
                    return Ok(BodyGeometry::Extrusion(descriptor));
                }
                Err(reason @ FallbackReason::Kernel(_)) => return Err(reason),
                Err(reason) => tracing::debug!(?axis, %reason, "Axis rejected"),
            }
        }

        match self.sweep(store, session) {
            Ok(descriptor) => return Ok(BodyGeometry::Sweep(descriptor)),
            Err(reason) => tracing::debug!(%reason, "No sweep"),
        }

        if options.output_profile.allows_brep() {
            match BrepConversion::new(self.solid).with_options(options).execute(store) {
                Ok(body) => {
                    tracing::debug!(faces = body.face_count(), "Faceted BRep");
                    return Ok(BodyGeometry::Brep(body));
                }
                Err(reason) => tracing::debug!(%reason, "No BRep"),
            }
        } else {
            tracing::debug!(
                reason = %FallbackReason::DisallowedByProfile("faceted BReps"),
                "No BRep"
            );
        }

        let params = TessellationParams::for_level(LevelOfDetail::Coarse);
        let mesh = TessellateSolid::new(self.solid, params).execute(store)?;
        tracing::debug!(triangles = mesh.triangle_count(), "Coarse tessellation");
        Ok(BodyGeometry::Tessellation(mesh))
    }

    fn sweep(&self, store: &TopologyStore, session: &ExportSession) -> StageResult<SweepDescriptor> {
        let options = session.options();
        if !options.export_sweeps {
            return Err(FallbackReason::SweepsDisabled);
        }
        if !options.output_profile.allows_advanced_sweeps() {
            return Err(FallbackReason::DisallowedByProfile("swept area solids"));
        }
        SweepAnalysis::new(self.solid).execute(store)
    }

    fn candidate_axes(&self, store: &TopologyStore, defaults: &[Vector3]) -> StageResult<Vec<Vector3>> {
        let mut candidates: Vec<Vector3> = self.axis_hints.iter().chain(defaults).copied().collect();
        if let Some(normal) = largest_planar_normal(store, self.solid)? {
            candidates.push(normal);
        }

        let mut axes: Vec<Vector3> = Vec::with_capacity(candidates.len());
        for c in candidates {
            let len = c.norm();
            if len < TOLERANCE {
                continue;
            }
            let unit = c / len;
            if !axes.iter().any(|a| is_parallel(a, &unit)) {
                axes.push(unit);
            }
        }
        if axes.is_empty() {
            return Err(FallbackReason::NoExtrusionAxis);
        }
        Ok(axes)
    }
}

fn largest_planar_normal(store: &TopologyStore, solid: SolidId) -> StageResult<Option<Vector3>> {
    let mut best: Option<(f64, Vector3)> = None;
    for face_id in store.faces(solid)? {
        let face = store.face(face_id)?;
        let Some(normal) = planar_normal(face) else {
            continue;
        };
        let area = polygon_area_3d(&store.wire_points(face.outer_wire)?, &normal);
        if best.map_or(true, |(a, _)| area > a) {
            best = Some((area, normal));
        }
    }
    Ok(best.map(|(_, n)| n))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point2, Point3};
    use crate::operations::creation::{MakeBox, MakeCylinder};
    use crate::operations::shaping::{PathSegment, Sweep};
    use crate::export::options::{ExportOptions, OutputProfile};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(-0.5, -0.5),
            Point2::new(0.5, -0.5),
            Point2::new(0.5, 0.5),
            Point2::new(-0.5, 0.5),
        ]
    }

    fn classify(options: ExportOptions, store: &mut TopologyStore, solid: SolidId) -> BodyGeometry {
        let mut session = ExportSession::new(options);
        let geometry = Classify::new(solid).execute(&mut session, store).unwrap();
        session.release_temporaries(store);
        geometry
    }

    // ── Extrusions ─────────────────────────────────────────────

    #[test]
    fn box_is_an_extrusion() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 1.0, 3.0))
            .execute(&mut store)
            .unwrap();
        let BodyGeometry::Extrusion(d) = classify(ExportOptions::default(), &mut store, solid) else {
            panic!("expected extrusion");
        };
        assert!((d.length - 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn horizontal_cylinder_uses_a_later_axis() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(p(0.0, 0.0, 0.0), 0.5, Vector3::y(), 4.0)
            .execute(&mut store)
            .unwrap();
        let BodyGeometry::Extrusion(d) = classify(ExportOptions::default(), &mut store, solid) else {
            panic!("expected extrusion");
        };
        assert!(is_parallel(&d.direction, &Vector3::y()));
    }

    #[test]
    fn tilted_box_found_through_its_largest_face() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(4.0, 3.0, 0.5))
            .execute(&mut store)
            .unwrap();
        let rot = nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), 0.3).to_homogeneous();
        let tilted = TransformedCopy::new(solid, rot).execute(&mut store).unwrap();
        let options = ExportOptions::default().with_default_axes(vec![Vector3::z()]);
        let BodyGeometry::Extrusion(d) = classify(options, &mut store, tilted) else {
            panic!("expected extrusion");
        };
        assert!((d.length - 0.5).abs() < 1e-9);
    }

    #[test]
    fn local_frame_gives_placement() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 2.0))
            .execute(&mut store)
            .unwrap();
        let frame = CoordinateSystem::new(p(5.0, 0.0, 0.0), Vector3::z(), Vector3::y()).unwrap();
        let mut session = ExportSession::new(ExportOptions::default());
        let solids_before = store.solid_count();
        let geometry = Classify::new(solid)
            .with_frame(&frame)
            .execute(&mut session, &mut store)
            .unwrap();
        let BodyGeometry::Extrusion(d) = geometry else {
            panic!("expected extrusion");
        };
        assert_eq!(d.placement, Some(frame));
        assert_eq!(session.temporary_count(), 1);
        session.release_temporaries(&mut store);
        assert_eq!(store.solid_count(), solids_before);
    }

    // ── Fallbacks ──────────────────────────────────────────────

    #[test]
    fn bent_sweep_is_a_sweep_unless_disabled() {
        let mut store = TopologyStore::new();
        let path = vec![
            PathSegment::Line { end: p(5.0, 0.0, 0.0) },
            PathSegment::Arc {
                center: p(5.0, 5.0, 0.0),
                axis: Vector3::z(),
                angle: FRAC_PI_2,
            },
        ];
        let solid = Sweep::new(square(), Point3::origin(), path)
            .execute(&mut store)
            .unwrap();
        assert_eq!(classify(ExportOptions::default(), &mut store, solid).kind(), BodyKind::Sweep);
        let off = ExportOptions::default().with_sweeps(false);
        assert_eq!(classify(off, &mut store, solid).kind(), BodyKind::Brep);
        let rv = ExportOptions::default().with_output_profile(OutputProfile::Ifc4ReferenceView);
        assert_eq!(classify(rv, &mut store, solid).kind(), BodyKind::Tessellation);
    }

    #[test]
    fn helix_sweep_falls_back_to_brep() {
        let mut store = TopologyStore::new();
        let path = vec![PathSegment::Helix {
            center: p(0.0, 0.0, 0.0),
            axis: Vector3::z(),
            angle: PI,
            rise: 2.0,
        }];
        let solid = Sweep::new(square(), p(3.0, 0.0, 0.0), path)
            .execute(&mut store)
            .unwrap();
        let kind = classify(ExportOptions::default(), &mut store, solid).kind();
        assert_eq!(kind, BodyKind::Brep);
    }

    #[test]
    fn triangle_ceiling_forces_tessellation() {
        let mut store = TopologyStore::new();
        let path = vec![PathSegment::Helix {
            center: p(0.0, 0.0, 0.0),
            axis: Vector3::z(),
            angle: PI,
            rise: 2.0,
        }];
        let solid = Sweep::new(square(), p(3.0, 0.0, 0.0), path)
            .execute(&mut store)
            .unwrap();
        let options = ExportOptions::default().with_triangle_limit(10);
        let kind = classify(options, &mut store, solid).kind();
        assert_eq!(kind, BodyKind::Tessellation);
    }
}
