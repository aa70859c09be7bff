use crate::error::{OperationError, Result};
use crate::geometry::curve::Line;
use crate::geometry::surface::Cylinder;
use crate::math::{is_parallel, Matrix4, Vector3, TOLERANCE};
use crate::operations::creation::{MakeFace, MakeSolid};
use crate::topology::{
    EdgeCurve, EdgeData, FaceId, FaceSurface, MaterialId, ShellData, SolidId, TopologyStore,
};

use super::profile::{
    add_ring, add_side_face, loop_normal, read_loop, reverse_loop, ring_wire, LoopEdge, Ring,
};

/// Extrudes a face along a direction vector to create a solid.
///
/// The face may have holes and arc edges. Caps and sides share their edges,
/// so the result is a closed shell whose side faces are planes (line edges),
/// cylinders (arcs whose axis follows the direction) or ruled surfaces.
pub struct Extrude {
    face: FaceId,
    direction: Vector3,
}

impl Extrude {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(face: FaceId, direction: Vector3) -> Self {
        Self { face, direction }
    }

    /// Executes the extrusion, creating the solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the direction is zero-length
    /// or lies in the plane of the face.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if self.direction.norm() < TOLERANCE {
            return Err(
                OperationError::InvalidInput("extrude direction must be non-zero".into()).into(),
            );
        }

        let face = store.face(self.face)?;
        let material = face.material;
        let inner_wires = face.inner_wires.clone();
        let outer = read_loop(store, face.outer_wire)?;

        // Outer loop counter-clockwise about the direction, holes clockwise.
        let normal = loop_normal(&outer)?;
        if normal.dot(&self.direction).abs() < TOLERANCE {
            return Err(OperationError::InvalidInput(
                "extrude direction lies in the profile plane".into(),
            )
            .into());
        }
        let mut loops = vec![orient(outer, normal.dot(&self.direction) > 0.0)];
        for wire in inner_wires {
            let hole = read_loop(store, wire)?;
            let hole_normal = loop_normal(&hole)?;
            loops.push(orient(hole, hole_normal.dot(&self.direction) < 0.0));
        }

        let shift = Matrix4::new_translation(&self.direction);
        let mut bottoms = Vec::with_capacity(loops.len());
        let mut tops = Vec::with_capacity(loops.len());
        let mut faces = Vec::new();
        for profile in &loops {
            let bottom = add_ring(store, profile, &Matrix4::identity())?;
            let top = add_ring(store, profile, &shift)?;
            faces.extend(self.side_faces(store, profile, &bottom, &top, material)?);
            bottoms.push(bottom);
            tops.push(top);
        }

        let bottom_face = cap_face(store, &bottoms, true, material)?;
        let top_face = cap_face(store, &tops, false, material)?;
        faces.insert(0, top_face);
        faces.insert(0, bottom_face);

        let shell = store.add_shell(ShellData {
            faces,
            is_closed: true,
        });
        MakeSolid::new(shell, vec![]).execute(store)
    }

    fn side_faces(
        &self,
        store: &mut TopologyStore,
        profile: &[LoopEdge],
        bottom: &Ring,
        top: &Ring,
        material: Option<MaterialId>,
    ) -> Result<Vec<FaceId>> {
        let mut rungs = Vec::with_capacity(profile.len());
        for (&from, &to) in bottom.vertices.iter().zip(&top.vertices) {
            let start = store.vertex(from)?.point;
            let end = store.vertex(to)?.point;
            let (line, length) = Line::between(start, end)?;
            rungs.push(store.add_edge(EdgeData {
                start: from,
                end: to,
                curve: EdgeCurve::Line(line),
                t_start: 0.0,
                t_end: length,
            }));
        }

        let mut faces = Vec::with_capacity(profile.len());
        for (k, edge) in profile.iter().enumerate() {
            let surface = match &edge.curve {
                EdgeCurve::Line(_) => None,
                EdgeCurve::Arc(arc) if is_parallel(arc.normal(), &self.direction.normalize()) => {
                    Some(FaceSurface::Cylinder(Cylinder::new(
                        *arc.center(),
                        arc.radius(),
                        *arc.normal(),
                        *arc.ref_dir(),
                    )?))
                }
                _ => Some(FaceSurface::Ruled),
            };
            faces.push(add_side_face(store, bottom, top, &rungs, k, surface, material)?);
        }
        Ok(faces)
    }
}

fn orient(edges: Vec<LoopEdge>, keep: bool) -> Vec<LoopEdge> {
    if keep {
        edges
    } else {
        reverse_loop(&edges)
    }
}

/// Cap over the first ring with the remaining rings as holes.
fn cap_face(
    store: &mut TopologyStore,
    rings: &[Ring],
    reversed: bool,
    material: Option<MaterialId>,
) -> Result<FaceId> {
    let wires: Vec<_> = rings.iter().map(|r| ring_wire(store, r, reversed)).collect();
    let mut make = MakeFace::new(wires[0], wires[1..].to_vec());
    if let Some(material) = material {
        make = make.with_material(material);
    }
    make.execute(store)
}
