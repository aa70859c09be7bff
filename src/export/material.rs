use crate::error::Result;
use crate::topology::{MaterialId, MeshId, SolidId, SolidQuery, TopologyStore};

use super::mapping::ParameterMapping;

/// Parameters consulted, in order, when the geometry carries no material.
pub const MATERIAL_PARAMETERS: [&str; 2] = ["Structural Material", "Material"];

/// Outcome of material resolution for a group of geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedMaterial {
    /// Every tagged face or triangle carries this material.
    Single(MaterialId),
    /// More than one material appears; `dominant` has the highest count.
    /// Exported as no material.
    Mixed { dominant: MaterialId },
    /// Nothing is tagged.
    None,
}

impl ResolvedMaterial {
    /// The material to write, if any.
    #[must_use]
    pub fn material(self) -> Option<MaterialId> {
        match self {
            Self::Single(id) => Some(id),
            Self::Mixed { .. } | Self::None => None,
        }
    }
}

/// Per-material counts in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MaterialTally {
    counts: Vec<(MaterialId, usize)>,
}

impl MaterialTally {
    /// Counts one tag. Untagged entries are ignored.
    pub fn add(&mut self, material: Option<MaterialId>) {
        let Some(material) = material else {
            return;
        };
        if let Some(entry) = self.counts.iter_mut().find(|(m, _)| *m == material) {
            entry.1 += 1;
        } else {
            self.counts.push((material, 1));
        }
    }

    /// Resolves the tally. Ties go to the material seen first.
    #[must_use]
    pub fn resolve(&self) -> ResolvedMaterial {
        let Some(&(first, first_count)) = self.counts.first() else {
            return ResolvedMaterial::None;
        };
        let (dominant, _) = self
            .counts
            .iter()
            .skip(1)
            .fold((first, first_count), |best, &(m, c)| if c > best.1 { (m, c) } else { best });
        if self.counts.len() == 1 {
            ResolvedMaterial::Single(dominant)
        } else {
            ResolvedMaterial::Mixed { dominant }
        }
    }
}

/// Tallies mesh triangles first, then solid faces.
///
/// # Errors
///
/// Returns an error if a solid or mesh is missing from the store.
pub fn resolve_geometry(
    store: &TopologyStore,
    solids: &[SolidId],
    meshes: &[MeshId],
) -> Result<ResolvedMaterial> {
    let mut tally = MaterialTally::default();
    for &mesh in meshes {
        for &m in &store.mesh(mesh)?.mesh.materials {
            tally.add(m);
        }
    }
    for &solid in solids {
        for face in store.faces(solid)? {
            tally.add(store.face(face)?.material);
        }
    }
    Ok(tally.resolve())
}

/// Looks up a material through the element's declared parameters, trying
/// each name in [`MATERIAL_PARAMETERS`] after translating it through the
/// mapping table.
pub fn resolve_parameter<F>(mapping: &ParameterMapping, category: &str, lookup: F) -> Option<MaterialId>
where
    F: Fn(&str) -> Option<MaterialId>,
{
    MATERIAL_PARAMETERS.iter().find_map(|&name| {
        let mapped = mapping.translate(category, name).unwrap_or(name);
        lookup(mapped)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeFace, MakeWire};
    use crate::operations::shaping::Extrude;
    use crate::tessellation::TriangleMesh;
    use crate::topology::MeshData;

    const A: MaterialId = MaterialId(1);
    const B: MaterialId = MaterialId(2);

    #[test]
    fn untagged_faces_do_not_count() {
        let mut tally = MaterialTally::default();
        for _ in 0..5 {
            tally.add(Some(A));
        }
        tally.add(None);
        assert_eq!(tally.resolve(), ResolvedMaterial::Single(A));
    }

    #[test]
    fn any_second_material_makes_it_mixed() {
        let mut tally = MaterialTally::default();
        for _ in 0..5 {
            tally.add(Some(A));
        }
        tally.add(Some(B));
        let resolved = tally.resolve();
        assert_eq!(resolved, ResolvedMaterial::Mixed { dominant: A });
        assert_eq!(resolved.material(), None);
    }

    #[test]
    fn tie_goes_to_first_seen() {
        let mut tally = MaterialTally::default();
        tally.add(Some(B));
        tally.add(Some(A));
        assert_eq!(tally.resolve(), ResolvedMaterial::Mixed { dominant: B });
    }

    fn tagged_box(store: &mut TopologyStore, material: MaterialId) -> SolidId {
        let square = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let wire = MakeWire::new(square, true).execute(store).unwrap();
        let face = MakeFace::new(wire, vec![])
            .with_material(material)
            .execute(store)
            .unwrap();
        Extrude::new(face, Vector3::z()).execute(store).unwrap()
    }

    fn tagged_mesh(store: &mut TopologyStore, material: MaterialId, triangles: u32) -> MeshId {
        let mut mesh = TriangleMesh::default();
        for i in 0..triangles {
            let z = f64::from(i);
            mesh.push_triangle(
                [Point3::new(0.0, 0.0, z), Point3::new(1.0, 0.0, z), Point3::new(0.0, 1.0, z)],
                Some(material),
            );
        }
        store.add_mesh(MeshData::new(mesh))
    }

    #[test]
    fn mesh_triangles_are_counted_before_solid_faces() {
        let mut store = TopologyStore::new();
        // Six faces against six triangles: the tie goes to the mesh.
        let solid = tagged_box(&mut store, A);
        let mesh = tagged_mesh(&mut store, B, 6);
        let resolved = resolve_geometry(&store, &[solid], &[mesh]).unwrap();
        assert_eq!(resolved, ResolvedMaterial::Mixed { dominant: B });

        let solid = tagged_box(&mut store, B);
        let mesh = tagged_mesh(&mut store, A, 6);
        let resolved = resolve_geometry(&store, &[solid], &[mesh]).unwrap();
        assert_eq!(resolved, ResolvedMaterial::Mixed { dominant: A });
    }

    #[test]
    fn parameter_fallback_uses_mapping() {
        let mapping = ParameterMapping::parse("Walls\tStructural Material\tTragwerk\n");
        let found = resolve_parameter(&mapping, "Walls", |name| (name == "Tragwerk").then_some(A));
        assert_eq!(found, Some(A));
        let plain = resolve_parameter(&ParameterMapping::default(), "Walls", |name| {
            (name == "Material").then_some(B)
        });
        assert_eq!(plain, Some(B));
    }
}
