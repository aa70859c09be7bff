use std::collections::HashMap;

use crate::geometry::CoordinateSystem;
use crate::math::{Matrix4, Vector3};
use crate::tessellation::{LevelOfDetail, TessellateSolid, TessellationParams, TriangleMesh};
use crate::topology::{MaterialId, MeshId, SolidId, TopologyStore};

use super::brep::{brep_from_mesh, faceted_from_mesh, FacetedBody};
use super::classify::{BodyGeometry, Classify};
use super::error::{FallbackReason, StageResult};
use super::material::{resolve_geometry, resolve_parameter, ResolvedMaterial};
use super::options::ExportOptions;
use super::representation::{assemble, ItemGeometry, RepresentationItem, ShapeRepresentation};
use super::session::{ExportSession, GeometryKey};

/// A host parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Text(String),
    Number(f64),
    Material(MaterialId),
}

/// A placed instance of shared symbol geometry.
#[derive(Debug, Clone)]
pub struct SymbolInstance {
    pub key: GeometryKey,
    /// Symbol space to element space.
    pub transform: Matrix4,
}

/// Body geometry of one host element.
#[derive(Debug, Clone, Default)]
pub struct BodyElement {
    pub category: String,
    pub solids: Vec<SolidId>,
    pub meshes: Vec<MeshId>,
    /// Local placement; used for single-solid elements.
    pub local_frame: Option<CoordinateSystem>,
    pub axis_hints: Vec<Vector3>,
    pub symbol: Option<SymbolInstance>,
    pub parameters: HashMap<String, ParameterValue>,
}

impl BodyElement {
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_solid(mut self, solid: SolidId) -> Self {
        self.solids.push(solid);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.meshes.push(mesh);
        self
    }

    #[must_use]
    pub fn with_local_frame(mut self, frame: CoordinateSystem) -> Self {
        self.local_frame = Some(frame);
        self
    }

    #[must_use]
    pub fn with_axis_hint(mut self, axis: Vector3) -> Self {
        self.axis_hints.push(axis);
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, key: GeometryKey, transform: Matrix4) -> Self {
        self.symbol = Some(SymbolInstance { key, transform });
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    fn material_parameter(&self, name: &str) -> Option<MaterialId> {
        match self.parameters.get(name) {
            Some(ParameterValue::Material(id)) => Some(*id),
            _ => None,
        }
    }
}

/// Exports the body of one element.
///
/// A symbol already emitted in this session gives a mapped representation.
/// Otherwise each solid is classified on its own and each mesh becomes a
/// BRep when closed and within the triangle ceiling, or a tessellation
/// otherwise. A group that ends up mixing mesh-tier items with anything
/// else is re-emitted entirely at the mesh tier. Temporaries created on the
/// way are released before returning, on success and on failure.
///
/// # Errors
///
/// Returns [`FallbackReason::NothingToExport`] when no item survives, or a
/// kernel error for a malformed store.
pub fn export_body(
    session: &mut ExportSession,
    store: &mut TopologyStore,
    element: &BodyElement,
) -> StageResult<ShapeRepresentation> {
    session.stats_mut().elements += 1;
    let result = build(session, store, element);
    session.release_temporaries(store);
    if result.is_err() {
        session.stats_mut().skipped_elements += 1;
    }
    result
}

/// Exports many elements, skipping and logging the ones that fail.
///
/// Each returned representation is paired with the index of its element.
pub fn export_bodies(
    session: &mut ExportSession,
    store: &mut TopologyStore,
    elements: &[BodyElement],
) -> Vec<(usize, ShapeRepresentation)> {
    let mut out = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        match export_body(session, store, element) {
            Ok(rep) => out.push((i, rep)),
            Err(reason) => {
                tracing::warn!(element = i, category = %element.category, %reason, "Skipping element body");
            }
        }
    }
    let stats = session.stats();
    tracing::info!(
        elements = stats.elements,
        representations = stats.representations,
        skipped = stats.skipped_elements,
        extrusions = stats.extrusions,
        sweeps = stats.sweeps,
        breps = stats.breps,
        tessellations = stats.tessellations,
        mapped = stats.mapped,
        "Body export finished"
    );
    out
}

fn build(
    session: &mut ExportSession,
    store: &mut TopologyStore,
    element: &BodyElement,
) -> StageResult<ShapeRepresentation> {
    let material = resolve_material(session, store, element)?;

    if let Some(symbol) = &element.symbol {
        if let Some(source) = session.cached_symbol(symbol.key) {
            let item = RepresentationItem {
                geometry: ItemGeometry::MappedItem {
                    source,
                    transform: symbol.transform,
                },
                material: None,
            };
            let rep = assemble(session, vec![item], material)?;
            session.stats_mut().mapped += 1;
            tracing::debug!(key = symbol.key.0, source = source.0, "Reusing symbol body");
            return Ok(rep);
        }
    }

    if element.solids.is_empty() && element.meshes.is_empty() {
        return Err(FallbackReason::NothingToExport);
    }

    let frame = match (element.solids.as_slice(), element.meshes.is_empty()) {
        ([_], true) => element.local_frame.as_ref(),
        _ => None,
    };

    let mut items = Vec::with_capacity(element.solids.len() + element.meshes.len());
    for &solid in &element.solids {
        let mut classify = Classify::new(solid).with_axis_hints(&element.axis_hints);
        if let Some(frame) = frame {
            classify = classify.with_frame(frame);
        }
        match classify.execute(session, store) {
            Ok(geometry) => {
                let material = resolve_geometry(store, &[solid], &[])?.material();
                items.push(Source::Solid(geometry, material));
            }
            Err(reason) => {
                session.stats_mut().skipped_solids += 1;
                tracing::warn!(%reason, "Skipping solid");
            }
        }
    }
    for &mesh_id in &element.meshes {
        let mesh = store.mesh(mesh_id)?.mesh.clone();
        if mesh.is_empty() {
            tracing::warn!("Skipping empty mesh");
            continue;
        }
        let material = resolve_geometry(store, &[], &[mesh_id])?.material();
        items.push(Source::Mesh(mesh, material));
    }
    if items.is_empty() {
        return Err(FallbackReason::NothingToExport);
    }

    let options = session.options().clone();
    let mut items: Vec<RepresentationItem> = items
        .into_iter()
        .map(|source| source.into_item(&options))
        .collect();

    let tessellated = items.iter().filter(|i| i.geometry.kind().is_tessellated()).count();
    if tessellated > 0 && tessellated < items.len() {
        tracing::debug!(items = items.len(), "Mixed group re-emitted as tessellation");
        items = homogenize(store, element, &options)?;
    }

    for item in &items {
        let stats = session.stats_mut();
        match &item.geometry {
            ItemGeometry::ExtrudedAreaSolid(_) => stats.extrusions += 1,
            ItemGeometry::SweptAreaSolid(_) => stats.sweeps += 1,
            ItemGeometry::FacetedBrep(_) => stats.breps += 1,
            ItemGeometry::ShellBasedSurfaceModel(_) | ItemGeometry::TriangulatedFaceSet(_) => {
                stats.tessellations += 1;
            }
            ItemGeometry::MappedItem { .. } => stats.mapped += 1,
        }
    }

    let rep = assemble(session, items, material)?;
    if let Some(symbol) = &element.symbol {
        session.cache_symbol(symbol.key, rep.id);
    }
    tracing::debug!(rep_type = %rep.rep_type, items = rep.items.len(), "Body representation");
    Ok(rep)
}

/// Geometry-derived material, else the declared parameter.
fn resolve_material(
    session: &ExportSession,
    store: &TopologyStore,
    element: &BodyElement,
) -> StageResult<ResolvedMaterial> {
    let resolved = resolve_geometry(store, &element.solids, &element.meshes)?;
    if resolved != ResolvedMaterial::None {
        return Ok(resolved);
    }
    Ok(
        resolve_parameter(session.mapping(), &element.category, |name| element.material_parameter(name))
            .map_or(ResolvedMaterial::None, ResolvedMaterial::Single),
    )
}

enum Source {
    Solid(BodyGeometry, Option<MaterialId>),
    Mesh(TriangleMesh, Option<MaterialId>),
}

impl Source {
    fn into_item(self, options: &ExportOptions) -> RepresentationItem {
        let (geometry, material) = match self {
            Self::Solid(geometry, material) => {
                let geometry = match geometry {
                    BodyGeometry::Extrusion(d) => ItemGeometry::ExtrudedAreaSolid(d),
                    BodyGeometry::Sweep(d) => ItemGeometry::SweptAreaSolid(d),
                    BodyGeometry::Brep(b) => ItemGeometry::FacetedBrep(b),
                    BodyGeometry::Tessellation(mesh) => mesh_tier(mesh, options),
                };
                (geometry, material)
            }
            Self::Mesh(mesh, material) => {
                let geometry = match mesh_brep(&mesh, options) {
                    Ok(body) => ItemGeometry::FacetedBrep(body),
                    Err(reason) => {
                        tracing::debug!(%reason, "Mesh kept as tessellation");
                        mesh_tier(mesh, options)
                    }
                };
                (geometry, material)
            }
        };
        RepresentationItem { geometry, material }
    }
}

/// A host mesh as a BRep, under the same profile and ceiling rules as solids.
fn mesh_brep(mesh: &TriangleMesh, options: &ExportOptions) -> StageResult<FacetedBody> {
    if !options.output_profile.allows_brep() {
        return Err(FallbackReason::DisallowedByProfile("faceted BReps"));
    }
    let count = mesh.triangle_count();
    if count > options.triangle_limit {
        return Err(FallbackReason::TriangleLimit {
            count,
            limit: options.triangle_limit,
        });
    }
    brep_from_mesh(mesh, options.merge_facets)
}

/// Mesh-tier item for the output profile.
fn mesh_tier(mesh: TriangleMesh, options: &ExportOptions) -> ItemGeometry {
    if options.output_profile.has_triangulated_face_sets() {
        ItemGeometry::TriangulatedFaceSet(mesh)
    } else {
        ItemGeometry::ShellBasedSurfaceModel(faceted_from_mesh(&mesh, false))
    }
}

/// Every solid and mesh of the element at the mesh tier.
fn homogenize(
    store: &TopologyStore,
    element: &BodyElement,
    options: &ExportOptions,
) -> StageResult<Vec<RepresentationItem>> {
    let params = TessellationParams::for_level(LevelOfDetail::Coarse);
    let mut items = Vec::new();
    for &solid in &element.solids {
        let mesh = match TessellateSolid::new(solid, params).execute(store) {
            Ok(mesh) => mesh,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping solid");
                continue;
            }
        };
        let material = resolve_geometry(store, &[solid], &[])?.material();
        items.push(RepresentationItem {
            geometry: mesh_tier(mesh, options),
            material,
        });
    }
    for &mesh_id in &element.meshes {
        let mesh = store.mesh(mesh_id)?.mesh.clone();
        if mesh.is_empty() {
            continue;
        }
        let material = resolve_geometry(store, &[], &[mesh_id])?.material();
        items.push(RepresentationItem {
            geometry: mesh_tier(mesh, options),
            material,
        });
    }
    Ok(items)
}
