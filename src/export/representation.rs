use std::fmt;

use crate::math::Matrix4;
use crate::tessellation::TriangleMesh;
use crate::topology::MaterialId;

use super::brep::FacetedBody;
use super::error::{FallbackReason, StageResult};
use super::extrusion::ExtrusionDescriptor;
use super::material::ResolvedMaterial;
use super::session::{ContextId, ExportSession, RepresentationId};
use super::sweep::SweepDescriptor;

/// Representation identifier written for every body.
pub const BODY_IDENTIFIER: &str = "Body";

/// Representation type label, derived from the item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationType {
    SweptSolid,
    AdvancedSweptSolid,
    Brep,
    SurfaceModel,
    Tessellation,
    MappedRepresentation,
    SolidModel,
}

impl RepresentationType {
    /// The label as written to the file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SweptSolid => "SweptSolid",
            Self::AdvancedSweptSolid => "AdvancedSweptSolid",
            Self::Brep => "Brep",
            Self::SurfaceModel => "SurfaceModel",
            Self::Tessellation => "Tessellation",
            Self::MappedRepresentation => "MappedRepresentation",
            Self::SolidModel => "SolidModel",
        }
    }

    /// Label for a set of item kinds, `None` for an empty set.
    ///
    /// | kinds present                      | label                  |
    /// |------------------------------------|------------------------|
    /// | extrusions only                    | `SweptSolid`           |
    /// | sweeps, possibly with extrusions   | `AdvancedSweptSolid`   |
    /// | BReps only                         | `Brep`                 |
    /// | surface models only                | `SurfaceModel`         |
    /// | triangulated face sets only        | `Tessellation`         |
    /// | mapped items only                  | `MappedRepresentation` |
    /// | any other mix                      | `SolidModel`           |
    #[must_use]
    pub fn for_items<I>(kinds: I) -> Option<Self>
    where
        I: IntoIterator<Item = ItemKind>,
    {
        let mut present = [false; 6];
        let mut any = false;
        for kind in kinds {
            present[kind as usize] = true;
            any = true;
        }
        if !any {
            return None;
        }
        let only = |k: ItemKind| present.iter().enumerate().all(|(i, &p)| p == (i == k as usize));
        let has = |k: ItemKind| present[k as usize];
        let label = if only(ItemKind::Extrusion) {
            Self::SweptSolid
        } else if has(ItemKind::Sweep)
            && present
                .iter()
                .enumerate()
                .all(|(i, &p)| !p || i == ItemKind::Sweep as usize || i == ItemKind::Extrusion as usize)
        {
            Self::AdvancedSweptSolid
        } else if only(ItemKind::Brep) {
            Self::Brep
        } else if only(ItemKind::SurfaceModel) {
            Self::SurfaceModel
        } else if only(ItemKind::TriangulatedFaceSet) {
            Self::Tessellation
        } else if only(ItemKind::Mapped) {
            Self::MappedRepresentation
        } else {
            Self::SolidModel
        };
        Some(label)
    }
}

impl fmt::Display for RepresentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a representation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Extrusion = 0,
    Sweep = 1,
    Brep = 2,
    SurfaceModel = 3,
    TriangulatedFaceSet = 4,
    Mapped = 5,
}

impl ItemKind {
    /// Whether the kind belongs to the mesh tier.
    #[must_use]
    pub fn is_tessellated(self) -> bool {
        matches!(self, Self::SurfaceModel | Self::TriangulatedFaceSet)
    }
}

/// Geometry of one representation item.
#[derive(Debug, Clone)]
pub enum ItemGeometry {
    ExtrudedAreaSolid(ExtrusionDescriptor),
    SweptAreaSolid(SweepDescriptor),
    FacetedBrep(FacetedBody),
    ShellBasedSurfaceModel(FacetedBody),
    TriangulatedFaceSet(TriangleMesh),
    MappedItem {
        source: RepresentationId,
        transform: Matrix4,
    },
}

impl ItemGeometry {
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::ExtrudedAreaSolid(_) => ItemKind::Extrusion,
            Self::SweptAreaSolid(_) => ItemKind::Sweep,
            Self::FacetedBrep(_) => ItemKind::Brep,
            Self::ShellBasedSurfaceModel(_) => ItemKind::SurfaceModel,
            Self::TriangulatedFaceSet(_) => ItemKind::TriangulatedFaceSet,
            Self::MappedItem { .. } => ItemKind::Mapped,
        }
    }
}

/// One item of a body representation.
#[derive(Debug, Clone)]
pub struct RepresentationItem {
    pub geometry: ItemGeometry,
    /// Material of the source geometry of this item alone.
    pub material: Option<MaterialId>,
}

/// A `Body` shape representation.
#[derive(Debug, Clone)]
pub struct ShapeRepresentation {
    pub id: RepresentationId,
    pub identifier: &'static str,
    pub rep_type: RepresentationType,
    pub items: Vec<RepresentationItem>,
    pub context: ContextId,
    /// Body material; `None` when untagged or mixed.
    pub material: Option<MaterialId>,
}

impl ShapeRepresentation {
    /// Item kinds in item order.
    pub fn item_kinds(&self) -> impl Iterator<Item = ItemKind> + '_ {
        self.items.iter().map(|i| i.geometry.kind())
    }
}

/// Wraps items into a body representation with a label derived from them,
/// the session's context and the resolved body material.
///
/// # Errors
///
/// Returns [`FallbackReason::NothingToExport`] when `items` is empty.
pub fn assemble(
    session: &mut ExportSession,
    items: Vec<RepresentationItem>,
    material: ResolvedMaterial,
) -> StageResult<ShapeRepresentation> {
    let rep_type = RepresentationType::for_items(items.iter().map(|i| i.geometry.kind()))
        .ok_or(FallbackReason::NothingToExport)?;
    let representation = ShapeRepresentation {
        id: session.next_representation_id(),
        identifier: BODY_IDENTIFIER,
        rep_type,
        items,
        context: session.context().id,
        material: material.material(),
    };
    session.stats_mut().representations += 1;
    Ok(representation)
}
