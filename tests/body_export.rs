#![allow(clippy::unwrap_used)]

use std::f64::consts::{FRAC_PI_2, PI};

use approx::assert_relative_eq;
use bodyrep::export::{
    export_bodies, export_body, BodyElement, ExportOptions, ExportSession, GeometryKey,
    ItemGeometry, ItemKind, ParameterMapping, ParameterValue, RepresentationType, ShapeRepresentation,
};
use bodyrep::math::{Matrix4, Point2, Point3, Vector3};
use bodyrep::operations::creation::{MakeBox, MakeCylinder, MakeFace, MakeWire};
use bodyrep::operations::query::{Area, Volume};
use bodyrep::operations::shaping::{Extrude, PathSegment, Sweep};
use bodyrep::tessellation::{LevelOfDetail, TessellationParams, TriangleMesh};
use bodyrep::topology::{MaterialId, MeshData, SolidId, TopologyStore};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tagged_box(store: &mut TopologyStore, x: f64, material: Option<MaterialId>) -> SolidId {
    let wire = MakeWire::new(
        vec![p(x, 0.0, 0.0), p(x + 1.0, 0.0, 0.0), p(x + 1.0, 1.0, 0.0), p(x, 1.0, 0.0)],
        true,
    )
    .execute(store)
    .unwrap();
    let mut face = MakeFace::new(wire, vec![]);
    if let Some(material) = material {
        face = face.with_material(material);
    }
    let face = face.execute(store).unwrap();
    Extrude::new(face, Vector3::new(0.0, 0.0, 2.0))
        .execute(store)
        .unwrap()
}

fn tetrahedron() -> TriangleMesh {
    let a = p(0.0, 0.0, 0.0);
    let b = p(1.0, 0.0, 0.0);
    let c = p(0.0, 1.0, 0.0);
    let d = p(0.0, 0.0, 1.0);
    let mut mesh = TriangleMesh::default();
    mesh.push_triangle([a, c, b], None);
    mesh.push_triangle([a, b, d], None);
    mesh.push_triangle([b, c, d], None);
    mesh.push_triangle([c, a, d], None);
    mesh
}

fn square() -> Vec<Point2> {
    vec![
        Point2::new(-0.5, -0.5),
        Point2::new(0.5, -0.5),
        Point2::new(0.5, 0.5),
        Point2::new(-0.5, 0.5),
    ]
}

fn export(store: &mut TopologyStore, options: ExportOptions, element: &BodyElement) -> ShapeRepresentation {
    let mut session = ExportSession::new(options);
    export_body(&mut session, store, element).unwrap()
}

// ── Extrusions ─────────────────────────────────────────────────

#[test]
fn box_exports_as_swept_solid() {
    init_logging();
    let mut store = TopologyStore::new();
    let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 1.0, 3.0))
        .execute(&mut store)
        .unwrap();
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Walls").with_solid(solid));
    assert_eq!(rep.rep_type, RepresentationType::SweptSolid);
    let ItemGeometry::ExtrudedAreaSolid(d) = &rep.items[0].geometry else {
        panic!("expected extrusion");
    };
    assert_eq!(d.outer_loops.len(), 1);
    assert_eq!(d.outer_loops[0].len(), 4);
    assert_relative_eq!(d.length, 3.0, epsilon = 1e-9);
    assert_relative_eq!(d.profile_area().unwrap(), 2.0, epsilon = 1e-9);
    let volume = Volume::new(solid).execute(&store).unwrap();
    assert_relative_eq!(d.volume().unwrap(), volume, epsilon = 1e-9);
    let area = Area::new(solid).execute(&store).unwrap();
    assert_relative_eq!(area, 2.0 * 2.0 + d.perimeter * d.length, epsilon = 1e-9);
}

#[test]
fn classification_is_repeatable() {
    let mut store = TopologyStore::new();
    let solid = MakeCylinder::new(p(0.0, 0.0, 0.0), 1.0, Vector3::x(), 3.0)
        .execute(&mut store)
        .unwrap();
    let element = BodyElement::new("Beams").with_solid(solid);
    let mut session = ExportSession::new(ExportOptions::default());
    let first = export_body(&mut session, &mut store, &element).unwrap();
    let second = export_body(&mut session, &mut store, &element).unwrap();
    assert_eq!(first.rep_type, second.rep_type);
    let (ItemGeometry::ExtrudedAreaSolid(a), ItemGeometry::ExtrudedAreaSolid(b)) =
        (&first.items[0].geometry, &second.items[0].geometry)
    else {
        panic!("expected extrusions");
    };
    assert_eq!(a.loop_count(), b.loop_count());
    assert_ne!(first.id, second.id);
}

#[test]
fn re_extruded_profile_gives_the_same_descriptor() {
    let mut store = TopologyStore::new();
    let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 1.0, 3.0))
        .execute(&mut store)
        .unwrap();
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Walls").with_solid(solid));
    let ItemGeometry::ExtrudedAreaSolid(first) = &rep.items[0].geometry else {
        panic!("expected extrusion");
    };

    let wire = MakeWire::new(first.outer_loops[0].vertices().unwrap(), true)
        .execute(&mut store)
        .unwrap();
    let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
    let again = Extrude::new(face, first.direction * first.length)
        .execute(&mut store)
        .unwrap();
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Walls").with_solid(again));
    let ItemGeometry::ExtrudedAreaSolid(second) = &rep.items[0].geometry else {
        panic!("expected extrusion");
    };
    assert_relative_eq!(second.length, first.length, epsilon = 1e-9);
    assert_relative_eq!(second.profile_area().unwrap(), first.profile_area().unwrap(), epsilon = 1e-9);
    assert_relative_eq!(second.direction, first.direction, epsilon = 1e-9);
    let original = Volume::new(solid).execute(&store).unwrap();
    let rebuilt = Volume::new(again).execute(&store).unwrap();
    assert_relative_eq!(rebuilt, original, max_relative = 1e-9);
}

fn prism(store: &mut TopologyStore, outer: Vec<Point3>, holes: Vec<Vec<Point3>>, height: f64) -> SolidId {
    let outer = MakeWire::new(outer, true).execute(store).unwrap();
    let holes = holes
        .into_iter()
        .map(|h| MakeWire::new(h, true).execute(store).unwrap())
        .collect();
    let face = MakeFace::new(outer, holes).execute(store).unwrap();
    Extrude::new(face, Vector3::z() * height).execute(store).unwrap()
}

#[test]
fn extrusion_volume_matches_the_solid() {
    let mut store = TopologyStore::new();
    let l_shape = prism(
        &mut store,
        vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(4.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 3.0, 0.0),
            p(0.0, 3.0, 0.0),
        ],
        vec![],
        2.5,
    );
    let framed = prism(
        &mut store,
        vec![p(0.0, 0.0, 0.0), p(6.0, 0.0, 0.0), p(6.0, 4.0, 0.0), p(0.0, 4.0, 0.0)],
        vec![
            vec![p(1.0, 1.0, 0.0), p(1.0, 2.0, 0.0), p(3.0, 2.0, 0.0), p(3.0, 1.0, 0.0)],
            vec![p(4.0, 1.0, 0.0), p(4.5, 3.0, 0.0), p(5.0, 1.0, 0.0)],
        ],
        0.3,
    );
    let cylinder = MakeCylinder::new(p(0.0, 0.0, 0.0), 0.5, Vector3::z(), 4.0)
        .execute(&mut store)
        .unwrap();

    for (solid, rel) in [(l_shape, 1e-9), (framed, 1e-9), (cylinder, 1e-2)] {
        let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Walls").with_solid(solid));
        let ItemGeometry::ExtrudedAreaSolid(d) = &rep.items[0].geometry else {
            panic!("expected extrusion");
        };
        let volume = Volume::new(solid)
            .with_params(TessellationParams::for_level(LevelOfDetail::Fine))
            .execute(&store)
            .unwrap();
        assert_relative_eq!(d.volume().unwrap(), volume, max_relative = rel);
    }
}

#[test]
fn cylinder_exports_as_swept_solid() {
    let mut store = TopologyStore::new();
    let solid = MakeCylinder::new(p(0.0, 0.0, 0.0), 0.5, Vector3::z(), 4.0)
        .execute(&mut store)
        .unwrap();
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Columns").with_solid(solid));
    assert_eq!(rep.rep_type, RepresentationType::SweptSolid);
}

// ── Sweeps and fallbacks ───────────────────────────────────────

#[test]
fn bent_sweep_exports_as_advanced_swept_solid() {
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
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Pipes").with_solid(solid));
    assert_eq!(rep.rep_type, RepresentationType::AdvancedSweptSolid);
}

#[test]
fn helical_sweep_is_not_a_swept_solid() {
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
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Railings").with_solid(solid));
    assert!(matches!(rep.rep_type, RepresentationType::Brep | RepresentationType::Tessellation));

    let limited = ExportOptions::default().with_triangle_limit(10);
    let rep = export(&mut store, limited, &BodyElement::new("Railings").with_solid(solid));
    assert_eq!(rep.rep_type, RepresentationType::Tessellation);
}

#[test]
fn closed_mesh_is_a_brep_and_dangling_face_is_not() {
    let mut store = TopologyStore::new();
    let closed = store.add_mesh(MeshData::new(tetrahedron()));
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Generic").with_mesh(closed));
    assert_eq!(rep.rep_type, RepresentationType::Brep);

    let mut dangling = tetrahedron();
    dangling.push_triangle([p(1.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.5, -1.0, 0.0)], None);
    let dangling = store.add_mesh(MeshData::new(dangling));
    let rep = export(&mut store, ExportOptions::default(), &BodyElement::new("Generic").with_mesh(dangling));
    assert_eq!(rep.rep_type, RepresentationType::Tessellation);
}

#[test]
fn closed_mesh_over_the_ceiling_is_not_a_brep() {
    let mut store = TopologyStore::new();
    let closed = store.add_mesh(MeshData::new(tetrahedron()));
    let element = BodyElement::new("Generic").with_mesh(closed);
    let rep = export(&mut store, ExportOptions::default().with_triangle_limit(2), &element);
    assert_eq!(rep.rep_type, RepresentationType::Tessellation);
    let rep = export(&mut store, ExportOptions::default().with_triangle_limit(4), &element);
    assert_eq!(rep.rep_type, RepresentationType::Brep);
}

#[test]
fn solid_mixed_with_open_mesh_is_all_tessellation() {
    let mut store = TopologyStore::new();
    let solid = tagged_box(&mut store, 0.0, None);
    let mut open = TriangleMesh::default();
    open.push_triangle([p(0.0, 0.0, 5.0), p(1.0, 0.0, 5.0), p(0.0, 1.0, 5.0)], None);
    let mesh = store.add_mesh(MeshData::new(open));
    let element = BodyElement::new("Generic").with_solid(solid).with_mesh(mesh);
    let rep = export(&mut store, ExportOptions::default(), &element);
    assert_eq!(rep.rep_type, RepresentationType::Tessellation);
    assert_eq!(rep.items.len(), 2);
    assert!(rep.item_kinds().all(|k| k == ItemKind::TriangulatedFaceSet));
}

// ── Materials ──────────────────────────────────────────────────

#[test]
fn second_material_clears_the_body_material() {
    let a = MaterialId(1);
    let b = MaterialId(2);
    let mut store = TopologyStore::new();
    let mut element = BodyElement::new("Walls");
    for i in 0..3 {
        element = element.with_solid(tagged_box(&mut store, f64::from(i) * 2.0, Some(a)));
    }
    let mixed = element.clone().with_solid(tagged_box(&mut store, 10.0, Some(b)));
    let rep = export(&mut store, ExportOptions::default(), &mixed);
    assert_eq!(rep.material, None);
    assert_eq!(rep.items[0].material, Some(a));
    assert_eq!(rep.items[3].material, Some(b));

    let untagged = element.with_solid(tagged_box(&mut store, 10.0, None));
    let rep = export(&mut store, ExportOptions::default(), &untagged);
    assert_eq!(rep.material, Some(a));
}

#[test]
fn parameter_material_goes_through_the_mapping() {
    let mut store = TopologyStore::new();
    let solid = tagged_box(&mut store, 0.0, None);
    let mapping = ParameterMapping::parse("# host\tname\tparameter\nColumns\tStructural Material\tTragwerk\n");
    let mut session = ExportSession::new(ExportOptions::default()).with_mapping(mapping);
    let element = BodyElement::new("Columns")
        .with_solid(solid)
        .with_parameter("Tragwerk", ParameterValue::Material(MaterialId(5)))
        .with_parameter("Material", ParameterValue::Material(MaterialId(6)));
    let rep = export_body(&mut session, &mut store, &element).unwrap();
    assert_eq!(rep.material, Some(MaterialId(5)));
}

// ── Session ────────────────────────────────────────────────────

#[test]
fn symbol_instances_reuse_the_first_body() {
    init_logging();
    let mut store = TopologyStore::new();
    let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
        .execute(&mut store)
        .unwrap();
    let key = GeometryKey(3);
    let elements: Vec<BodyElement> = (0..3)
        .map(|i| {
            let offset = Matrix4::new_translation(&Vector3::new(f64::from(i) * 2.0, 0.0, 0.0));
            BodyElement::new("Furniture").with_solid(solid).with_symbol(key, offset)
        })
        .collect();
    let mut session = ExportSession::new(ExportOptions::default());
    let reps = export_bodies(&mut session, &mut store, &elements);
    assert_eq!(reps.len(), 3);
    assert_eq!(reps[0].1.rep_type, RepresentationType::SweptSolid);
    for (_, rep) in &reps[1..] {
        assert_eq!(rep.rep_type, RepresentationType::MappedRepresentation);
    }
    assert_eq!(session.stats().mapped, 2);
    assert_eq!(session.stats().representations, 3);
}

#[test]
fn local_frame_temporaries_are_released() {
    let mut store = TopologyStore::new();
    let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 2.0, 3.0))
        .execute(&mut store)
        .unwrap();
    let frame = bodyrep::geometry::CoordinateSystem::new(p(1.0, 1.0, 0.0), Vector3::z(), Vector3::x()).unwrap();
    let before = store.solid_count();
    let mut session = ExportSession::new(ExportOptions::default());
    let element = BodyElement::new("Walls").with_solid(solid).with_local_frame(frame);
    let rep = export_body(&mut session, &mut store, &element).unwrap();
    let ItemGeometry::ExtrudedAreaSolid(d) = &rep.items[0].geometry else {
        panic!("expected extrusion");
    };
    assert!(d.placement.is_some());
    assert_eq!(session.temporary_count(), 0);
    assert_eq!(store.solid_count(), before);
}

#[test]
fn failed_elements_are_skipped_in_a_batch() {
    let mut store = TopologyStore::new();
    let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
        .execute(&mut store)
        .unwrap();
    let elements = vec![BodyElement::new("Empty"), BodyElement::new("Walls").with_solid(solid)];
    let mut session = ExportSession::new(ExportOptions::default());
    let reps = export_bodies(&mut session, &mut store, &elements);
    assert_eq!(reps.len(), 1);
    assert_eq!(reps[0].0, 1);
    assert_eq!(session.stats().skipped_elements, 1);
    assert_eq!(session.stats().elements, 2);
}
