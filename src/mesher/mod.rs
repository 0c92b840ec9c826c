//! Geometry processing: centering, triangulation, normals and materials.
//!
//! Two centering policies exist side by side. The OBJ path recenters on the
//! midpoint of the bounding box ([`bbox_center_offset`]); the GLB path shifts
//! by the axis-wise minimum ([`min_corner_offset`]). They are kept as separate
//! functions so one path never picks up the other's offset by accident.

pub mod geometry;
pub mod material;
pub mod triangulate;

pub use geometry::Mesh;
pub use material::{material_for, MaterialDef, MATERIALS};
pub use triangulate::{face_normal, is_valid_ring, open_ring, triangulate};

use crate::types::{BoundingBox, BuildingGroup, GeometryMap, GeometryRecord};
use glam::DVec3;
use log::{info, warn};

/// Midpoint of the bounding box of every vertex in the map. Empty maps give the origin.
pub fn bbox_center_offset(geometries: &GeometryMap) -> DVec3 {
    let points = geometries.values().flat_map(GeometryRecord::vertices);
    match BoundingBox::from_points(points) {
        Some(bbox) => {
            info!("Bounding box: min={:?}, max={:?}", bbox.min.to_array(), bbox.max.to_array());
            bbox.center()
        }
        None => {
            warn!("No vertices found");
            DVec3::ZERO
        }
    }
}

/// Axis-wise minimum of every surface vertex of every building. Empty input gives the origin.
pub fn min_corner_offset(groups: &[BuildingGroup]) -> DVec3 {
    let points = groups
        .iter()
        .flat_map(|g| g.polygons.iter().flat_map(|p| p.iter().copied()));
    BoundingBox::from_points(points)
        .map(|bbox| bbox.min)
        .unwrap_or(DVec3::ZERO)
}

/// Subtract `offset` from every vertex, keeping identifiers and vertex order.
pub fn apply_offset(geometries: &GeometryMap, offset: DVec3) -> GeometryMap {
    geometries
        .iter()
        .map(|(id, record)| {
            let polygons = record
                .polygons
                .iter()
                .map(|polygon| polygon.iter().map(|&p| p - offset).collect())
                .collect();
            let centered = GeometryRecord {
                element_type: record.element_type,
                polygons,
                metadata: record.metadata.clone(),
            };
            (id.clone(), centered)
        })
        .collect()
}

/// Recenter the map on its bounding box midpoint.
///
/// Returns the centered map together with the offset that was subtracted.
pub fn center(geometries: &GeometryMap) -> (GeometryMap, DVec3) {
    let offset = bbox_center_offset(geometries);
    info!("Center offset: {:?}", offset.to_array());
    (apply_offset(geometries, offset), offset)
}
