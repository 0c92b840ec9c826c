//! Wavefront OBJ export.
//!
//! One group per object identifier, flat shaded with one normal per triangle.
//! OBJ indexes vertices and normals by file-wide 1-based counters, so the running
//! counts are carried from group to group in an [`IndexCounters`] value.

use crate::error::Result;
use crate::mesher::{face_normal, material_for, open_ring, triangulate, MATERIALS};
use crate::types::{GeometryMap, GeometryRecord};
use glam::DVec3;
use log::info;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// OBJ and MTL text for one export.
#[derive(Debug, Clone)]
pub struct ObjExport {
    pub obj: String,
    pub mtl: String,
    /// Number of groups written.
    pub group_count: usize,
}

/// Paths and sizes of the files written by [`write_obj`].
#[derive(Debug, Clone)]
pub struct ObjFiles {
    pub obj_path: PathBuf,
    pub obj_bytes: usize,
    pub mtl_path: PathBuf,
    pub mtl_bytes: usize,
    pub group_count: usize,
}

/// Next free 1-based vertex and normal index in the file being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCounters {
    pub vertex: usize,
    pub normal: usize,
}

impl Default for IndexCounters {
    fn default() -> Self {
        Self { vertex: 1, normal: 1 }
    }
}

/// Export centered geometry to OBJ and MTL text.
///
/// Objects without polygons are left out. `mtl_name` is the file name written in
/// the `mtllib` statement.
pub fn export_obj(geometries: &GeometryMap, offset: DVec3, mtl_name: &str) -> Result<ObjExport> {
    let meshable: Vec<(&String, &GeometryRecord)> =
        geometries.iter().filter(|(_, r)| !r.is_empty()).collect();

    let mut obj = String::with_capacity(256 + meshable.len() * 512);

    // OBJ header
    writeln!(obj, "# CityGML to OBJ Conversion")?;
    writeln!(obj, "# Total objects: {}", meshable.len())?;
    writeln!(obj, "# Center offset: ({}, {}, {})", offset.x, offset.y, offset.z)?;
    writeln!(obj, "mtllib {}", mtl_name)?;
    writeln!(obj)?;

    let mut counters = IndexCounters::default();
    for (id, record) in &meshable {
        write_group(&mut obj, &mut counters, id, record)?;
    }

    Ok(ObjExport {
        obj,
        mtl: export_mtl()?,
        group_count: meshable.len(),
    })
}

/// Write one group and advance `counters` past its vertices and normals.
fn write_group(obj: &mut String, counters: &mut IndexCounters, id: &str, record: &GeometryRecord) -> Result<()> {
    writeln!(obj)?;
    writeln!(obj, "# {} ({})", id, record.element_type)?;
    writeln!(obj, "g {}", id)?;
    writeln!(obj, "usemtl {}", material_for(record.element_type))?;
    writeln!(obj)?;

    let mut faces: Vec<[usize; 4]> = Vec::new();
    let mut group_vertices = 0usize;

    for polygon in &record.polygons {
        let ring = open_ring(polygon);
        let triangles = triangulate(polygon);
        if triangles.is_empty() {
            continue;
        }

        for v in ring {
            writeln!(obj, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
        }

        let base = counters.vertex + group_vertices;
        for [a, b, c] in triangles {
            let n = face_normal(ring[a], ring[b], ring[c]);
            writeln!(obj, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
            faces.push([base + a, base + b, base + c, counters.normal + faces.len()]);
        }
        group_vertices += ring.len();
    }

    writeln!(obj)?;
    for [a, b, c, n] in &faces {
        writeln!(obj, "f {a}//{n} {b}//{n} {c}//{n}")?;
    }

    counters.vertex += group_vertices;
    counters.normal += faces.len();
    Ok(())
}

/// Material library with one entry per material in the type table.
pub fn export_mtl() -> Result<String> {
    let mut mtl = String::with_capacity(1024);
    writeln!(mtl, "# CityGML Materials")?;

    for material in &MATERIALS {
        let [ar, ag, ab] = material.ambient;
        let [dr, dg, db] = material.diffuse;
        let [sr, sg, sb] = material.specular;
        writeln!(mtl)?;
        writeln!(mtl, "newmtl {}", material.name)?;
        writeln!(mtl, "Ka {:.1} {:.1} {:.1}", ar, ag, ab)?;
        writeln!(mtl, "Kd {:.1} {:.1} {:.1}", dr, dg, db)?;
        writeln!(mtl, "Ks {:.1} {:.1} {:.1}", sr, sg, sb)?;
        writeln!(mtl, "Ns {:.1}", material.shininess)?;
    }

    Ok(mtl)
}

/// Write the OBJ file and its sibling MTL file.
pub fn write_obj(geometries: &GeometryMap, output_path: &Path, offset: DVec3) -> Result<ObjFiles> {
    let mtl_path = output_path.with_extension("mtl");
    let mtl_name = mtl_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "materials.mtl".to_string());

    let export = export_obj(geometries, offset, &mtl_name)?;

    fs::write(&mtl_path, &export.mtl)?;
    info!("Wrote MTL file: {:?}", mtl_path);
    fs::write(output_path, &export.obj)?;
    info!("Wrote {} groups to {:?}", export.group_count, output_path);

    Ok(ObjFiles {
        obj_path: output_path.to_path_buf(),
        obj_bytes: export.obj.len(),
        mtl_path,
        mtl_bytes: export.mtl.len(),
        group_count: export.group_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementKind;

    fn square(z: f64) -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, z),
            DVec3::new(1.0, 0.0, z),
            DVec3::new(1.0, 1.0, z),
            DVec3::new(0.0, 1.0, z),
            DVec3::new(0.0, 0.0, z),
        ]
    }

    fn lines_with<'a>(text: &'a str, prefix: &str) -> Vec<&'a str> {
        text.lines().filter(|l| l.starts_with(prefix)).collect()
    }

    #[test]
    fn test_export_simple_obj() {
        let mut map = GeometryMap::new();
        map.insert("WALL_1".to_string(), GeometryRecord::new(ElementKind::WallSurface).with_polygon(square(0.0)));

        let export = export_obj(&map, DVec3::new(1.5, 2.0, 0.0), "city.mtl").unwrap();
        let obj = &export.obj;

        assert!(obj.contains("# Total objects: 1"));
        assert!(obj.contains("# Center offset: (1.5, 2, 0)"));
        assert!(obj.contains("mtllib city.mtl"));
        assert!(obj.contains("g WALL_1\nusemtl wall"));
        assert_eq!(lines_with(obj, "v ").len(), 4);
        assert!(obj.contains("v 1.000000 1.000000 0.000000"));
        assert_eq!(lines_with(obj, "vn ").len(), 2);
        assert!(obj.contains("vn 0.000000 0.000000 1.000000"));
        assert_eq!(lines_with(obj, "f "), vec!["f 1//1 2//1 3//1", "f 1//2 3//2 4//2"]);
    }

    #[test]
    fn test_counters_run_across_groups() {
        let mut map = GeometryMap::new();
        map.insert(
            "ROOF".to_string(),
            GeometryRecord::new(ElementKind::RoofSurface)
                .with_polygon(square(3.0))
                .with_polygon(vec![DVec3::ZERO, DVec3::X, DVec3::Z]),
        );
        map.insert("EMPTY".to_string(), GeometryRecord::new(ElementKind::GroundSurface));
        map.insert("FLOOR".to_string(), GeometryRecord::new(ElementKind::FloorSurface).with_polygon(square(0.0)));

        let export = export_obj(&map, DVec3::ZERO, "m.mtl").unwrap();
        let obj = &export.obj;

        assert_eq!(export.group_count, 2);
        assert!(!obj.contains("g EMPTY"));
        assert!(obj.contains("g FLOOR\nusemtl default"));
        assert_eq!(
            lines_with(obj, "f "),
            vec![
                "f 1//1 2//1 3//1",
                "f 1//2 3//2 4//2",
                "f 5//3 6//3 7//3",
                "f 8//4 9//4 10//4",
                "f 8//5 10//5 11//5",
            ]
        );
        assert_eq!(lines_with(obj, "v ").len(), 11);
        assert_eq!(lines_with(obj, "vn ").len(), 5);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let mut map = GeometryMap::new();
        map.insert(
            "LINE".to_string(),
            GeometryRecord::new(ElementKind::WallSurface)
                .with_polygon(vec![DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)]),
        );
        let export = export_obj(&map, DVec3::ZERO, "m.mtl").unwrap();
        assert!(export.obj.contains("vn 0.000000 0.000000 0.000000"));
    }

    #[test]
    fn test_mtl_defines_all_materials() {
        let mtl = export_mtl().unwrap();
        for name in ["roof", "wall", "ground", "closure", "building", "default"] {
            assert!(mtl.contains(&format!("newmtl {}\n", name)));
        }
        assert!(mtl.contains("newmtl roof\nKa 0.8 0.3 0.2\nKd 0.8 0.3 0.2\nKs 0.2 0.2 0.2\nNs 50.0"));
    }

    #[test]
    fn test_write_obj_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city.obj");
        let mut map = GeometryMap::new();
        map.insert("B".to_string(), GeometryRecord::new(ElementKind::Building).with_polygon(square(0.0)));

        let files = write_obj(&map, &path, DVec3::ZERO).unwrap();
        assert_eq!(files.mtl_path, dir.path().join("city.mtl"));
        let obj = std::fs::read_to_string(&path).unwrap();
        assert!(obj.contains("mtllib city.mtl"));
        assert_eq!(std::fs::metadata(&files.mtl_path).unwrap().len() as usize, files.mtl_bytes);
    }
}
