//! JSON metadata index written next to every mesh artifact.
//!
//! The index maps each object identifier to its element type, polygon count and
//! inline metadata, and records the offset that was subtracted from the geometry so
//! a viewer can map picked coordinates back to document coordinates.

use crate::error::Result;
use crate::types::{BuildingAttributes, GeometryMap, Metadata};
use glam::DVec3;
use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Offset in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<DVec3> for Offset {
    fn from(v: DVec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// One entry of the `objects` mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectEntry {
    pub element_type: String,
    pub polygon_count: usize,
    pub metadata: Metadata,
}

/// The metadata index document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataIndex {
    pub offset: Offset,
    pub total_objects: usize,
    pub objects: IndexMap<String, ObjectEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildings: Option<IndexMap<String, BuildingAttributes>>,
}

impl MetadataIndex {
    /// One entry per identifier in `geometries`, whether or not it has polygons.
    pub fn build(geometries: &GeometryMap, offset: DVec3) -> Self {
        let objects: IndexMap<String, ObjectEntry> = geometries
            .iter()
            .map(|(id, record)| {
                let entry = ObjectEntry {
                    element_type: record.element_type.as_str().to_string(),
                    polygon_count: record.polygons.len(),
                    metadata: record.metadata.clone(),
                };
                (id.clone(), entry)
            })
            .collect();

        Self {
            offset: offset.into(),
            total_objects: objects.len(),
            objects,
            buildings: None,
        }
    }

    /// Merge building attributes into the index.
    ///
    /// Building entries gain height, storey and surface attributes; surface entries
    /// gain a `buildingId` back-reference; the attributes themselves are listed under
    /// `buildings`.
    pub fn enrich(&mut self, buildings: IndexMap<String, BuildingAttributes>) {
        for (building_id, attributes) in &buildings {
            if let Some(entry) = self.objects.get_mut(building_id) {
                let metadata = &mut entry.metadata;
                metadata.insert("measuredHeight".to_string(), to_value(attributes.measured_height));
                metadata.insert("storeysAboveGround".to_string(), to_value(attributes.storeys_above_ground));
                metadata.insert("storeysBelowGround".to_string(), to_value(attributes.storeys_below_ground));
                metadata.insert("surfaces".to_string(), Value::from(attributes.surfaces.clone()));
            }
            for surface_id in &attributes.surfaces {
                if let Some(entry) = self.objects.get_mut(surface_id) {
                    entry
                        .metadata
                        .entry("buildingId".to_string())
                        .or_insert_with(|| Value::from(building_id.as_str()));
                }
            }
        }
        self.buildings = Some(buildings);
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the index to `path`. Returns the number of bytes written.
    pub fn write(&self, path: &Path) -> Result<usize> {
        let json = self.to_json()?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        info!("Metadata written to {:?}", path);
        Ok(json.len())
    }
}

fn to_value<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

/// Companion metadata path of a mesh file: `city.glb` becomes `city_metadata.json`.
pub fn metadata_path_for(mesh_path: &Path) -> PathBuf {
    let stem = mesh_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    mesh_path.with_file_name(format!("{}_metadata.json", stem))
}
