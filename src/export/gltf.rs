//! glTF/GLB export, one mesh per building.

use super::layout::{padding_for, BufferLayout, SegmentRole};
use crate::error::{ConvertError, Result};
use crate::mesher::Mesh;
use crate::types::BuildingGroup;
use glam::DVec3;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// GLB magic, `glTF` read as a little-endian u32.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// GLB container version.
pub const GLB_VERSION: u32 = 2;
/// Chunk type of the JSON chunk (`JSON`).
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Chunk type of the binary chunk (`BIN\0`).
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Export building groups to GLB bytes.
///
/// Every building with at least one triangle becomes one node and one mesh, both
/// named after the building `gml:id`. Vertices are shifted by `offset`.
pub fn export_glb(groups: &[BuildingGroup], offset: DVec3) -> Result<Vec<u8>> {
    let Some((root, payload)) = build_scene(groups, offset)? else {
        return Err(ConvertError::Export("Cannot export empty scene".to_string()));
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ConvertError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;
    write_container(json_string.as_bytes(), &payload)
}

/// Export building groups to a GLB file. Returns the number of bytes written.
pub fn write_glb(groups: &[BuildingGroup], output_path: &Path, offset: DVec3) -> Result<usize> {
    let glb = export_glb(groups, offset)?;
    fs::write(output_path, &glb)?;
    info!("Wrote GLB ({} bytes) to {:?}", glb.len(), output_path);
    Ok(glb.len())
}

/// Build the glTF document and its binary payload. `None` when no building has triangles.
fn build_scene(groups: &[BuildingGroup], offset: DVec3) -> Result<Option<(json::Root, Vec<u8>)>> {
    let mut layout = BufferLayout::new();
    let mut accessors = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    for group in groups {
        let mesh = Mesh::from_polygons(&group.polygons, offset);
        let Some((min, max)) = mesh.bounds() else {
            debug!("Skipping building {} without triangles", group.id());
            continue;
        };

        let pos_view = layout.push(mesh.positions_bytes(), SegmentRole::Vertices);
        let pos_accessor = accessors.len() as u32;
        accessors.push(create_accessor(
            pos_view,
            mesh.vertex_count(),
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            Some(min),
            Some(max),
        ));

        let idx_view = layout.push(mesh.indices_bytes(), SegmentRole::Indices);
        let idx_accessor = accessors.len() as u32;
        accessors.push(create_accessor(
            idx_view,
            mesh.indices.len(),
            json::accessor::Type::Scalar,
            json::accessor::ComponentType::U32,
            None,
            None,
        ));

        let mesh_idx = meshes.len() as u32;
        meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(group.id().to_string()),
            primitives: vec![create_primitive(pos_accessor, idx_accessor)],
            weights: None,
        });
        nodes.push(create_node(group.id(), mesh_idx));
        debug!("  Mesh {}: {} triangles", group.id(), mesh.triangle_count());
    }

    if meshes.is_empty() {
        return Ok(None);
    }
    info!("Creating GLB with {} building meshes", meshes.len());

    let buffer_views = layout.buffer_views();
    let payload = layout.finish()?;

    let root = json::Root {
        asset: json::Asset {
            generator: Some(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))),
            ..Default::default()
        },
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(payload.len() as u64),
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: (0..nodes.len() as u32).map(json::Index::new).collect(),
        }],
        meshes,
        nodes,
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    Ok(Some((root, payload)))
}

/// Wrap a JSON document and a binary payload into a GLB container.
///
/// The JSON chunk is padded with spaces and the binary chunk with zeros, both to
/// four bytes. The declared total length is checked against the bytes written.
pub fn write_container(json_bytes: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let json_padding = padding_for(json_bytes.len());
    let padded_json_len = json_bytes.len() + json_padding;
    let bin_padding = padding_for(payload.len());
    let padded_bin_len = payload.len() + bin_padding;

    let total_size = HEADER_LEN + CHUNK_HEADER_LEN + padded_json_len + CHUNK_HEADER_LEN + padded_bin_len;
    let total_u32 = u32::try_from(total_size)
        .map_err(|_| ConvertError::Layout(format!("GLB size {} exceeds 4 GiB", total_size)))?;

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_u32.to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.resize(glb.len() + json_padding, 0x20);

    // BIN Chunk
    glb.extend_from_slice(&(padded_bin_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(payload);
    glb.resize(glb.len() + bin_padding, 0);

    if glb.len() != total_size {
        return Err(ConvertError::Layout(format!(
            "GLB header declares {} bytes but {} were written",
            total_size,
            glb.len()
        )));
    }
    Ok(glb)
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        name: None,
        normalized: false,
        sparse: None,
    }
}

/// Create a triangle-list primitive with positions only.
fn create_primitive(positions_accessor: u32, indices_accessor: u32) -> json::mesh::Primitive {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(positions_accessor),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Create a node named `name` referencing mesh `mesh_idx`.
fn create_node(name: &str, mesh_idx: u32) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(mesh_idx)),
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}
