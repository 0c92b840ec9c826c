//! Mesh export formats.
//!
//! This module provides the OBJ/MTL text exporter, the GLB binary exporter and
//! the JSON metadata index written next to either of them.

pub mod gltf;
pub mod layout;
pub mod metadata;
pub mod obj;

pub use gltf::{export_glb, write_glb};
pub use metadata::{metadata_path_for, MetadataIndex};
pub use obj::{export_mtl, export_obj, write_obj, ObjExport, ObjFiles};
