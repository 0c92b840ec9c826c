//! # CityGML Mesher
//!
//! A Rust library for turning CityGML 2.0 building models into web-viewable meshes.
//!
//! ## Overview
//!
//! This library takes a CityGML document as input and produces either a Wavefront
//! OBJ/MTL pair or a binary glTF (GLB) scene, plus a JSON metadata index keyed by
//! the same `gml:id` identifiers as the mesh groups and nodes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use citygml_mesher::{convert, ConvertConfig};
//! use std::path::Path;
//!
//! let report = convert(
//!     Path::new("district.gml"),
//!     Path::new("out/district.glb"),
//!     &ConvertConfig::default(),
//! )?;
//! for artifact in &report.artifacts {
//!     println!("{} ({} bytes)", artifact.path.display(), artifact.bytes);
//! }
//! ```
//!
//! ## Library Integration
//!
//! The stages can also be driven one at a time:
//!
//! ```ignore
//! use citygml_mesher::{center, export_obj, CityModel, MetadataIndex};
//!
//! let model = CityModel::parse(&xml)?;
//! let geometries = model.geometries();
//! let (centered, offset) = center(&geometries);
//! let obj = export_obj(&centered, offset, "district.mtl")?;
//! let index = MetadataIndex::build(&geometries, offset);
//! ```

pub mod citygml;
pub mod error;
pub mod export;
pub mod mesher;
pub mod pipeline;
pub mod types;

// Re-export main types for convenience
pub use citygml::CityModel;
pub use error::{ConvertError, Result};
pub use export::{export_glb, export_obj, metadata_path_for, MetadataIndex, ObjExport};
pub use mesher::{bbox_center_offset, center, min_corner_offset, Mesh};
pub use pipeline::{convert, summarize, ConversionReport, ConvertConfig, InputFormat, Outcome, OutputFormat};
pub use types::{BoundingBox, BuildingAttributes, BuildingGroup, ElementKind, GeometryMap, GeometryRecord};
