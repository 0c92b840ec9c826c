//! End-to-end conversion of one input document into mesh and metadata files.

use crate::citygml::building::attributes_by_id;
use crate::citygml::CityModel;
use crate::error::{ConvertError, Result};
use crate::export::{metadata_path_for, write_glb, write_obj, MetadataIndex};
use crate::mesher::{center, min_corner_offset};
use crate::types::{BoundingBox, BuildingAttributes, ElementKind, GeometryMap};
use glam::DVec3;
use indexmap::IndexMap;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Mesh file format written by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Binary glTF, one node per building.
    #[default]
    Glb,
    /// Wavefront OBJ with an MTL library, one group per object.
    Obj,
}

impl OutputFormat {
    /// Format implied by the extension of `path`, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        match lowercase_extension(path)?.as_str() {
            "glb" => Some(OutputFormat::Glb),
            "obj" => Some(OutputFormat::Obj),
            _ => None,
        }
    }
}

/// Kind of input accepted by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A CityGML 2.0 document (`.gml` or `.xml`).
    CityGml,
    /// An already converted scene, copied through after validation.
    Json,
}

impl InputFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        match lowercase_extension(path).as_deref() {
            Some("gml") | Some("xml") => Ok(InputFormat::CityGml),
            Some("json") => Ok(InputFormat::Json),
            _ => Err(ConvertError::UnsupportedInput(format!(
                "{} (expected .gml, .xml or .json)",
                path.display()
            ))),
        }
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Configuration for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Output format. `None` picks it from the output extension, falling back to GLB.
    pub format: Option<OutputFormat>,
    /// Add building attributes and surface back-references to the metadata index.
    pub enrich_buildings: bool,
    /// Create the parent directory of the output path if it is missing.
    pub create_output_dir: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            format: None,
            enrich_buildings: true,
            create_output_dir: true,
        }
    }
}

impl ConvertConfig {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_enrich_buildings(mut self, enrich: bool) -> Self {
        self.enrich_buildings = enrich;
        self
    }

    pub fn with_create_output_dir(mut self, create: bool) -> Self {
        self.create_output_dir = create;
        self
    }

    /// The format used for `output`.
    pub fn resolve_format(&self, output: &Path) -> OutputFormat {
        self.format
            .or_else(|| OutputFormat::from_path(output))
            .unwrap_or_default()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Mesh and metadata files were written.
    Converted,
    /// The document had no usable geometry. Only the metadata index was written.
    NothingToDo,
    /// A JSON input was copied to the output path.
    PassedThrough,
}

/// A file written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Summary of a conversion run.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub outcome: Outcome,
    /// Written files, in write order.
    pub artifacts: Vec<Artifact>,
    /// Number of objects in the metadata index.
    pub object_count: usize,
    /// Offset subtracted from the mesh coordinates.
    pub offset: DVec3,
}

impl ConversionReport {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            artifacts: Vec::new(),
            object_count: 0,
            offset: DVec3::ZERO,
        }
    }

    fn push(&mut self, path: PathBuf, bytes: usize) {
        self.artifacts.push(Artifact { path, bytes });
    }

    /// Path of the metadata index, if one was written.
    pub fn metadata_path(&self) -> Option<&Path> {
        self.artifacts
            .iter()
            .map(|a| a.path.as_path())
            .find(|p| p.to_string_lossy().ends_with("_metadata.json"))
    }
}

/// Convert `input` into a mesh file at `output` plus its metadata index.
pub fn convert(input: &Path, output: &Path, config: &ConvertConfig) -> Result<ConversionReport> {
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }
    let input_format = InputFormat::detect(input)?;

    match input_format {
        InputFormat::Json => pass_through(input, output, config),
        InputFormat::CityGml => {
            info!("Parsing CityGML file: {:?}", input);
            let xml = fs::read_to_string(input)?;
            let model = CityModel::parse(&xml)?;
            prepare_output_dir(output, config)?;
            match config.resolve_format(output) {
                OutputFormat::Obj => convert_obj(&model, output, config),
                OutputFormat::Glb => convert_glb(&model, output, config),
            }
        }
    }
}

/// Create the parent directory of `output` when configured to. Runs only once the
/// input is known to be usable.
fn prepare_output_dir(output: &Path, config: &ConvertConfig) -> Result<()> {
    if config.create_output_dir {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn pass_through(input: &Path, output: &Path, config: &ConvertConfig) -> Result<ConversionReport> {
    let text = fs::read_to_string(input)?;
    serde_json::from_str::<serde_json::Value>(&text)?;
    prepare_output_dir(output, config)?;
    fs::write(output, &text)?;
    info!("Copied pre-converted scene {:?} to {:?}", input, output);

    let mut report = ConversionReport::new(Outcome::PassedThrough);
    report.push(output.to_path_buf(), text.len());
    Ok(report)
}

fn convert_obj(model: &CityModel, output: &Path, config: &ConvertConfig) -> Result<ConversionReport> {
    let geometries = model.geometries();
    info!("Found {} objects", geometries.len());
    let (centered, offset) = center(&geometries);

    let meshable = centered.values().any(|r| !r.is_empty());
    let mut report = ConversionReport::new(if meshable {
        Outcome::Converted
    } else {
        Outcome::NothingToDo
    });

    if meshable {
        let files = write_obj(&centered, output, offset)?;
        report.push(files.mtl_path, files.mtl_bytes);
        report.push(files.obj_path, files.obj_bytes);
    } else {
        warn!("No geometry to convert; skipping {:?}", output);
    }

    let buildings = config.enrich_buildings.then(|| model.building_attributes());
    write_metadata(&geometries, offset, output, buildings, &mut report)?;
    Ok(report)
}

fn convert_glb(model: &CityModel, output: &Path, config: &ConvertConfig) -> Result<ConversionReport> {
    let geometries = model.geometries();
    let groups = model.building_groups();
    info!("Found {} buildings", groups.len());
    let offset = min_corner_offset(&groups);

    let meshable = groups.iter().any(|g| !g.polygons.is_empty());
    let mut report = ConversionReport::new(if meshable {
        Outcome::Converted
    } else {
        Outcome::NothingToDo
    });

    if meshable {
        let bytes = write_glb(&groups, output, offset)?;
        report.push(output.to_path_buf(), bytes);
    } else {
        warn!("No building geometry to convert; skipping {:?}", output);
    }

    let buildings = config.enrich_buildings.then(|| attributes_by_id(&groups));
    write_metadata(&geometries, offset, output, buildings, &mut report)?;
    Ok(report)
}

fn write_metadata(
    geometries: &GeometryMap,
    offset: DVec3,
    output: &Path,
    buildings: Option<IndexMap<String, BuildingAttributes>>,
    report: &mut ConversionReport,
) -> Result<()> {
    let mut index = MetadataIndex::build(geometries, offset);
    if let Some(buildings) = buildings {
        index.enrich(buildings);
    }

    let path = metadata_path_for(output);
    let bytes = index.write(&path)?;
    report.object_count = index.total_objects;
    report.offset = offset;
    report.push(path, bytes);
    Ok(())
}

/// One object as listed by [`summarize`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub id: String,
    pub element_type: ElementKind,
    pub polygon_count: usize,
}

/// Overview of a document without converting it.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub objects: Vec<ObjectSummary>,
    /// Object count per element type.
    pub kinds: BTreeMap<&'static str, usize>,
    pub building_count: usize,
    pub envelope: Option<BoundingBox>,
}

impl DocumentSummary {
    pub fn polygon_count(&self) -> usize {
        self.objects.iter().map(|o| o.polygon_count).sum()
    }
}

/// Parse a CityGML document and list its objects.
pub fn summarize(input: &Path) -> Result<DocumentSummary> {
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }
    if InputFormat::detect(input)? != InputFormat::CityGml {
        return Err(ConvertError::UnsupportedInput(format!(
            "{} is not a CityGML document",
            input.display()
        )));
    }

    let xml = fs::read_to_string(input)?;
    let model = CityModel::parse(&xml)?;
    let geometries = model.geometries();

    let mut kinds = BTreeMap::new();
    let objects = geometries
        .iter()
        .map(|(id, record)| {
            *kinds.entry(record.element_type.as_str()).or_insert(0) += 1;
            ObjectSummary {
                id: id.clone(),
                element_type: record.element_type,
                polygon_count: record.polygons.len(),
            }
        })
        .collect();

    let building_count = kinds.get(ElementKind::Building.as_str()).copied().unwrap_or(0);
    Ok(DocumentSummary {
        objects,
        kinds,
        building_count,
        envelope: model.envelope(),
    })
}
