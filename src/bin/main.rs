//! CityGML Mesher CLI
//!
//! Convert CityGML building models into OBJ or GLB meshes with a metadata index.

use citygml_mesher::pipeline::DocumentSummary;
use citygml_mesher::{convert, summarize, ConvertConfig, ConvertError, Outcome};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "citygml-mesher")]
#[command(author, version, about = "Convert CityGML building models to OBJ or GLB meshes", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CityGML document to a mesh and a metadata index
    Convert {
        /// Input CityGML file (.gml or .xml), or an already converted .json scene
        #[arg(short, long)]
        input: PathBuf,

        /// Output mesh file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (defaults to the output file extension, then glb)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the plain metadata index without building attributes
        #[arg(long)]
        no_enrich: bool,

        /// Fail instead of creating a missing output directory
        #[arg(long)]
        no_create_dir: bool,
    },

    /// List every object with its polygon count, without converting
    Count {
        /// Input CityGML file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show object counts and the document envelope
    Info {
        /// Input CityGML file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
}

impl From<OutputFormat> for citygml_mesher::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Glb => citygml_mesher::OutputFormat::Glb,
            OutputFormat::Obj => citygml_mesher::OutputFormat::Obj,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            no_enrich,
            no_create_dir,
        } => run_convert(input, output, format, no_enrich, no_create_dir),
        Commands::Count { input } => summarize(&input).map(|summary| print_objects(&summary)),
        Commands::Info { input } => summarize(&input).map(|summary| print_info(&summary)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run_convert(
    input: PathBuf,
    output: PathBuf,
    format: Option<OutputFormat>,
    no_enrich: bool,
    no_create_dir: bool,
) -> Result<(), ConvertError> {
    let mut config = ConvertConfig::default()
        .with_enrich_buildings(!no_enrich)
        .with_create_output_dir(!no_create_dir);
    if let Some(format) = format {
        config = config.with_format(format.into());
    }

    let report = convert(&input, &output, &config)?;

    match report.outcome {
        Outcome::Converted => println!("Converted {} objects", report.object_count),
        Outcome::NothingToDo => println!("No geometry found; wrote metadata only"),
        Outcome::PassedThrough => println!("Input is already converted; copied as is"),
    }
    let offset = report.offset;
    println!("  Offset: ({}, {}, {})", offset.x, offset.y, offset.z);
    for artifact in &report.artifacts {
        println!("  {} ({} bytes)", artifact.path.display(), artifact.bytes);
    }

    Ok(())
}

fn print_objects(summary: &DocumentSummary) {
    for object in &summary.objects {
        println!("{}\t{}\t{}", object.id, object.element_type, object.polygon_count);
    }
    println!(
        "\nTotal: {} objects, {} polygons",
        summary.objects.len(),
        summary.polygon_count()
    );
}

fn print_info(summary: &DocumentSummary) {
    println!("CityGML Document Info:");
    println!("  Objects: {}", summary.objects.len());
    println!("  Buildings: {}", summary.building_count);
    for (kind, count) in &summary.kinds {
        println!("    {}: {}", kind, count);
    }
    println!("  Polygons: {}", summary.polygon_count());
    match &summary.envelope {
        Some(envelope) => {
            let (min, max) = (envelope.min, envelope.max);
            println!("  Envelope: ({}, {}, {}) - ({}, {}, {})", min.x, min.y, min.z, max.x, max.y, max.z);
            let size = envelope.dimensions();
            println!("  Extent: {} x {} x {}", size.x, size.y, size.z);
        }
        None => println!("  Envelope: not declared"),
    }
}
