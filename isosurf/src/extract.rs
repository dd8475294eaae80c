//! The `extract` subcommand: samples a built-in scalar field, extracts and welds its isosurface and writes the mesh

use crate::cli::Switch;
use anyhow::{Context, anyhow};
use clap::value_parser;
use isosurf_lib::mesh::{RawMesh, WeldedMesh};
use isosurf_lib::nalgebra::Vector3;
use isosurf_lib::scalar_field::{ConstantField, PlaneField, SinXzField, SphereField};
use isosurf_lib::{
    Parameters, Real, ScalarField, SpatialHashParameters, SurfaceExtraction, WeldingStrategy, io,
    profile,
};
use log::info;
use std::path::{Path, PathBuf};

static ARGS_IO: &str = "Input/output";
static ARGS_FIELD: &str = "Scalar field";
static ARGS_BASIC: &str = "Numerical extraction parameters";
static ARGS_WELD: &str = "Vertex welding";
static ARGS_ADV: &str = "Advanced parameters";

/// The built-in scalar fields that can be extracted from the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FieldKind {
    /// The wavy height field `sin(x*z) - y`
    SinXz,
    /// The field `-y`, its isosurface is the xz-plane
    PlaneY,
    /// The field `radius - |p|` of a sphere centered at the origin
    Sphere,
    /// A field with the same value everywhere
    Constant,
}

/// The vertex welding strategies selectable from the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum WeldingKind {
    /// Merge vertices closer than the weld threshold using a spatial hash, recomputes normals
    SpatialHash,
    /// Merge vertices that belong to the same grid point, no normals are produced
    GridPoint,
}

/// Command line arguments for the `extract` subcommand
#[derive(Clone, Debug, clap::Parser)]
#[command(next_help_heading = ARGS_ADV)]
pub struct ExtractSubcommandArgs {
    /// Filename for writing the welded mesh to disk (supported formats: OBJ, VTK, JSON)
    #[arg(help_heading = ARGS_IO, short = 'o', long, value_parser = value_parser!(PathBuf))]
    pub output_file: PathBuf,
    /// Optional filename for writing the raw (unwelded) triangle soup to disk
    #[arg(help_heading = ARGS_IO, long, value_parser = value_parser!(PathBuf))]
    pub output_raw_file: Option<PathBuf>,
    /// Whether to overwrite existing files without asking
    #[arg(help_heading = ARGS_IO, long)]
    pub overwrite: bool,

    /// The scalar field to extract
    #[arg(help_heading = ARGS_FIELD, long, value_enum, default_value = "sin-xz")]
    pub field: FieldKind,
    /// Radius of the sphere field
    #[arg(help_heading = ARGS_FIELD, long, default_value = "2.0")]
    pub sphere_radius: f64,
    /// Value of the constant field
    #[arg(help_heading = ARGS_FIELD, long, default_value = "1.0", allow_negative_numbers = true)]
    pub constant_value: f64,

    /// Extents of the sampled region, the region is centered at the origin
    #[arg(
        help_heading = ARGS_BASIC,
        long,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        default_values_t = [5.0, 5.0, 5.0],
    )]
    pub mesh_size: Vec<f64>,
    /// Edge length of the cubic marching cubes cells
    #[arg(help_heading = ARGS_BASIC, short = 'c', long, default_value = "1.0")]
    pub cell_size: f64,
    /// The value of the scalar field at which the surface is extracted
    #[arg(help_heading = ARGS_BASIC, short = 't', long, default_value = "0.0", allow_negative_numbers = true)]
    pub iso_value: f64,

    /// Strategy used to merge duplicate vertices emitted by neighboring cells
    #[arg(help_heading = ARGS_WELD, long, value_enum, default_value = "spatial-hash")]
    pub welding: WeldingKind,
    /// Squared distance below which two vertices are merged by the spatial hash welding
    #[arg(help_heading = ARGS_WELD, long, default_value = "1e-4", allow_negative_numbers = true)]
    pub weld_threshold: f64,
    /// Edge length of the spatial hash buckets
    #[arg(help_heading = ARGS_WELD, long, default_value = "0.03", allow_negative_numbers = true)]
    pub bucket_step: f64,

    /// Enable the use of double precision for all computations
    #[arg(
        help_heading = ARGS_ADV,
        short = 'd',
        long,
        default_value = "off",
        value_name = "off|on",
        ignore_case = true,
        require_equals = true
    )]
    pub double_precision: Switch,
}

/// Executes the `extract` subcommand
pub fn extract_subcommand(cmd_args: &ExtractSubcommandArgs) -> Result<(), anyhow::Error> {
    profile!("extract cli");

    let args = ExtractionRunnerArgs::try_from(cmd_args)
        .context("Failed processing parameters from command line")?;

    check_overwrite(&args.output_file, cmd_args.overwrite)?;
    if let Some(output_raw_file) = &args.output_raw_file {
        check_overwrite(output_raw_file, cmd_args.overwrite)?;
    }

    if args.use_double_precision {
        info!("Using double precision (f64) for isosurface extraction.");
        extraction_pipeline_from_args::<f64>(&args)
    } else {
        info!("Using single precision (f32) for isosurface extraction.");
        extraction_pipeline_from_args::<f32>(&args)
    }
}

/// The scalar field selected on the command line together with its settings
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FieldConfig {
    SinXz,
    PlaneY,
    Sphere { radius: f64 },
    Constant { value: f64 },
}

impl FieldConfig {
    /// Instantiates the field for the given real type
    pub fn build<R: Real>(&self) -> Result<Box<dyn ScalarField<R>>, anyhow::Error> {
        let convert = |value: f64| {
            R::from_f64(value)
                .ok_or_else(|| anyhow!("Unable to convert field parameter {} to the real type", value))
        };

        let field: Box<dyn ScalarField<R>> = match *self {
            FieldConfig::SinXz => Box::new(SinXzField),
            FieldConfig::PlaneY => Box::new(PlaneField::<R>::y_up()),
            FieldConfig::Sphere { radius } => Box::new(SphereField {
                center: Vector3::zeros(),
                radius: convert(radius)?,
            }),
            FieldConfig::Constant { value } => Box::new(ConstantField(convert(value)?)),
        };
        Ok(field)
    }
}

/// All arguments of the `extract` subcommand converted to useful types
#[derive(Clone, Debug)]
pub struct ExtractionRunnerArgs {
    pub params: Parameters<f64>,
    pub field: FieldConfig,
    pub use_double_precision: bool,
    pub output_file: PathBuf,
    pub output_raw_file: Option<PathBuf>,
}

impl TryFrom<&ExtractSubcommandArgs> for ExtractionRunnerArgs {
    type Error = anyhow::Error;

    fn try_from(args: &ExtractSubcommandArgs) -> Result<Self, Self::Error> {
        let mesh_size = match args.mesh_size.as_slice() {
            &[x, y, z] => Vector3::new(x, y, z),
            other => {
                return Err(anyhow!(
                    "The mesh size has to consist of exactly three values (got {})",
                    other.len()
                ));
            }
        };

        let welding = match args.welding {
            WeldingKind::SpatialHash => WeldingStrategy::SpatialHash(SpatialHashParameters {
                threshold: args.weld_threshold,
                bucket_step: args.bucket_step,
            }),
            WeldingKind::GridPoint => WeldingStrategy::GridPoint,
        };

        let params = Parameters::new(mesh_size, args.cell_size)
            .with_iso_surface_threshold(args.iso_value)
            .with_welding(welding);
        params
            .validate()
            .context("The extraction parameters are invalid")?;

        let field = match args.field {
            FieldKind::SinXz => FieldConfig::SinXz,
            FieldKind::PlaneY => FieldConfig::PlaneY,
            FieldKind::Sphere => FieldConfig::Sphere {
                radius: args.sphere_radius,
            },
            FieldKind::Constant => FieldConfig::Constant {
                value: args.constant_value,
            },
        };

        Ok(Self {
            params,
            field,
            use_double_precision: args.double_precision.into_bool(),
            output_file: args.output_file.clone(),
            output_raw_file: args.output_raw_file.clone(),
        })
    }
}

fn check_overwrite(output_file: &Path, overwrite: bool) -> Result<(), anyhow::Error> {
    if !overwrite && output_file.exists() {
        return Err(anyhow!(
            "Output file \"{}\" already exists. Use overwrite flag to ignore this.",
            output_file.display()
        ));
    }
    Ok(())
}

/// Result of the extraction pipeline
pub struct PipelineResult<R: Real> {
    /// The extracted surface with the welded mesh and statistics
    pub extraction: SurfaceExtraction<R>,
    /// The unwelded triangle soup, only present if requested
    pub raw_mesh: Option<RawMesh<R>>,
}

/// Runs the extraction of the field without any file IO, optionally keeping the raw triangle soup
///
/// The raw mesh is recorded during the same grid walk as the welded mesh.
pub fn extraction_pipeline<R: Real>(
    field: &dyn ScalarField<R>,
    params: &Parameters<R>,
    output_raw_mesh: bool,
) -> Result<PipelineResult<R>, anyhow::Error> {
    let params = params.clone().with_raw_mesh(output_raw_mesh);
    let mut extraction =
        isosurf_lib::extract_surface(field, &params).context("Isosurface extraction failed")?;
    let raw_mesh = extraction.take_raw_mesh();

    Ok(PipelineResult {
        extraction,
        raw_mesh,
    })
}

fn extraction_pipeline_from_args<R: Real>(args: &ExtractionRunnerArgs) -> Result<(), anyhow::Error> {
    let params: Parameters<R> = args
        .params
        .try_convert()
        .context("Unable to convert extraction parameters to the selected precision")?;
    let field = args.field.build::<R>()?;

    info!(
        "Extracting {:?} field on a region of size {:?} with cell size {:?}.",
        args.field,
        params.mesh_size.as_slice(),
        params.cell_size
    );

    let result = extraction_pipeline(field.as_ref(), &params, args.output_raw_file.is_some())?;

    let stats = result.extraction.stats();
    info!(
        "Welded {} raw vertices into {} vertices ({} triangles dropped as degenerate).",
        stats.raw_vertices, stats.welded_vertices, stats.dropped_triangles
    );

    {
        profile!("write surface mesh");
        info!("Writing surface mesh to \"{}\"...", args.output_file.display());
        io::write_mesh(result.extraction.welded_mesh(), &args.output_file).with_context(|| {
            format!(
                "Failed to write output mesh to file \"{}\"",
                args.output_file.display()
            )
        })?;
    }

    if let (Some(output_raw_file), Some(raw_mesh)) = (&args.output_raw_file, result.raw_mesh) {
        profile!("write raw mesh");
        info!("Writing raw mesh to \"{}\"...", output_raw_file.display());
        let raw_mesh = WeldedMesh {
            mesh: raw_mesh,
            normals: None,
        };
        io::write_mesh(&raw_mesh, output_raw_file).with_context(|| {
            format!(
                "Failed to write raw mesh to file \"{}\"",
                output_raw_file.display()
            )
        })?;
    }

    info!("Done.");
    Ok(())
}
