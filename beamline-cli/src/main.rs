use beamline_core::{
    integrator_set, track_particle, BendGeometry, EquationOfMotion, FieldInfo, FieldType,
    IntegratorSet, MagnetStrength, ParaxialCriterion, ParticleCoords, ParticleCoordsFull,
    ParticleDefinition, PoleFace, ThinElementLength, ThresholdComparison, TrackingContext,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "beamline")]
#[command(about = "Track a particle through a single beamline magnet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track one particle through a magnet and print its coordinates after each step
    Track(TrackArgs),
    /// List the integrator sets and the integrator each uses per field type
    Sets {
        /// Only show this set
        name: Option<String>,
    },
}

#[derive(clap::Args)]
struct TrackArgs {
    /// Field type of the magnet (dipole, dipolequadrupole, quadrupole, ...)
    #[arg(long, default_value = "dipole")]
    field: String,
    /// Integrator set
    #[arg(long, default_value = "default")]
    set: String,
    /// Arc length of the magnet (m); a dipolefringe element is tracked over the
    /// thin element length with the field of this bend
    #[arg(long, default_value_t = 1.0)]
    length: f64,
    /// Bending angle (rad)
    #[arg(long, default_value_t = 0.0)]
    angle: f64,
    /// Normalised strength as key=value, e.g. k1=0.2; repeatable
    #[arg(long = "strength", value_name = "KEY=VALUE")]
    strengths: Vec<String>,
    /// Entrance pole face angle (rad)
    #[arg(long, default_value_t = 0.0)]
    e1: f64,
    /// Exit pole face angle (rad)
    #[arg(long, default_value_t = 0.0)]
    e2: f64,
    /// Fringe field integral
    #[arg(long, default_value_t = 0.0)]
    fint: f64,
    /// Half gap of the magnet (m)
    #[arg(long, default_value_t = 0.0)]
    hgap: f64,
    /// Use the exit face for fringe integrators
    #[arg(long)]
    exit_face: bool,
    /// Particle species (proton, e-, e+)
    #[arg(long, default_value = "proton")]
    particle: String,
    /// Total energy of the tracked particle (GeV)
    #[arg(long, default_value_t = 10.0)]
    energy: f64,
    /// Design rigidity (T.m); defaults to that of the tracked particle
    #[arg(long, allow_negative_numbers = true)]
    brho: Option<f64>,
    /// Number of fixed steps through the magnet
    #[arg(long, default_value_t = 10)]
    steps: usize,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f64,
    /// Horizontal slope px/pz
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    xp: f64,
    /// Vertical slope py/pz
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yp: f64,
    /// Minimum radius of curvature for matrix transport (m)
    #[arg(long)]
    min_radius: Option<f64>,
    /// Fall back when the radius equals the minimum as well
    #[arg(long)]
    inclusive: bool,
    /// Length of the thin fringe elements (m)
    #[arg(long)]
    thin_length: Option<f64>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Track(args) => run_track(&args),
        Commands::Sets { name } => list_sets(name.as_deref()),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn parse_strengths(pairs: &[String]) -> Result<MagnetStrength, Box<dyn std::error::Error>> {
    let mut strength = MagnetStrength::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("strength \"{}\" is not of the form key=value", pair))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("strength \"{}\" has a non-numeric value", pair))?;
        strength.set_by_name(key.trim(), value)?;
    }
    Ok(strength)
}

fn build_context(args: &TrackArgs) -> Result<TrackingContext, Box<dyn std::error::Error>> {
    let mut builder = TrackingContext::builder().paraxial(ParaxialCriterion {
        comparison: if args.inclusive {
            ThresholdComparison::Inclusive
        } else {
            ThresholdComparison::Strict
        },
        ..ParaxialCriterion::default()
    });
    if let Some(radius) = args.min_radius {
        builder = builder.minimum_radius_of_curvature(radius);
    }
    if let Some(length) = args.thin_length {
        builder = builder.thin_element_length(Arc::new(ThinElementLength::fixed(length)));
    }
    Ok(builder.build()?)
}

fn run_track(args: &TrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let set = integrator_set(&args.set)?;
    let field_type: FieldType = args.field.parse()?;
    let particle = ParticleDefinition::by_name(&args.particle)
        .ok_or_else(|| format!("unknown particle \"{}\"", args.particle))?;
    if args.energy <= particle.mass {
        return Err(format!(
            "total energy {} GeV is not above the {} rest mass {} GeV",
            args.energy, particle.name, particle.mass
        )
        .into());
    }

    let momentum = particle.momentum(args.energy);
    // design rigidity carries the sign of the particle charge
    let brho = args.brho.unwrap_or_else(|| {
        particle.charge.signum() * EquationOfMotion::new(particle.charge).rigidity(momentum)
    });
    let geometry = BendGeometry::sector(args.length, args.angle)
        .with_pole_faces(args.e1, args.e2)
        .with_fringe(args.fint, args.hgap);
    let info = FieldInfo::new(field_type, brho, parse_strengths(&args.strengths)?, geometry)
        .with_pole_face(if args.exit_face {
            PoleFace::Exit
        } else {
            PoleFace::Entrance
        });
    let context = build_context(args)?;

    let norm = (1.0 + args.xp * args.xp + args.yp * args.yp).sqrt();
    let start = ParticleCoordsFull {
        local: ParticleCoords {
            x: args.x,
            y: args.y,
            z: 0.0,
            xp: args.xp / norm,
            yp: args.yp / norm,
            zp: 1.0 / norm,
            t: 0.0,
        },
        s: 0.0,
        total_energy: args.energy,
        weight: 1.0,
    };

    println!("{}", start);
    for coords in track_particle(&info, set, &particle, &start, args.steps, &context)? {
        println!("{}", coords);
    }

    Ok(())
}

fn list_sets(name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match name {
        Some(name) => print!("{}", integrator_set(name)?),
        None => {
            for set in IntegratorSet::ALL {
                print!("{}", set);
            }
        }
    }
    Ok(())
}
