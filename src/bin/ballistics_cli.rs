use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use exterior_ballistics::{
    batch::configure_thread_pool, compare_drag_models, drag, solve_point_blank_range_with,
    solve_zero_angle_with, DragModel, PointBlankRangeResult, Projectile, SearchLimits, ShotConditions, Solution,
    TrajectoryPoint, WindConditions, ZeroSolution,
};

#[derive(Parser)]
#[command(name = "ballistics-cli")]
#[command(version)]
#[command(about = "Exterior ballistics tables, zero angles and point-blank ranges", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Worker threads for parallel commands (0 = rayon default)
    #[arg(long, default_value = "0", global = true)]
    threads: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a trajectory table in one-yard increments
    Table {
        #[command(flatten)]
        projectile: ProjectileArgs,

        /// Uphill (+) or downhill (-) shooting angle (degrees)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        shooting_angle: f64,

        /// Bore angle relative to the sight line (degrees)
        #[arg(long, default_value = "0.0", conflicts_with = "zero_range", allow_hyphen_values = true)]
        zero_angle: f64,

        /// Solve the bore angle for a zero at this range (yards) instead
        #[arg(long)]
        zero_range: Option<f64>,

        /// Wind speed (mph)
        #[arg(long, default_value = "0.0")]
        wind_speed: f64,

        /// Direction the wind comes from (degrees, 0 = headwind, 90 = from the right)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        wind_angle: f64,

        /// Bullet weight (grains)
        #[arg(long, default_value = "168")]
        weight: f64,

        /// Label for the solution
        #[arg(long, default_value = "solution")]
        name: String,

        /// Row interval (yards)
        #[arg(long, default_value = "100")]
        step: usize,

        /// Last range to print (yards)
        #[arg(long, default_value = "1000")]
        max_range: usize,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Solve the bore angle for a zero range
    Zero {
        #[command(flatten)]
        projectile: ProjectileArgs,

        /// Zero range (yards)
        #[arg(short = 'r', long, default_value = "100")]
        range: f64,

        /// Height above the sight line at the zero range (inches)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        intercept: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Solve the maximum point-blank range for a vital zone
    Pbr {
        #[command(flatten)]
        projectile: ProjectileArgs,

        /// Vital zone diameter (inches)
        #[arg(long, default_value = "10")]
        vital_zone: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Zero angle and point-blank range under every drag model
    Compare {
        #[command(flatten)]
        projectile: ProjectileArgs,

        /// Zero range (yards)
        #[arg(long, default_value = "100")]
        zero_range: f64,

        /// Vital zone diameter (inches)
        #[arg(long, default_value = "10")]
        vital_zone: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Display engine information
    Info,
}

/// Projectile flags. Unset flags fall back to `--config`, then to built-in defaults.
#[derive(Args, Debug, Clone)]
struct ProjectileArgs {
    /// JSON file with `projectile` and `limits` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drag model (G1, G2, G5, G6, G7, G8, GI, GS) [default: G1]
    #[arg(short = 'd', long)]
    drag_model: Option<DragModel>,

    /// Ballistic coefficient [default: 0.5]
    #[arg(short = 'b', long)]
    bc: Option<f64>,

    /// Muzzle velocity (ft/s) [default: 2800]
    #[arg(long)]
    velocity: Option<f64>,

    /// Sight height above bore (inches) [default: 1.5]
    #[arg(long)]
    sight_height: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    projectile: Projectile,
    limits: SearchLimits,
}

impl ProjectileArgs {
    fn resolve(&self) -> Result<(Projectile, SearchLimits), Box<dyn Error>> {
        let config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
                serde_json::from_str::<ConfigFile>(&text)
                    .map_err(|e| format!("invalid config {}: {e}", path.display()))?
            }
            None => ConfigFile::default(),
        };

        let mut projectile = config.projectile;
        if let Some(model) = self.drag_model {
            projectile.drag_model = model;
        }
        if let Some(bc) = self.bc {
            projectile.ballistic_coefficient = bc;
        }
        if let Some(velocity) = self.velocity {
            projectile.muzzle_velocity = velocity;
        }
        if let Some(sight_height) = self.sight_height {
            projectile.sight_height = sight_height;
        }

        debug!(?projectile, limits = ?config.limits, "resolved projectile");
        Ok((projectile, config.limits))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

#[derive(Debug, Serialize)]
struct TableRow {
    range_yd: usize,
    drop_in: f64,
    correction_moa: f64,
    windage_in: f64,
    windage_moa: f64,
    velocity_fps: f64,
    energy_ftlbs: f64,
    time_s: f64,
}

impl TableRow {
    fn new(point: &TrajectoryPoint, solution: &Solution) -> Self {
        Self {
            range_yd: point.range,
            drop_in: point.drop,
            correction_moa: point.correction,
            windage_in: point.windage_inches,
            windage_moa: point.windage_moa,
            velocity_fps: point.velocity,
            energy_ftlbs: solution.kinetic_energy(point.range).unwrap_or_default(),
            time_s: point.time,
        }
    }
}

#[derive(Debug, Serialize)]
struct TableReport<'a> {
    name: &'a str,
    projectile: &'a Projectile,
    conditions: &'a ShotConditions,
    weight_grains: f64,
    zero_range_yards: Option<f64>,
    termination: exterior_ballistics::Termination,
    rows: Vec<TableRow>,
}

#[derive(Debug, Serialize)]
struct CompareRow {
    drag_model: DragModel,
    zero_angle_deg: Option<f64>,
    near_zero_yd: Option<f64>,
    far_zero_yd: Option<f64>,
    min_pbr_yd: Option<f64>,
    max_pbr_yd: Option<f64>,
    sight_in_height_in: Option<f64>,
    error: Option<String>,
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    configure_thread_pool(cli.threads);

    match cli.command {
        Commands::Table {
            projectile, shooting_angle, zero_angle, zero_range, wind_speed, wind_angle,
            weight, name, step, max_range, output,
        } => {
            let (projectile, limits) = projectile.resolve()?;
            let wind = WindConditions::new(wind_speed, wind_angle);

            let solution = match zero_range {
                Some(range) => Solution::zeroed_with(name, &projectile, weight, range, shooting_angle, wind, &limits)?,
                None => {
                    let conditions = ShotConditions::new(shooting_angle, zero_angle, wind);
                    Solution::compute_with(name, &projectile, &conditions, weight, &limits)?
                }
            };

            display_table(&solution, step.max(1), max_range, output)?;
        }

        Commands::Zero { projectile, range, intercept, output } => {
            let (projectile, limits) = projectile.resolve()?;
            let solution = solve_zero_angle_with(&projectile, range, intercept, &limits, &|| false)?;
            display_zero(&projectile, range, &solution, output)?;
        }

        Commands::Pbr { projectile, vital_zone, output } => {
            let (projectile, limits) = projectile.resolve()?;
            let result = solve_point_blank_range_with(&projectile, vital_zone, &limits, &|| false)?;
            display_pbr(&projectile, vital_zone, &result, output)?;
        }

        Commands::Compare { projectile, zero_range, vital_zone, output } => {
            let (projectile, limits) = projectile.resolve()?;
            projectile.validate()?;
            let rows: Vec<CompareRow> = compare_drag_models(&projectile, zero_range, vital_zone, &limits)
                .into_iter()
                .map(|(drag_model, result)| match result {
                    Ok(c) => CompareRow {
                        drag_model,
                        zero_angle_deg: Some(c.zero_angle_deg),
                        near_zero_yd: Some(c.point_blank.near_zero),
                        far_zero_yd: Some(c.point_blank.far_zero),
                        min_pbr_yd: Some(c.point_blank.min_point_blank_range),
                        max_pbr_yd: Some(c.point_blank.max_point_blank_range),
                        sight_in_height_in: Some(c.point_blank.sight_in_height),
                        error: None,
                    },
                    Err(e) => CompareRow {
                        drag_model,
                        zero_angle_deg: None,
                        near_zero_yd: None,
                        far_zero_yd: None,
                        min_pbr_yd: None,
                        max_pbr_yd: None,
                        sight_in_height_in: None,
                        error: Some(e.to_string()),
                    },
                })
                .collect();
            display_compare(&rows, output)?;
        }

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║   EXTERIOR BALLISTICS v{:<16}║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Point-mass trajectories from the       ║");
            println!("║ standard G-series drag functions.      ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag models:                           ║");
            for model in DragModel::ALL {
                let segments = drag::drag_table(model).map_or(0, |t| t.segments().len());
                let status = if segments > 0 { format!("{segments} segments") } else { "no table".to_string() };
                println!("║ • {:<4} {:<10} {:<20}║", model.to_string(), model.name(), status);
            }
            println!("╠════════════════════════════════════════╣");
            println!("║ Commands: table, zero, pbr, compare    ║");
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn display_table(solution: &Solution, step: usize, max_range: usize, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let rows: Vec<TableRow> = solution
        .table
        .iter()
        .filter(|p| p.range % step == 0 && p.range <= max_range)
        .map(|p| TableRow::new(p, solution))
        .collect();

    match format {
        OutputFormat::Json => {
            let report = TableReport {
                name: &solution.name,
                projectile: &solution.projectile,
                conditions: &solution.conditions,
                weight_grains: solution.weight_grains,
                zero_range_yards: solution.zero_range_yards,
                termination: solution.table.termination,
                rows,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        OutputFormat::Csv => write_csv(rows)?,

        OutputFormat::Table => {
            let p = &solution.projectile;
            println!("╔════════════════════════════════════════╗");
            println!("║ {:<39}║", solution.name);
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag Model:        {:>8}            ║", p.drag_model.to_string());
            println!("║ BC:                {:>8.3}            ║", p.ballistic_coefficient);
            println!("║ Muzzle Velocity:   {:>8.1} ft/s       ║", p.muzzle_velocity);
            println!("║ Sight Height:      {:>8.2} in         ║", p.sight_height);
            println!("║ Zero Angle:        {:>8.4} deg        ║", solution.conditions.zero_angle_deg);
            if let Some(range) = solution.zero_range_yards {
                println!("║ Zero Range:        {:>8.0} yd         ║", range);
            }
            println!("╚════════════════════════════════════════╝");
            println!();
            println!("┌────────┬──────────┬──────────┬──────────┬──────────┬──────────┬──────────┐");
            println!("│ Range  │ Drop(in) │ Corr(MOA)│ Wind(in) │ Vel(fps) │ E(ftlbf) │ Time(s)  │");
            println!("├────────┼──────────┼──────────┼──────────┼──────────┼──────────┼──────────┤");
            for r in &rows {
                println!(
                    "│ {:>6} │ {:>8.2} │ {:>8.2} │ {:>8.2} │ {:>8.1} │ {:>8.1} │ {:>8.3} │",
                    r.range_yd, r.drop_in, r.correction_moa, r.windage_in, r.velocity_fps, r.energy_ftlbs, r.time_s
                );
            }
            println!("└────────┴──────────┴──────────┴──────────┴──────────┴──────────┴──────────┘");
        }
    }

    Ok(())
}

fn display_zero(projectile: &Projectile, range: f64, solution: &ZeroSolution, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(solution)?),
        OutputFormat::Csv => write_csv([solution])?,
        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║             ZERO ANGLE                 ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag Model:        {:>8}            ║", projectile.drag_model.to_string());
            println!("║ Zero Range:        {:>8.0} yd         ║", range);
            println!("║ Bore Angle:        {:>8.4} deg        ║", solution.angle_deg);
            println!("║ Bore Angle:        {:>8.2} MOA        ║", solution.angle_deg * 60.0);
            println!("║ Trials:            {:>8}            ║", solution.trials);
            println!("║ Status:            {:<20}║", format!("{:?}", solution.convergence));
            println!("╚════════════════════════════════════════╝");
        }
    }
    Ok(())
}

fn display_pbr(
    projectile: &Projectile,
    vital_zone: f64,
    result: &PointBlankRangeResult,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => write_csv([result])?,
        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         POINT BLANK RANGE              ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag Model:        {:>8}            ║", projectile.drag_model.to_string());
            println!("║ Vital Zone:        {:>8.1} in         ║", vital_zone);
            println!("║ Near Zero:         {:>8.1} yd         ║", result.near_zero);
            println!("║ Far Zero:          {:>8.1} yd         ║", result.far_zero);
            println!("║ Min PBR:           {:>8.1} yd         ║", result.min_point_blank_range);
            println!("║ Max PBR:           {:>8.1} yd         ║", result.max_point_blank_range);
            println!("║ Sight-in @100yd:   {:>8.2} in         ║", result.sight_in_height);
            println!("║ Trials:            {:>8}            ║", result.trials);
            println!("╚════════════════════════════════════════╝");
        }
    }
    Ok(())
}

fn display_compare(rows: &[CompareRow], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => write_csv(rows)?,
        OutputFormat::Table => {
            println!("┌───────┬──────────┬──────────┬──────────┬──────────┬──────────┐");
            println!("│ Model │ Zero(deg)│ Near(yd) │ Far(yd)  │ MPBR(yd) │ @100(in) │");
            println!("├───────┼──────────┼──────────┼──────────┼──────────┼──────────┤");
            for r in rows {
                match (&r.error, r.zero_angle_deg, r.near_zero_yd, r.far_zero_yd, r.max_pbr_yd, r.sight_in_height_in) {
                    (None, Some(zero), Some(near), Some(far), Some(max), Some(sight_in)) => println!(
                        "│ {:<5} │ {:>8.4} │ {:>8.1} │ {:>8.1} │ {:>8.1} │ {:>8.2} │",
                        r.drag_model.to_string(), zero, near, far, max, sight_in
                    ),
                    _ => println!(
                        "│ {:<5} │ {:<53} │",
                        r.drag_model.to_string(),
                        r.error.as_deref().unwrap_or("no result")
                    ),
                }
            }
            println!("└───────┴──────────┴──────────┴──────────┴──────────┴──────────┘");
        }
    }
    Ok(())
}
