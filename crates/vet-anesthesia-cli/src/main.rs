use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vet_anesthesia_core::calculator::{self, round2, InfusionDuration};
use vet_anesthesia_core::{
    Concentration, ConcentrationUnit, Config, Database, DeliverySet, DoseUnit,
    PrescriptionExporter,
};

#[derive(Parser, Debug)]
#[command(name = "vet-anesthesia")]
#[command(about = "Veterinary anesthesia dose and infusion calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Volume of a single bolus
    Bolus {
        /// Patient weight in kg
        #[arg(long)]
        weight: f64,

        /// Dose per kg
        #[arg(long)]
        dose: f64,

        #[arg(long, default_value = "mg/kg")]
        dose_unit: DoseUnit,

        /// Stock concentration
        #[arg(long)]
        concentration: f64,

        #[arg(long, default_value = "mg/mL")]
        concentration_unit: ConcentrationUnit,
    },

    /// Flow rate of a drug constant-rate infusion
    Cri {
        /// Patient weight in kg
        #[arg(long)]
        weight: f64,

        /// Dose rate per kg
        #[arg(long)]
        dose: f64,

        #[arg(long, default_value = "µg/kg/min")]
        dose_unit: DoseUnit,

        /// Stock concentration
        #[arg(long)]
        concentration: f64,

        #[arg(long, default_value = "mg/mL")]
        concentration_unit: ConcentrationUnit,

        /// Bag or syringe volume in mL (defaults to the configured bag)
        #[arg(long)]
        bag: Option<f64>,

        /// Delivery set: macro or micro (defaults to the configured set)
        #[arg(long)]
        set: Option<DeliverySet>,
    },

    /// Fluid rate, drip rate and duration for a patient
    Fluids {
        /// Patient weight in kg
        #[arg(long)]
        weight: f64,

        /// Rate in mL/kg/h (defaults to the configured rate)
        #[arg(long)]
        rate: Option<f64>,

        /// Bag volume in mL (defaults to the configured bag)
        #[arg(long)]
        bag: Option<f64>,

        /// Delivery set: macro or micro (defaults to the configured set)
        #[arg(long)]
        set: Option<DeliverySet>,
    },

    /// Drug and diluent volumes for a prepared reservoir
    Reservoir {
        /// Dose per kg, in the concentration's mass unit
        #[arg(long)]
        dose: f64,

        /// Patient weight in kg
        #[arg(long)]
        weight: f64,

        /// Reservoir volume in mL
        #[arg(long)]
        reservoir: f64,

        /// Stock concentration
        #[arg(long)]
        concentration: f64,
    },

    /// Hours until a bag runs out
    Duration {
        /// Bag volume in mL
        #[arg(long)]
        bag: f64,

        /// Flow rate in mL/h
        #[arg(long)]
        flow: f64,
    },

    /// Prescription for a recorded session
    Prescription {
        /// Session ID (registered or walk-in)
        #[arg(long)]
        session: String,

        /// Database path (defaults to the configured database)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Save the prescription into the configured output directory
        #[arg(long, conflicts_with = "json")]
        save: bool,

        /// Save the prescription into this directory instead
        #[arg(long, conflicts_with = "json")]
        out: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    vet_anesthesia_core::logging::init_with_level(level);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };

    let output = run(cli.command, &config)?;
    print!("{}", output);
    Ok(())
}

fn run(command: Commands, config: &Config) -> Result<String> {
    match command {
        Commands::Bolus {
            weight,
            dose,
            dose_unit,
            concentration,
            concentration_unit,
        } => cmd_bolus(weight, dose, dose_unit, concentration, concentration_unit),
        Commands::Cri {
            weight,
            dose,
            dose_unit,
            concentration,
            concentration_unit,
            bag,
            set,
        } => cmd_cri(
            weight,
            dose,
            dose_unit,
            concentration,
            concentration_unit,
            bag.unwrap_or(config.infusion.bag_volume_ml),
            set.unwrap_or(config.infusion.delivery_set),
        ),
        Commands::Fluids {
            weight,
            rate,
            bag,
            set,
        } => cmd_fluids(
            weight,
            rate.unwrap_or(config.infusion.rate_ml_per_kg_per_hour),
            bag.unwrap_or(config.infusion.bag_volume_ml),
            set.unwrap_or(config.infusion.delivery_set),
        ),
        Commands::Reservoir {
            dose,
            weight,
            reservoir,
            concentration,
        } => cmd_reservoir(dose, weight, reservoir, concentration),
        Commands::Duration { bag, flow } => cmd_duration(bag, flow),
        Commands::Prescription {
            session,
            db,
            save,
            out,
            json,
        } => {
            let db_path = db.unwrap_or_else(|| config.database.path.clone());
            let out = out.or_else(|| save.then(|| config.prescription.output_dir.clone()));
            cmd_prescription(&db_path, &session, out, json)
        }
    }
}

fn cmd_bolus(
    weight: f64,
    dose: f64,
    dose_unit: DoseUnit,
    concentration: f64,
    concentration_unit: ConcentrationUnit,
) -> Result<String> {
    let concentration = Concentration::new(concentration, concentration_unit);
    let volume = calculator::compute_bolus_volume(weight, dose, dose_unit, concentration)?;
    Ok(format!("Bolus volume: {:.2} mL\n", volume))
}

fn cmd_cri(
    weight: f64,
    dose: f64,
    dose_unit: DoseUnit,
    concentration: f64,
    concentration_unit: ConcentrationUnit,
    bag: f64,
    set: DeliverySet,
) -> Result<String> {
    let concentration = Concentration::new(concentration, concentration_unit);
    let flow = calculator::compute_continuous_infusion_rate(weight, dose, dose_unit, concentration)?;
    let plan = calculator::plan_infusion(bag, flow, set)?;
    Ok(describe_plan(&plan))
}

fn cmd_fluids(weight: f64, rate: f64, bag: f64, set: DeliverySet) -> Result<String> {
    let flow = calculator::compute_fluid_rate(weight, rate)?;
    let plan = calculator::plan_infusion(bag, flow, set)?;
    Ok(describe_plan(&plan))
}

fn cmd_reservoir(dose: f64, weight: f64, reservoir: f64, concentration: f64) -> Result<String> {
    let preparation =
        calculator::compute_drug_volume_for_reservoir(dose, weight, reservoir, concentration)?;
    Ok(format!(
        "Drug volume: {:.2} mL\nDiluent volume: {:.2} mL\nReservoir: {:.2} mL\n",
        preparation.drug_volume_ml, preparation.diluent_volume_ml, preparation.reservoir_volume_ml
    ))
}

fn cmd_duration(bag: f64, flow: f64) -> Result<String> {
    let hours = calculator::compute_infusion_duration(bag, flow)?;
    Ok(format!(
        "Duration: {:.2} h ({})\n",
        round2(hours),
        InfusionDuration::from_hours(hours)
    ))
}

fn cmd_prescription(
    db_path: &Path,
    session_id: &str,
    out: Option<PathBuf>,
    json: bool,
) -> Result<String> {
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let prescription = PrescriptionExporter::new(&db).for_session(session_id)?;

    if json {
        return Ok(format!("{}\n", prescription.to_json()?));
    }
    match out {
        Some(dir) => {
            let path = prescription.write_to_dir(&dir)?;
            Ok(format!("Prescription saved to {}\n", path.display()))
        }
        None => Ok(prescription.to_text()),
    }
}

fn describe_plan(plan: &calculator::InfusionPlan) -> String {
    let rounded = plan.rounded();
    let mut out = String::new();
    out.push_str(&format!("Flow rate: {:.2} mL/h\n", rounded.flow_ml_per_hour));
    out.push_str(&format!(
        "Drip rate: {:.2} drops/min ({} set, {} drops/mL)\n",
        rounded.drip_rate_per_minute,
        rounded.delivery_set.as_str(),
        rounded.delivery_set.drop_factor()
    ));
    out.push_str(&format!(
        "Duration of {} mL: {:.2} h ({})\n",
        rounded.bag_volume_ml,
        rounded.duration_hours,
        plan.duration()
    ));
    out
}
