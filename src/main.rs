extern crate energy_predictor;

use clap::{Args, Parser, Subcommand};
use energy_predictor::core::accuracy::AccuracySummary;
use energy_predictor::core::prediction::{PredictionEngine, ThermalInputs};
use energy_predictor::core::units::{
    celsius_delta_to_fahrenheit, celsius_to_fahrenheit, watts_to_kilowatts, PERCENT,
};
use energy_predictor::{run_prediction, PredictionOutcome, PredictorConfig};
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct PredictorArgs {
    #[arg(
        long,
        short,
        global = true,
        help = "Path to predictor configuration file in .json format"
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Directory holding the training dataset and report log, overriding the configuration"
    )]
    data_dir: Option<PathBuf>,
    #[clap(
        long,
        short,
        global = true,
        default_value_t = false,
        help = "Whether to log debug output"
    )]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Make an energy usage prediction and log it for model training
    Predict(PredictArgs),
    /// Summarise how predictions compare with actual usage
    Accuracy,
    /// Show the prediction report log
    History,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[arg(long, allow_negative_numbers = true, help = "Outdoor temperature (°C)")]
    outdoor: f64,
    #[arg(long, allow_negative_numbers = true, help = "Desired indoor temperature (°C)")]
    indoor: f64,
    #[arg(long, help = "Building floor area (m²)")]
    area: f64,
    #[arg(long, help = "Insulation quality rating (1-10, 10=excellent)")]
    insulation: f64,
    #[arg(long, help = "Time period (hours)")]
    hours: f64,
    #[arg(long, help = "Actual usage over the period, if known (kWh)")]
    actual: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let args = PredictorArgs::parse();

    // set up basic tracing
    let tracing_subscriber = tracing_subscriber::fmt::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(tracing_subscriber)
        .expect("setting tracing subscriber failed");

    let mut config = match &args.config {
        Some(path) => PredictorConfig::from_json(BufReader::new(File::open(path)?))?,
        None => PredictorConfig::default(),
    };
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_directory(data_dir);
    }

    match args.command {
        Command::Predict(predict_args) => predict(&config, predict_args),
        Command::Accuracy => accuracy(&config),
        Command::History => history(&config),
    }
}

fn predict(config: &PredictorConfig, args: PredictArgs) -> anyhow::Result<()> {
    let inputs = ThermalInputs::new(
        args.outdoor,
        args.indoor,
        args.area,
        args.insulation,
        args.hours,
    )?;
    fs::create_dir_all(&config.data_directory)?;

    let engine = PredictionEngine::from_config(config);
    let PredictionOutcome {
        features,
        result,
        evaluation,
        record,
    } = run_prediction(
        &engine,
        &config.prediction_store(),
        &config.report_log(),
        &inputs,
        args.actual,
    )?;

    println!("\nBuilding Analysis:");
    println!(
        "   Outdoor temperature: {:.1}°C ({:.1}°F)",
        inputs.outdoor_temp_c(),
        celsius_to_fahrenheit(inputs.outdoor_temp_c())
    );
    println!(
        "   Temperature difference: {:.1}°C ({:.1}°F)",
        features.temp_diff_c,
        celsius_delta_to_fahrenheit(features.temp_diff_c)
    );
    println!("   Mode: {}", features.mode);
    println!("   Derived U-value: {:.3} W/m²·K", features.u_value);
    println!("   Building envelope: {:.0}m²", inputs.area_m2());

    println!("\nPrediction Results:");
    println!(
        "   Thermal load: {:.0} W ({:.2} kW)",
        result.thermal_load_w,
        watts_to_kilowatts(result.thermal_load_w)
    );
    println!(
        "   System efficiency: {:.0}%",
        result.system_efficiency * PERCENT
    );
    println!(
        "   Electrical power needed: {:.2} kW",
        result.electrical_power_kw
    );
    println!("   Base building load: {:.2} kW", result.base_load_kw);
    println!("   Total power demand: {:.2} kW", result.total_power_kw);
    println!(
        "   Predicted energy usage: {:.2} kWh over {:.1} hours",
        result.predicted_kwh,
        inputs.duration_hours()
    );
    println!(
        "   Estimated cost ({}/kWh): {:.2}",
        engine.unit_rate(),
        result.estimated_cost
    );

    if let Some(actual_kwh) = record.actual_kwh {
        println!("\nModel Validation:");
        println!("   Actual usage: {actual_kwh:.2} kWh");
        match evaluation {
            Ok(Some(evaluation)) => {
                println!(
                    "   Prediction error: {:.2} kWh ({:.1}%)",
                    evaluation.error_kwh, evaluation.percentage_error
                );
                println!("   Model accuracy: {:.1}%", evaluation.accuracy);
            }
            Ok(None) => {}
            Err(e) => println!("   Evaluation unavailable: {e}"),
        }
    }
    println!("   Data logged for ML model training!");

    Ok(())
}

fn accuracy(config: &PredictorConfig) -> anyhow::Result<()> {
    let mut records = config.prediction_store().read_all()?;
    let records_read = records.by_ref().collect::<Vec<_>>();
    if records.skipped_rows() > 0 {
        warn!(
            "{} malformed rows were skipped while reading the dataset",
            records.skipped_rows()
        );
    }
    let total = records_read.len();

    let Some(summary) = AccuracySummary::from_records(records_read) else {
        println!("No actual vs predicted data yet. Supply actual usage with predictions!");
        return Ok(());
    };

    println!("\nModel Performance:");
    println!(
        "Average error: {:.2} kWh",
        summary.mean_absolute_error_kwh
    );
    println!(
        "Median error: {:.2} kWh",
        summary.median_absolute_error_kwh
    );
    match summary.mean_accuracy {
        Some(mean_accuracy) => println!("Average accuracy: {mean_accuracy:.1}%"),
        None => println!("Average accuracy: unavailable"),
    }
    if summary.undefined_count > 0 {
        println!(
            "Predictions that could not be scored: {}",
            summary.undefined_count
        );
    }
    println!(
        "Total predictions with actual data: {} (of {total})",
        summary.labelled_count()
    );

    Ok(())
}

fn history(config: &PredictorConfig) -> anyhow::Result<()> {
    let entries = config.report_log().read_entries()?;
    if entries.is_empty() {
        println!("No prediction history yet!");
        return Ok(());
    }

    println!("\n--- Prediction History ---");
    for entry in entries {
        println!("{entry}");
    }
    println!("--- End ---");

    Ok(())
}
