//! Forecast one hydrological year of simulated daily precipitation.
//!
//! ```text
//! cargo run --example precipitation_report [config.toml] [--json]
//! RUST_LOG=cfcycle=debug cargo run --example precipitation_report
//! ```

use cfcycle::simulation::{simulate_precipitation, PrecipitationModel};
use cfcycle::{pipeline, PipelineConfig};
use chrono::NaiveDate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cfcycle=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");
    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::hydrological(),
    };

    let start = NaiveDate::from_ymd_opt(2000, 10, 1).ok_or("invalid start date")?;
    let model = PrecipitationModel {
        annual_trend: 0.01,
        ..PrecipitationModel::default()
    };
    let series = simulate_precipitation(start, 10 * 365 + 2, &model, 42)?;
    let report = pipeline::run(&series, &config)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Training days:        {}", report.decomposition.trend.len());
    println!("Forecast days:        {}", report.forecast.len());
    println!(
        "Transform:            mean={:.3} sd={:.3}",
        report.transform.mean, report.transform.std_dev
    );
    println!(
        "Trend band:           [{:.1}, {:.1}] days",
        report.bands.trend.period_low, report.bands.trend.period_high
    );
    println!(
        "Seasonal band:        [{:.1}, {:.1}] days",
        report.bands.seasonal.period_low, report.bands.seasonal.period_high
    );
    if let Some(p) = report.dominant_period {
        println!("Dominant period:      {:.1} days", p);
    }
    println!(
        "Seasonal variance:    {:.1}%",
        100.0 * report.seasonal_power_fraction
    );

    if let Some(acc) = report.accuracy {
        println!();
        println!("Accuracy over {} held-out days", acc.n);
        println!("  ME    {:>10.4}", acc.me);
        println!("  MSE   {:>10.4}", acc.mse);
        println!("  RMSE  {:>10.4}", acc.rmse);
        println!("  MAE   {:>10.4}", acc.mae);
        match (acc.mpe, acc.mape) {
            (Some(mpe), Some(mape)) => {
                println!("  MPE   {:>10.2}%", mpe);
                println!("  MAPE  {:>10.2}%", mape);
            }
            _ => println!("  MPE/MAPE undefined: every observation is zero"),
        }
        println!("  ({} dry days excluded from MPE/MAPE)", acc.zero_observations);
    }

    Ok(())
}
