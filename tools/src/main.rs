//! staffing-runner: end-to-end planning run over synthetic call history.
//!
//! Fits a seasonal forecast on the training days, scores it and two
//! smoothing models against a holdout, staffs the holdout from the
//! seasonal forecast and evaluates that schedule against the volume
//! that actually arrived.
//!
//! Usage:
//!   staffing-runner --seed 42 --days 365 --holdout 28
//!   staffing-runner --config planning.json --json

mod history;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use history::{DayRecord, ANNUAL_GROWTH, SLOTS_PER_DAY};
use serde::Serialize;
use staffing_core::{
    erlang::square_root_staffing,
    forecast::{
        DayContext, DayType, DayTypeFactors, ExponentialSmoothing, ForecastModel, HoltWinters,
        HoltWintersParams, SeasonalLayers, SeasonalModel, Z_95,
    },
    summary::StaffingSummary,
    AccuracyAccumulator, AccuracyReport, AccuracyScorer, ErlangEngine, IntervalDemand,
    PlanningConfig, StaffingInput,
};
use std::env;

const SMOOTHING_ALPHA: f64 = 0.3;
const HOLT_WINTERS: HoltWintersParams = HoltWintersParams {
    alpha: 0.2,
    beta: 0.01,
    gamma: 0.1,
};

#[derive(Serialize)]
struct RunReport {
    seed: u64,
    days: u32,
    holdout_days: u32,
    service_target: String,
    shrinkage: f64,
    seasonal_accuracy: AccuracyReport,
    smoothing_accuracy: AccuracyReport,
    holt_winters_accuracy: AccuracyReport,
    /// Share of holdout slots whose actual volume fell inside the 95% band.
    holt_winters_band_coverage: f64,
    peak_square_root_agents: u32,
    scheduled_agent_hours: f64,
    summary: StaffingSummary,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 365u32);
    let holdout = parse_arg(&args, "--holdout", 28u32);
    let json = args.iter().any(|a| a == "--json");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => PlanningConfig::load(path)?,
        None => PlanningConfig::default_test(),
    };

    if !json {
        println!("staffing-runner");
        println!("  seed:      {seed}");
        println!("  days:      {days}");
        println!("  holdout:   {holdout}");
        println!("  config:    {}", config_path.unwrap_or("(built-in)"));
        println!("  target:    {}", config.service_target);
        println!("  shrinkage: {:.0}%", config.shrinkage * 100.0);
        println!();
    }

    let report = run(seed, days, holdout, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run(seed: u64, days: u32, holdout: u32, config: &PlanningConfig) -> Result<RunReport> {
    if holdout == 0 || holdout >= days {
        bail!("holdout must be between 1 and {} days, got {holdout}", days.saturating_sub(1));
    }
    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("bad start date"))?;
    let history = history::generate(seed, start, days);
    let (training, test) = history.split_at((days - holdout) as usize);

    // Seasonal shape comes from weekdays only; other day types are layered on.
    let weekday_volume: Vec<f64> = training
        .iter()
        .filter(|d| d.day_type == DayType::Weekday)
        .flat_map(|d| d.offered_calls.iter().copied())
        .collect();
    let factors = DayTypeFactors::conventional();
    let seasonal = SeasonalModel::fit(&weekday_volume, SLOTS_PER_DAY)?.with_layers(SeasonalLayers {
        annual_growth: ANNUAL_GROWTH,
        day_factors: factors,
    });
    log::info!(
        "fitted {} on {} weekday slots, base {:.2}",
        seasonal.name(),
        seasonal.fitted().len(),
        seasonal.base()
    );

    let smoothing = slot_smoothing(training)?;
    let holt_winters = HoltWinters::fit(&weekday_volume, SLOTS_PER_DAY, HOLT_WINTERS)?;
    // Holdout days are forecast as consecutive weekday-shaped days and
    // scaled by their day type, like the seasonal layers.
    let hw_bands = holt_winters.forecast_bands(test.len() * SLOTS_PER_DAY, Z_95);
    let planning_aht = mean_aht(training);

    let engine = ErlangEngine::new(config.service_target)?;
    let scorer = AccuracyScorer::new();
    let mut seasonal_acc = AccuracyAccumulator::new();
    let mut smoothing_acc = AccuracyAccumulator::new();
    let mut holt_winters_acc = AccuracyAccumulator::new();
    let mut covered = 0usize;
    let mut intervals = Vec::with_capacity(test.len() * SLOTS_PER_DAY);
    let mut peak_square_root_agents = 0;
    let mut scheduled_total = 0.0;

    for (offset, day) in test.iter().enumerate() {
        let context = DayContext {
            day_number: offset as u32 + 1,
            day_type: day.day_type,
            event_multiplier: 1.0,
        };
        let factor = factors.factor(day.day_type);
        let forecast = seasonal.forecast_day(&context)?;
        let baseline: Vec<f64> = smoothing.iter().map(|m| m.level() * factor).collect();

        let day_bands = &hw_bands[offset * SLOTS_PER_DAY..(offset + 1) * SLOTS_PER_DAY];
        let hw_points: Vec<f64> = day_bands.iter().map(|b| b.point * factor).collect();
        covered += day_bands
            .iter()
            .zip(&day.offered_calls)
            .filter(|(band, actual)| (band.lower * factor..=band.upper * factor).contains(*actual))
            .count();

        seasonal_acc.merge(&scorer.accumulate(&day.offered_calls, &forecast)?);
        smoothing_acc.merge(&scorer.accumulate(&day.offered_calls, &baseline)?);
        holt_winters_acc.merge(&scorer.accumulate(&day.offered_calls, &hw_points)?);

        for slot in 0..SLOTS_PER_DAY {
            let planned = IntervalDemand::new(forecast[slot], planning_aht, config.interval_seconds)?;
            let required = engine.required_agents(planned.traffic(), planning_aht)?;
            let scheduled = gross_up(required, config.shrinkage);
            scheduled_total += scheduled;
            peak_square_root_agents =
                peak_square_root_agents.max(square_root_staffing(planned.traffic(), config.k_factor)?);

            let actual = IntervalDemand::new(
                day.offered_calls[slot],
                day.aht_seconds[slot],
                config.interval_seconds,
            )?;
            intervals.push((actual, StaffingInput::new(scheduled, config.shrinkage)?));
        }
    }

    let outcomes = engine.evaluate_all_parallel(&intervals)?;
    let summary = StaffingSummary::from_outcomes(&outcomes, config);
    log::info!(
        "evaluated {} intervals, {} understaffed",
        summary.intervals,
        summary.understaffed_intervals
    );

    Ok(RunReport {
        seed,
        days,
        holdout_days: holdout,
        service_target: config.service_target.to_string(),
        shrinkage: config.shrinkage,
        seasonal_accuracy: seasonal_acc.finish()?,
        smoothing_accuracy: smoothing_acc.finish()?,
        holt_winters_accuracy: holt_winters_acc.finish()?,
        holt_winters_band_coverage: covered as f64 / intervals.len() as f64,
        peak_square_root_agents,
        scheduled_agent_hours: scheduled_total * config.interval_seconds / 3600.0,
        summary,
    })
}

/// One smoothing model per slot, fitted on that slot's weekday history.
fn slot_smoothing(training: &[DayRecord]) -> Result<Vec<ExponentialSmoothing>> {
    let weekdays: Vec<&DayRecord> = training
        .iter()
        .filter(|d| d.day_type == DayType::Weekday)
        .collect();
    (0..SLOTS_PER_DAY)
        .map(|slot| {
            let series: Vec<f64> = weekdays.iter().map(|d| d.offered_calls[slot]).collect();
            Ok(ExponentialSmoothing::fit(&series, SMOOTHING_ALPHA)?)
        })
        .collect()
}

fn mean_aht(training: &[DayRecord]) -> f64 {
    let (sum, count) = training
        .iter()
        .flat_map(|d| d.aht_seconds.iter())
        .fold((0.0, 0usize), |(s, c), aht| (s + aht, c + 1));
    sum / count.max(1) as f64
}

/// Headcount to schedule so that `required` agents remain after shrinkage.
fn gross_up(required: u32, shrinkage: f64) -> f64 {
    (f64::from(required) / (1.0 - shrinkage)).ceil()
}

fn print_report(report: &RunReport) {
    println!("=== FORECAST ACCURACY (holdout) ===");
    println!("seasonal model:");
    println!("{}", report.seasonal_accuracy);
    print_grade(&report.seasonal_accuracy);
    println!("exponential smoothing baseline:");
    println!("{}", report.smoothing_accuracy);
    print_grade(&report.smoothing_accuracy);
    println!("holt-winters:");
    println!("{}", report.holt_winters_accuracy);
    print_grade(&report.holt_winters_accuracy);
    println!(
        "  95% band coverage: {:.1}%",
        report.holt_winters_band_coverage * 100.0
    );

    let s = &report.summary;
    println!();
    println!("=== STAFFING SUMMARY ===");
    println!("  intervals:           {}", s.intervals);
    println!("  understaffed:        {}", s.understaffed_intervals);
    println!("  below target:        {}", s.below_target_intervals);
    println!("  no agent count fits: {}", s.unsolved_intervals);
    println!("  high occupancy:      {}", s.high_occupancy_intervals);
    println!("  low occupancy:       {}", s.low_occupancy_intervals);
    println!("  avg service level:   {}", percent(s.average_service_level));
    println!(
        "  avg ASA:             {}",
        s.average_asa_seconds
            .map(|v| format!("{v:.1}s"))
            .unwrap_or_else(|| "n/a".into())
    );
    println!("  avg occupancy:       {}", percent(s.average_occupancy));
    println!("  total gap:           {:+.1} agents", s.total_staffing_gap);
    println!("  peak required:       {}", s.peak_required_agents);
    println!("  peak sqrt-rule:      {}", report.peak_square_root_agents);
    println!("  required hours:      {:.1}", s.required_agent_hours);
    println!("  scheduled hours:     {:.1}", report.scheduled_agent_hours);
}

fn print_grade(report: &AccuracyReport) {
    match report.grade() {
        Some(grade) => println!("  grade: {grade:?}"),
        None => println!("  grade: n/a"),
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "n/a".into())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gross_up_covers_shrinkage() {
        assert_eq!(gross_up(11, 0.25), 15.0);
        assert_eq!(gross_up(0, 0.25), 0.0);
        assert_eq!(gross_up(9, 0.0), 9.0);
    }

    #[test]
    fn parse_arg_falls_back_to_default() {
        let args: Vec<String> = ["runner", "--seed", "7", "--days", "x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parse_arg(&args, "--seed", 42u64), 7);
        assert_eq!(parse_arg(&args, "--days", 365u32), 365);
        assert_eq!(parse_arg(&args, "--holdout", 28u32), 28);
    }

    #[test]
    fn run_is_reproducible() {
        let config = PlanningConfig::default_test();
        let a = run(11, 120, 14, &config).unwrap();
        let b = run(11, 120, 14, &config).unwrap();
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.seasonal_accuracy, b.seasonal_accuracy);
        assert_eq!(a.summary.intervals, 14 * SLOTS_PER_DAY);
        assert_eq!(a.seasonal_accuracy.periods, 14 * SLOTS_PER_DAY);
        assert_eq!(a.holt_winters_accuracy, b.holt_winters_accuracy);
        assert!((0.0..=1.0).contains(&a.holt_winters_band_coverage));
    }

    #[test]
    fn run_rejects_bad_holdout() {
        let config = PlanningConfig::default_test();
        assert!(run(1, 30, 0, &config).is_err());
        assert!(run(1, 30, 30, &config).is_err());
    }
}
