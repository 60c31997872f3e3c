//! Deterministic synthetic call history.
//!
//! RULE: Nothing here may call any platform RNG. The whole history is a
//! pure function of (seed, start date, day count), so two runs with the
//! same arguments score and staff identical data.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use staffing_core::forecast::{growth_multiplier, DayType, DayTypeFactors};

/// Calls per 15-minute slot on a weekday, 08:00 to 17:00.
pub const WEEKDAY_PATTERN: [u32; 36] = [
    16, 12, 9, 8, //
    24, 17, 13, 11, //
    30, 21, 17, 14, //
    28, 19, 16, 13, //
    19, 13, 10, 9, //
    23, 16, 13, 10, //
    26, 18, 15, 12, //
    20, 14, 11, 9, //
    17, 12, 9, 7,
];

pub const SLOTS_PER_DAY: usize = WEEKDAY_PATTERN.len();

/// Fixed-date closures, as (month, day).
const HOLIDAYS: [(u32, u32); 13] = [
    (1, 1),
    (1, 20),
    (2, 17),
    (5, 26),
    (7, 4),
    (9, 1),
    (10, 13),
    (11, 11),
    (11, 27),
    (11, 28),
    (12, 24),
    (12, 25),
    (12, 31),
];

pub const ANNUAL_GROWTH: f64 = 0.07;
/// Slot volume is drawn uniformly within ±15% of its trended base.
const VOLUME_VARIATION: f64 = 0.15;
const AHT_RANGE: (u64, u64) = (258, 282);

/// Seeded PCG stream for the generator.
pub struct HistoryRng {
    inner: Pcg64Mcg,
}

impl HistoryRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Integer in [low, high], inclusive.
    pub fn between(&mut self, low: u64, high: u64) -> u64 {
        low + self.inner.next_u64() % (high - low + 1)
    }
}

pub fn day_type(date: NaiveDate) -> DayType {
    if HOLIDAYS.contains(&(date.month(), date.day())) {
        DayType::Holiday
    } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        DayType::Weekend
    } else {
        DayType::Weekday
    }
}

/// One day of observed intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    /// 1-based position in the generated history.
    pub day_number: u32,
    pub day_type: DayType,
    pub offered_calls: Vec<f64>,
    pub aht_seconds: Vec<f64>,
}

pub fn generate(seed: u64, start: NaiveDate, days: u32) -> Vec<DayRecord> {
    let mut rng = HistoryRng::new(seed);
    let factors = DayTypeFactors::conventional();

    (1..=days)
        .map(|day_number| {
            let date = start + Duration::days(i64::from(day_number) - 1);
            let day_type = day_type(date);
            let factor = factors.factor(day_type);
            let trend = growth_multiplier(ANNUAL_GROWTH, day_number);

            let mut offered_calls = Vec::with_capacity(SLOTS_PER_DAY);
            let mut aht_seconds = Vec::with_capacity(SLOTS_PER_DAY);
            for &base in &WEEKDAY_PATTERN {
                let slot_base = (f64::from(base) * factor).floor();
                let varied = slot_base
                    * trend
                    * rng.uniform(1.0 - VOLUME_VARIATION, 1.0 + VOLUME_VARIATION);
                offered_calls.push(varied.round().max(0.0));
                aht_seconds.push(rng.between(AHT_RANGE.0, AHT_RANGE.1) as f64);
            }

            DayRecord {
                date,
                day_number,
                day_type,
                offered_calls,
                aht_seconds,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn same_seed_same_history() {
        assert_eq!(generate(7, jan_1(), 30), generate(7, jan_1(), 30));
        assert_ne!(generate(7, jan_1(), 30), generate(8, jan_1(), 30));
    }

    #[test]
    fn calendar_classification() {
        // 2025-01-01 is a Wednesday and a holiday; the 4th is a Saturday.
        assert_eq!(day_type(jan_1()), DayType::Holiday);
        assert_eq!(day_type(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()), DayType::Weekday);
        assert_eq!(day_type(NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()), DayType::Weekend);
    }

    #[test]
    fn slots_stay_within_bounds() {
        for day in generate(42, jan_1(), 60) {
            assert_eq!(day.offered_calls.len(), SLOTS_PER_DAY);
            for (&calls, &base) in day.offered_calls.iter().zip(&WEEKDAY_PATTERN) {
                let ceiling = f64::from(base) * growth_multiplier(ANNUAL_GROWTH, day.day_number) * 1.15;
                assert!(calls >= 0.0 && calls <= ceiling.round(), "{calls} > {ceiling}");
            }
            for &aht in &day.aht_seconds {
                assert!((258.0..=282.0).contains(&aht));
            }
        }
    }
}
