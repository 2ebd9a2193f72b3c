//! Synthetic Grid Data
//!
//! Normal operation: voltage ~ N(230, 5) V, current ~ N(10, 2) A.
//! A fault (8% of rows) drops voltage by U(30, 60) V and raises current
//! by U(3, 8) A. Values are rounded to 2 decimals, readings are spaced
//! 5 minutes apart and end at the given instant.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::record::LabeledReading;
use crate::constants::{DEFAULT_FAULT_RATE, SIMULATION_STEP_MINUTES, ZONES};
use crate::logic::fault::FaultType;
use crate::logic::telemetry::Reading;

const VOLTAGE_MEAN: f64 = 230.0;
const VOLTAGE_STD: f64 = 5.0;
const CURRENT_MEAN: f64 = 10.0;
const CURRENT_STD: f64 = 2.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `end` moved back by `steps` simulation steps, saturating at the earliest instant
fn steps_before(end: DateTime<Utc>, steps: usize) -> DateTime<Utc> {
    i64::try_from(steps)
        .ok()
        .and_then(|steps| steps.checked_mul(SIMULATION_STEP_MINUTES))
        .and_then(Duration::try_minutes)
        .and_then(|offset| end.checked_sub_signed(offset))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `n` labeled readings ending now
pub fn generate(n: usize, seed: u64) -> Vec<LabeledReading> {
    generate_at(n, seed, Utc::now())
}

/// `n` labeled readings, the last one stamped `end`
pub fn generate_at(n: usize, seed: u64, end: DateTime<Utc>) -> Vec<LabeledReading> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n)
        .map(|i| {
            let mut voltage = VOLTAGE_MEAN + VOLTAGE_STD * rng.sample::<f64, _>(StandardNormal);
            let mut current = CURRENT_MEAN + CURRENT_STD * rng.sample::<f64, _>(StandardNormal);

            let mut fault = FaultType::Ok;
            if rng.gen_bool(DEFAULT_FAULT_RATE) {
                fault = *FaultType::FAULTS.choose(&mut rng).unwrap_or(&FaultType::ShortCircuit);
                voltage -= rng.gen_range(30.0..60.0);
                current += rng.gen_range(3.0..8.0);
            }

            let zone = ZONES.choose(&mut rng).copied().unwrap_or("Nord");
            let power = round2(voltage * current / 1000.0);
            let timestamp = steps_before(end, n - 1 - i);

            let mut reading = Reading::new(zone, round2(voltage), round2(current), timestamp);
            // stored like the field exports: power rounded from unrounded measurements
            reading.power = power;

            LabeledReading::new(reading, fault)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deterministic_for_seed() {
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(generate_at(50, 3, end), generate_at(50, 3, end));
        assert_ne!(generate_at(50, 3, end), generate_at(50, 4, end));
    }

    #[test]
    fn test_timestamps_spaced_and_ending_at_end() {
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let rows = generate_at(10, 1, end);
        assert_eq!(rows.last().unwrap().reading.timestamp, end);
        for pair in rows.windows(2) {
            assert_eq!(pair[1].reading.timestamp - pair[0].reading.timestamp, Duration::minutes(5));
        }
    }

    #[test]
    fn test_fault_rate_and_shape() {
        let rows = generate(2000, 42);
        let faults: Vec<&LabeledReading> = rows.iter().filter(|r| r.is_fault()).collect();
        let rate = faults.len() as f64 / rows.len() as f64;
        assert!(rate > 0.05 && rate < 0.11, "fault rate {}", rate);

        let mean_fault_voltage =
            faults.iter().map(|r| r.reading.voltage).sum::<f64>() / faults.len() as f64;
        assert!(mean_fault_voltage < 200.0);
        assert!(rows.iter().all(|r| ZONES.contains(&r.reading.zone.as_str())));
        assert!(rows
            .iter()
            .all(|r| (r.reading.voltage * 100.0 - (r.reading.voltage * 100.0).round()).abs() < 1e-6));
    }

    #[test]
    fn test_large_offsets_never_wrap_past_end() {
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let beyond_i32 = i32::MAX as usize + 1;

        let far = steps_before(end, beyond_i32);
        assert!(far < end);
        assert_eq!(end - far, Duration::minutes(SIMULATION_STEP_MINUTES * beyond_i32 as i64));

        assert_eq!(steps_before(end, usize::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(steps_before(end, 0), end);
    }

    #[test]
    fn test_empty() {
        assert!(generate(0, 1).is_empty());
    }
}
