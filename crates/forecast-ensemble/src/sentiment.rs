//! Simulated sentiment.
//!
//! There is no sentiment source behind this module. The reading is a
//! pseudo-random number derived from the symbol string so it is identical
//! across runs, processes and platforms:
//!
//! 1. `h = FNV-1a-64(symbol as UTF-8)` (offset basis `0xcbf29ce484222325`, prime `0x100000001b3`)
//! 2. `z = SplitMix64(h)` (one output step seeded with `h`)
//! 3. `value = (z >> 11) / 2^53 - 0.5`, so `value ∈ [-0.5, 0.5)`

use scanner_core::{SentimentDirection, SentimentForecast};

pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(FNV_PRIME)
    })
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Deterministic pseudo-random value in `[-0.5, 0.5)` for a symbol
pub fn simulated_value(symbol: &str) -> f64 {
    let bits = splitmix64(fnv1a_64(symbol.as_bytes())) >> 11;
    bits as f64 / (1u64 << 53) as f64 - 0.5
}

#[derive(Debug, Clone)]
pub struct SentimentSimulator {
    pub threshold: f64,
    pub percent_multiplier: f64,
}

impl Default for SentimentSimulator {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            percent_multiplier: 5.0,
        }
    }
}

impl SentimentSimulator {
    pub fn new(threshold: f64, percent_multiplier: f64) -> Self {
        Self { threshold, percent_multiplier }
    }

    pub fn direction(&self, value: f64) -> SentimentDirection {
        if value > self.threshold {
            SentimentDirection::Bullish
        } else if value < -self.threshold {
            SentimentDirection::Bearish
        } else {
            SentimentDirection::Neutral
        }
    }

    pub fn classify(&self, value: f64) -> SentimentForecast {
        let direction = self.direction(value);
        let percent_change = match direction {
            SentimentDirection::Neutral => 0.0,
            _ => value * self.percent_multiplier,
        };

        SentimentForecast {
            value,
            direction,
            percent_change,
            summary: format!("SIMULATED {} | strength {:+.2}", direction.label(), value),
            simulated: true,
        }
    }

    pub fn simulate(&self, symbol: &str) -> SentimentForecast {
        self.classify(simulated_value(symbol))
    }
}
