use chrono::{Duration, TimeZone, Utc};
pub use scanner_core::{Bar, Series};

pub fn bar(i: i64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i as i64, c, 1000.0))
        .collect()
}

/// 100 hourly bars: a steady climb to 950, seven drops of 3 then seven rises of 1.
/// The last 14 changes give RSI 25, the close sits above SMA(20) and the final
/// volume is twice the trailing 50-bar average.
pub fn oversold_uptrend_bars() -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..=85).map(|i| 100.0 + 10.0 * i as f64).collect();
    let mut price = 950.0;
    for _ in 0..7 {
        price -= 3.0;
        closes.push(price);
    }
    for _ in 0..7 {
        price += 1.0;
        closes.push(price);
    }

    // 49 bars at 960 and a final 1960 average 980 over the last 50: exactly a 2x spike
    let mut bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i as i64, c, 960.0))
        .collect();
    if let Some(last) = bars.last_mut() {
        last.volume = 1960.0;
    }
    bars
}
