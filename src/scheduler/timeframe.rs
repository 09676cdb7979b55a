use std::time::Duration;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Convert a timeframe like `15m`, `4h` or `1d` into the cycle interval
///
/// Unknown units, unparseable or zero counts fall back to one minute.
pub fn timeframe_to_interval(timeframe: &str) -> Duration {
    let timeframe = timeframe.trim();

    let Some(unit) = timeframe.chars().last() else {
        tracing::warn!("Empty timeframe, defaulting to 1 minute cadence");
        return DEFAULT_INTERVAL;
    };
    let count = &timeframe[..timeframe.len() - unit.len_utf8()];

    let secs_per_unit: u64 = match unit {
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => {
            tracing::warn!(
                "Unrecognized timeframe unit in {:?}, defaulting to 1 minute cadence",
                timeframe
            );
            return DEFAULT_INTERVAL;
        }
    };

    match count.parse::<u64>() {
        Ok(n) if n > 0 => Duration::from_secs(n.saturating_mul(secs_per_unit)),
        _ => {
            tracing::warn!(
                "Invalid timeframe count in {:?}, defaulting to 1 minute cadence",
                timeframe
            );
            DEFAULT_INTERVAL
        }
    }
}
