/// Format a frequency value with appropriate unit suffix (Hz, kHz)
pub fn format_frequency(freq: f64) -> String {
    if freq >= 1000.0 {
        format!("{:.2} kHz", freq / 1000.0)
    } else {
        format!("{:.1} Hz", freq)
    }
}

/// Format a time value with appropriate unit suffix (ms, s)
pub fn format_time(time_in_seconds: f64) -> String {
    if time_in_seconds >= 1.0 {
        format!("{:.2} s", time_in_seconds)
    } else {
        format!("{:.0} ms", time_in_seconds * 1000.0)
    }
}

/// Calculate decibels from a linear amplitude value
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    // Avoid log of zero
    if amplitude <= 0.0 {
        -96.0 // Minimum dB value (near silence)
    } else {
        20.0 * amplitude.log10()
    }
}

/// Convert decibels to a linear amplitude value
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// One-pole smoothing coefficient for a time constant in seconds.
pub fn time_constant_coefficient(seconds: f32, sample_rate: u32) -> f32 {
    if seconds <= 0.0 {
        0.0
    } else {
        (-1.0 / (seconds * sample_rate as f32)).exp()
    }
}
