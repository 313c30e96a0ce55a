//! # griddy-forecast: per-node demand forecasting (C3)
//!
//! Two regimes, selected by available history length:
//!
//! - **Flat forecast**: fewer than `min_history` points exist, so the
//!   latest observed demand is repeated for the whole horizon.
//! - **Spectral forecast**: a two-component (by default) discrete Fourier
//!   reconstruction of the history, blended toward the latest observation
//!   with exponentially decaying weight so the forecast stays continuous
//!   with what was just measured.

use num_complex::Complex64;

/// Configuration for the forecaster. Mirrors the `[MODULE]`-level knobs in
/// spec.md §6: `horizon`, `min_history`, `spectral_components`,
/// `blend_decay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    pub horizon: usize,
    pub min_history: usize,
    pub spectral_components: usize,
    pub blend_decay: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            min_history: 5,
            spectral_components: 2,
            blend_decay: 0.1,
        }
    }
}

/// Forecast `horizon` non-negative demand values from `history` (ordered,
/// oldest first) and the most recently observed demand.
pub fn forecast(config: &ForecastConfig, history: &[f64], latest_demand: f64) -> Vec<f64> {
    if history.len() < config.min_history {
        return vec![latest_demand.max(0.0); config.horizon];
    }
    spectral_forecast(config, history, latest_demand)
}

fn spectral_forecast(config: &ForecastConfig, history: &[f64], latest_demand: f64) -> Vec<f64> {
    let l = history.len();
    let spectrum = dft(history);
    let k = config.spectral_components.min((l / 2).saturating_sub(1));
    let filtered = keep_dc_and_top_k_bins(&spectrum, k);
    let reconstructed = idft_real(&filtered);

    (0..config.horizon)
        .map(|t| {
            let raw = reconstructed[t % l];
            let w = (-config.blend_decay * t as f64).exp();
            (w * latest_demand + (1.0 - w) * raw).max(0.0)
        })
        .collect()
}

fn dft(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let mut sum = Complex64::new(0.0, 0.0);
        for (t, &x) in signal.iter().enumerate() {
            let angle = -2.0 * std::f64::consts::PI * (k as f64) * (t as f64) / (n as f64);
            sum += Complex64::new(x, 0.0) * Complex64::new(angle.cos(), angle.sin());
        }
        out.push(sum);
    }
    out
}

/// Zero every bin except the DC component (index 0) and the `k` highest
/// magnitude non-DC bins, keeping each retained bin's complex-conjugate
/// mirror so the inverse transform stays real.
fn keep_dc_and_top_k_bins(spectrum: &[Complex64], k: usize) -> Vec<Complex64> {
    let n = spectrum.len();
    let mut filtered = vec![Complex64::new(0.0, 0.0); n];
    filtered[0] = spectrum[0];

    if k == 0 || n < 2 {
        return filtered;
    }

    // Non-DC, non-Nyquist-mirror-duplicate bins: only consider indices up
    // to n/2 since magnitudes mirror for a real input signal.
    let mut ranked: Vec<usize> = (1..=(n - 1) / 2).collect();
    ranked.sort_by(|&a, &b| spectrum[b].norm().total_cmp(&spectrum[a].norm()));

    for &idx in ranked.iter().take(k) {
        filtered[idx] = spectrum[idx];
        let mirror = n - idx;
        if mirror != idx && mirror < n {
            filtered[mirror] = spectrum[mirror];
        }
    }

    filtered
}

fn idft_real(spectrum: &[Complex64]) -> Vec<f64> {
    let n = spectrum.len();
    let mut out = Vec::with_capacity(n);
    for t in 0..n {
        let mut sum = Complex64::new(0.0, 0.0);
        for (k, &x) in spectrum.iter().enumerate() {
            let angle = 2.0 * std::f64::consts::PI * (k as f64) * (t as f64) / (n as f64);
            sum += x * Complex64::new(angle.cos(), angle.sin());
        }
        out.push(sum.re / n as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_below_min_uses_flat_forecast() {
        let config = ForecastConfig::default();
        let history = vec![1.0, 2.0, 3.0, 4.0]; // len 4 < min_history 5
        let out = forecast(&config, &history, 4.0);
        assert_eq!(out, vec![4.0; config.horizon]);
    }

    #[test]
    fn history_at_min_uses_spectral_forecast() {
        let config = ForecastConfig::default();
        let history: Vec<f64> = vec![1.0, 3.0, 1.0, 3.0, 1.0]; // len 5 == min_history
        let flat = vec![1.0; config.horizon];
        let out = forecast(&config, &history, 1.0);
        // Spectral path runs (doesn't panic on tiny L) and stays non-negative.
        assert_eq!(out.len(), config.horizon);
        assert!(out.iter().all(|&v| v >= 0.0));
        // Spectral output need not equal the trivial flat-forecast vector.
        let _ = flat;
    }

    #[test]
    fn forecast_is_never_negative() {
        let config = ForecastConfig::default();
        let history = vec![0.0; 20];
        let out = forecast(&config, &history, 0.0);
        assert!(out.iter().all(|&v| v >= 0.0));
    }

    /// spec.md §8 scenario 4: alternating 1,3,1,3,... history should blend
    /// from near the last observed value toward the reconstructed period.
    #[test]
    fn spectral_forecast_blends_from_latest_toward_period() {
        let config = ForecastConfig {
            horizon: 4,
            ..ForecastConfig::default()
        };
        let history: Vec<f64> = (0..48).map(|i| if i % 2 == 0 { 1.0 } else { 3.0 }).collect();
        let latest = 3.0;
        let out = forecast(&config, &history, latest);
        assert_eq!(out.len(), 4);
        // t=0 weight is 1.0, so it must equal the latest observation exactly.
        assert!((out[0] - latest).abs() < 1e-9);
        // Later indices should relax away from the pinned latest value.
        let deviation_t0 = (out[0] - latest).abs();
        let deviation_t3 = (out[3] - latest).abs();
        assert!(deviation_t3 >= deviation_t0);
    }

    #[test]
    fn dft_then_idft_recovers_original_signal() {
        let signal = vec![1.0, 3.0, 1.0, 3.0, 2.0, 0.5];
        let spectrum = dft(&signal);
        let recovered = idft_real(&spectrum);
        for (a, b) in signal.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }
}
