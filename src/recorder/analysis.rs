// Per-frame metrics over the analyser's byte spectra, and their accumulation
// across one recording.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Analyser node configuration used for every recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyserSettings {
    pub fft_size: u32,
    pub smoothing: f64,
    pub min_decibels: f64,
    pub max_decibels: f64,
    pub sample_rate: f32,
}

pub const ANALYSER: AnalyserSettings = AnalyserSettings {
    fft_size: 2048,
    smoothing: 0.3,
    min_decibels: -90.0,
    max_decibels: -10.0,
    sample_rate: 44_100.0,
};

impl AnalyserSettings {
    pub fn bin_count(&self) -> usize {
        (self.fft_size / 2) as usize
    }
}

/// Share of the spectrum, from the top, that counts as noise.
const NOISE_BAND_START: f64 = 0.7;
pub const HISTORY_LIMIT: usize = 100;
pub const NOISE_POINT_LIMIT: usize = 500;
pub const SILENCE_THRESHOLD: f64 = 0.02;
pub const SOUND_FLOOR: f64 = 0.01;
pub const NO_SOUND_AFTER_MS: f64 = 5_000.0;
const POINT_THRESHOLD: f64 = 0.1;
const SPIKE_THRESHOLD: f64 = 0.6;
const SUSTAIN_THRESHOLD: f64 = 0.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysis {
    pub timestamp: f64,
    /// Raw byte spectrum; kept for the live view only.
    #[serde(skip)]
    pub frequencies: Vec<u8>,
    pub amplitude: f64,
    #[serde(default)]
    pub average_amplitude: f64,
    pub dominant_freq: f64,
    pub noise_level: f64,
    pub clarity: f64,
}

/// Derive the frame metrics from one frequency / time-domain snapshot.
///
/// Time-domain bytes are centred on 128; amplitude is the peak deviation
/// normalised to `0..=1`. The dominant frequency is the first maximal bin
/// mapped onto `0..sample_rate/2`.
pub fn analyze_frame(freq: &[u8], time: &[u8], sample_rate: f32, timestamp: f64) -> AudioAnalysis {
    let mut sum = 0.0;
    let mut max = 0.0_f64;
    for &s in time {
        let v = (s as f64 - 128.0).abs() / 128.0;
        sum += v;
        max = max.max(v);
    }
    let average_amplitude = if time.is_empty() { 0.0 } else { sum / time.len() as f64 };

    let mut peak_idx = 0;
    let mut peak_val = 0u8;
    for (i, &v) in freq.iter().enumerate() {
        if v > peak_val {
            peak_val = v;
            peak_idx = i;
        }
    }
    let dominant_freq = if freq.is_empty() {
        0.0
    } else {
        peak_idx as f64 * (sample_rate as f64 / 2.0) / freq.len() as f64
    };

    let noise_start = (freq.len() as f64 * NOISE_BAND_START).floor() as usize;
    let noise_level = if noise_start < freq.len() {
        let band = &freq[noise_start..];
        band.iter().map(|&v| v as f64).sum::<f64>() / band.len() as f64 / 255.0
    } else {
        0.0
    };

    AudioAnalysis {
        timestamp,
        frequencies: freq.to_vec(),
        amplitude: max,
        average_amplitude,
        dominant_freq,
        noise_level,
        clarity: 1.0 - noise_level * 0.5,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    Spike,
    Sustained,
    Background,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn of(amplitude: f64) -> Severity {
        if amplitude > 0.7 {
            Severity::High
        } else if amplitude > 0.4 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Severity::High => "#ef4444",
            Severity::Medium => "#f59e0b",
            Severity::Low => "#10b981",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoisePoint {
    pub timestamp: f64,
    pub amplitude: f64,
    #[serde(rename = "type")]
    pub kind: NoiseKind,
    pub severity: Severity,
}

/// Classify a frame against the one before it; quiet frames yield nothing.
pub fn classify(amplitude: f64, previous: Option<f64>, timestamp: f64) -> Option<NoisePoint> {
    if amplitude < POINT_THRESHOLD {
        return None;
    }
    let prev = previous.unwrap_or(0.0);
    let kind = if amplitude >= SPIKE_THRESHOLD && prev < SPIKE_THRESHOLD {
        NoiseKind::Spike
    } else if amplitude >= SUSTAIN_THRESHOLD && prev >= SUSTAIN_THRESHOLD {
        NoiseKind::Sustained
    } else {
        NoiseKind::Background
    };
    Some(NoisePoint {
        timestamp,
        amplitude,
        kind,
        severity: Severity::of(amplitude),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MicrophoneStatus {
    Testing,
    Working,
    Failed,
    NoSound,
}

impl MicrophoneStatus {
    pub fn message(self) -> &'static str {
        match self {
            MicrophoneStatus::Testing => "Probando micrófono...",
            MicrophoneStatus::Working => "Micrófono funcionando",
            MicrophoneStatus::NoSound => "No se detecta sonido. Revisa el micrófono.",
            MicrophoneStatus::Failed => "No se pudo acceder a ningún micrófono. Verifica permisos.",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            MicrophoneStatus::Testing => "#eab308",
            MicrophoneStatus::Working => "#22c55e",
            MicrophoneStatus::NoSound => "#f97316",
            MicrophoneStatus::Failed => "#ef4444",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    pub average_amplitude: f64,
    pub max_amplitude: f64,
    pub silence_percentage: f64,
}

/// Running state for one recording.
#[derive(Debug)]
pub struct AnalysisSession {
    history: VecDeque<AudioAnalysis>,
    noise_points: VecDeque<NoisePoint>,
    frames: u64,
    amplitude_sum: f64,
    max_amplitude: f64,
    silent_frames: u64,
    previous: Option<f64>,
    last_sound_ms: f64,
    status: MicrophoneStatus,
}

impl AnalysisSession {
    pub fn new(started_ms: f64) -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            noise_points: VecDeque::with_capacity(NOISE_POINT_LIMIT),
            frames: 0,
            amplitude_sum: 0.0,
            max_amplitude: 0.0,
            silent_frames: 0,
            previous: None,
            last_sound_ms: started_ms,
            status: MicrophoneStatus::Working,
        }
    }

    pub fn push(&mut self, frame: AudioAnalysis) -> Option<NoisePoint> {
        let amp = frame.amplitude;
        let ts = frame.timestamp;
        self.frames += 1;
        self.amplitude_sum += amp;
        self.max_amplitude = self.max_amplitude.max(amp);
        if amp < SILENCE_THRESHOLD {
            self.silent_frames += 1;
        }

        if amp > SOUND_FLOOR {
            self.last_sound_ms = ts;
            self.status = MicrophoneStatus::Working;
        } else if ts - self.last_sound_ms >= NO_SOUND_AFTER_MS {
            self.status = MicrophoneStatus::NoSound;
        }

        let point = classify(amp, self.previous, ts);
        self.previous = Some(amp);
        if let Some(p) = point {
            if self.noise_points.len() == NOISE_POINT_LIMIT {
                self.noise_points.pop_front();
            }
            self.noise_points.push_back(p);
        }

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(frame);
        point
    }

    pub fn latest(&self) -> Option<&AudioAnalysis> {
        self.history.back()
    }

    pub fn history(&self) -> impl Iterator<Item = &AudioAnalysis> {
        self.history.iter()
    }

    /// Oldest first; at most [`NOISE_POINT_LIMIT`].
    pub fn noise_points(&self) -> impl Iterator<Item = &NoisePoint> {
        self.noise_points.iter()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn status(&self) -> MicrophoneStatus {
        self.status
    }

    pub fn summary(&self) -> Summary {
        if self.frames == 0 {
            return Summary::default();
        }
        Summary {
            average_amplitude: self.amplitude_sum / self.frames as f64,
            max_amplitude: self.max_amplitude,
            silence_percentage: self.silent_frames as f64 * 100.0 / self.frames as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_time(len: usize) -> Vec<u8> {
        vec![128; len]
    }

    #[test]
    fn silence_is_zero_amplitude() {
        let a = analyze_frame(&[0; 1024], &flat_time(1024), 44_100.0, 0.0);
        assert_eq!(a.amplitude, 0.0);
        assert_eq!(a.average_amplitude, 0.0);
        assert_eq!(a.dominant_freq, 0.0);
        assert_eq!(a.noise_level, 0.0);
        assert_eq!(a.clarity, 1.0);
    }

    #[test]
    fn amplitude_is_peak_deviation() {
        let mut time = flat_time(4);
        time[1] = 192; // +64
        time[2] = 0; // -128
        let a = analyze_frame(&[], &time, 44_100.0, 0.0);
        assert!((a.amplitude - 1.0).abs() < 1e-12);
        assert!((a.average_amplitude - (0.5 + 1.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn dominant_frequency_maps_bin_to_hz() {
        let mut freq = vec![10u8; 1024];
        freq[100] = 200;
        freq[300] = 200; // tie keeps the first
        let a = analyze_frame(&freq, &flat_time(1024), 44_100.0, 0.0);
        let expected = 100.0 * 22_050.0 / 1024.0;
        assert!((a.dominant_freq - expected).abs() < 1e-9);
    }

    #[test]
    fn noise_level_reads_top_band() {
        let mut freq = vec![0u8; 10];
        for v in &mut freq[7..] {
            *v = 255;
        }
        let a = analyze_frame(&freq, &flat_time(10), 44_100.0, 0.0);
        assert!((a.noise_level - 1.0).abs() < 1e-12);
        assert!((a.clarity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn classification_follows_previous_frame() {
        assert!(classify(0.05, None, 0.0).is_none());
        let spike = classify(0.8, Some(0.1), 0.0).unwrap();
        assert_eq!(spike.kind, NoiseKind::Spike);
        assert_eq!(spike.severity, Severity::High);
        let sustained = classify(0.5, Some(0.45), 0.0).unwrap();
        assert_eq!(sustained.kind, NoiseKind::Sustained);
        assert_eq!(sustained.severity, Severity::Medium);
        let bg = classify(0.2, Some(0.0), 0.0).unwrap();
        assert_eq!(bg.kind, NoiseKind::Background);
        assert_eq!(bg.severity, Severity::Low);
    }

    fn frame(amplitude: f64, ts: f64) -> AudioAnalysis {
        AudioAnalysis {
            timestamp: ts,
            frequencies: Vec::new(),
            amplitude,
            average_amplitude: amplitude / 2.0,
            dominant_freq: 0.0,
            noise_level: 0.0,
            clarity: 1.0,
        }
    }

    #[test]
    fn summary_counts_every_frame_not_just_history() {
        let mut s = AnalysisSession::new(0.0);
        for i in 0..150 {
            let amp = if i % 2 == 0 { 0.0 } else { 0.5 };
            s.push(frame(amp, i as f64 * 16.0));
        }
        assert_eq!(s.history().count(), HISTORY_LIMIT);
        assert_eq!(s.frames(), 150);
        let sum = s.summary();
        assert!((sum.average_amplitude - 0.25).abs() < 1e-12);
        assert_eq!(sum.max_amplitude, 0.5);
        assert!((sum.silence_percentage - 50.0).abs() < 1e-12);
    }

    #[test]
    fn empty_session_summary_is_zero() {
        assert_eq!(AnalysisSession::new(0.0).summary(), Summary::default());
    }

    #[test]
    fn long_quiet_stretch_flags_no_sound() {
        let mut s = AnalysisSession::new(1_000.0);
        s.push(frame(0.0, 3_000.0));
        assert_eq!(s.status(), MicrophoneStatus::Working);
        s.push(frame(0.0, 6_000.0));
        assert_eq!(s.status(), MicrophoneStatus::NoSound);
        s.push(frame(0.3, 6_016.0));
        assert_eq!(s.status(), MicrophoneStatus::Working);
    }

    #[test]
    fn noise_points_keep_the_newest_five_hundred() {
        let mut s = AnalysisSession::new(0.0);
        for i in 0..700 {
            s.push(frame(1.0, i as f64));
        }
        assert_eq!(s.noise_points().count(), NOISE_POINT_LIMIT);
        assert_eq!(s.noise_points().next().map(|p| p.timestamp), Some(200.0));
        assert_eq!(s.noise_points().last().map(|p| p.timestamp), Some(699.0));
    }

    #[test]
    fn pushed_frames_classify_against_their_predecessor() {
        let mut s = AnalysisSession::new(0.0);
        assert!(s.push(frame(0.05, 0.0)).is_none());
        let spike = s.push(frame(0.8, 16.0)).unwrap();
        assert_eq!(spike.kind, NoiseKind::Spike);
        let sustained = s.push(frame(0.5, 32.0)).unwrap();
        assert_eq!(sustained.kind, NoiseKind::Sustained);
        let kinds: Vec<NoiseKind> = s.noise_points().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![NoiseKind::Spike, NoiseKind::Sustained]);
    }

    #[test]
    fn analysis_json_omits_raw_spectrum() {
        let a = analyze_frame(&[1, 2, 3], &flat_time(3), 44_100.0, 5.0);
        let json = serde_json::to_string(&a).unwrap();
        assert!(!json.contains("frequencies"));
        assert!(json.contains("dominantFreq"));
    }
}
