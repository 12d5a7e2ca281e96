// Persisted journal entry for one capture session.

use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisSession, AudioAnalysis, NoisePoint};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreamType {
    #[default]
    Normal,
    Lucid,
    Nightmare,
    Hypnagogic,
}

impl DreamType {
    pub const ALL: [DreamType; 4] = [
        DreamType::Normal,
        DreamType::Lucid,
        DreamType::Nightmare,
        DreamType::Hypnagogic,
    ];

    pub fn as_attr(self) -> &'static str {
        match self {
            DreamType::Normal => "normal",
            DreamType::Lucid => "lucid",
            DreamType::Nightmare => "nightmare",
            DreamType::Hypnagogic => "hypnagogic",
        }
    }

    pub fn from_attr(s: &str) -> Option<DreamType> {
        DreamType::ALL.into_iter().find(|d| d.as_attr() == s)
    }

    pub fn label(self) -> &'static str {
        match self {
            DreamType::Normal => "Normal",
            DreamType::Lucid => "Lúcido",
            DreamType::Nightmare => "Pesadilla",
            DreamType::Hypnagogic => "Hipnagógico",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingRecord {
    pub id: String,
    /// ISO-8601 start time.
    pub date: String,
    /// Seconds.
    pub duration: u32,
    #[serde(default)]
    pub audio_analysis: Vec<AudioAnalysis>,
    #[serde(default)]
    pub noise_points: Vec<NoisePoint>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub dream_type: DreamType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub average_amplitude: f64,
    #[serde(default)]
    pub max_amplitude: f64,
    #[serde(default)]
    pub silence_percentage: f64,
}

impl RecordingRecord {
    pub fn empty(id: String, date: String) -> Self {
        Self {
            id,
            date,
            duration: 0,
            audio_analysis: Vec::new(),
            noise_points: Vec::new(),
            notes: String::new(),
            dream_type: DreamType::Normal,
            tags: Vec::new(),
            average_amplitude: 0.0,
            max_amplitude: 0.0,
            silence_percentage: 0.0,
        }
    }

    /// Fold the finished analysis into the record.
    pub fn finish(&mut self, session: &AnalysisSession, duration: u32) {
        let summary = session.summary();
        self.duration = duration;
        self.audio_analysis = session.history().cloned().collect();
        self.noise_points = session.noise_points().copied().collect();
        self.average_amplitude = summary.average_amplitude;
        self.max_amplitude = summary.max_amplitude;
        self.silence_percentage = summary.silence_percentage;
    }

    /// Attach the user's annotations before saving.
    pub fn annotate(&mut self, notes: &str, dream_type: DreamType, tags: Vec<String>) {
        self.notes = notes.to_string();
        self.dream_type = dream_type;
        self.tags = tags;
    }
}

/// `dream-<date>.webm`, using the calendar part of the ISO timestamp.
pub fn export_file_name(record: &RecordingRecord) -> String {
    let day = record.date.split('T').next().unwrap_or_default();
    format!("dream-{day}.webm")
}

pub fn tags_from_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// `M:SS` for recording lengths.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::analysis::analyze_frame;

    #[test]
    fn file_name_uses_calendar_day() {
        let r = RecordingRecord::empty("1".into(), "2026-10-15T03:04:05.678Z".into());
        assert_eq!(export_file_name(&r), "dream-2026-10-15.webm");
    }

    #[test]
    fn tags_are_trimmed_and_non_empty() {
        assert_eq!(tags_from_input(" vuelo, agua ,,  "), vec!["vuelo", "agua"]);
        assert!(tags_from_input("").is_empty());
    }

    #[test]
    fn finish_copies_summary() {
        let mut s = AnalysisSession::new(0.0);
        let mut loud = vec![128u8; 8];
        loud[0] = 255;
        s.push(analyze_frame(&[0; 8], &[128; 8], 44_100.0, 10.0));
        s.push(analyze_frame(&[0; 8], &loud, 44_100.0, 26.0));
        let mut r = RecordingRecord::empty("7".into(), "2026-01-01T00:00:00Z".into());
        r.finish(&s, 42);
        assert_eq!(r.duration, 42);
        assert_eq!(r.audio_analysis.len(), 2);
        assert!((r.silence_percentage - 50.0).abs() < 1e-12);
        assert!(r.max_amplitude > 0.99);
    }

    #[test]
    fn old_entries_without_stats_still_load() {
        let raw = r#"{"id":"1","date":"2025-01-01T00:00:00Z","duration":12,"notes":"x","dreamType":"nightmare","tags":[]}"#;
        let r: RecordingRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(r.dream_type, DreamType::Nightmare);
        assert_eq!(r.average_amplitude, 0.0);
        assert!(r.audio_analysis.is_empty());
    }

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(125), "2:05");
    }
}
