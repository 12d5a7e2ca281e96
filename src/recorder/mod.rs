//! Dream recorder: microphone capture, live spectral analysis and the journal
//! entry produced when a capture stops.
//!
//! `analysis` and `record` are pure and run natively; `capture` owns the
//! browser audio graph and `draw` paints the three live canvases.

pub mod analysis;
pub mod capture;
pub mod draw;
pub mod record;

pub use analysis::{
    ANALYSER, AnalysisSession, AudioAnalysis, MicrophoneStatus, NoiseKind, NoisePoint, Severity,
    Summary, analyze_frame,
};
pub use record::{DreamType, RecordingRecord, export_file_name, format_duration, tags_from_input};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecorderTab {
    #[default]
    Record,
    Live,
    Journal,
}

impl RecorderTab {
    pub const ALL: [RecorderTab; 3] = [RecorderTab::Record, RecorderTab::Live, RecorderTab::Journal];

    pub fn label(self) -> &'static str {
        match self {
            RecorderTab::Record => "Grabador",
            RecorderTab::Live => "Tiempo Real",
            RecorderTab::Journal => "Análisis",
        }
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            RecorderTab::Record => "record",
            RecorderTab::Live => "live",
            RecorderTab::Journal => "journal",
        }
    }

    pub fn from_attr(s: &str) -> Option<RecorderTab> {
        RecorderTab::ALL.into_iter().find(|t| t.as_attr() == s)
    }
}

/// View state of the recorder screen, independent of the audio graph.
#[derive(Debug)]
pub struct RecorderState {
    pub status: MicrophoneStatus,
    pub tab: RecorderTab,
    pub show_graphs: bool,
    pub advanced: bool,
    recording: bool,
    opening: bool,
    elapsed: u32,
    session: Option<AnalysisSession>,
    draft: Option<RecordingRecord>,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            status: MicrophoneStatus::Testing,
            tab: RecorderTab::Record,
            show_graphs: true,
            advanced: false,
            recording: false,
            opening: false,
            elapsed: 0,
            session: None,
            draft: None,
        }
    }
}

impl RecorderState {
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    /// Finished recording waiting for notes, or the one still being captured.
    pub fn draft(&self) -> Option<&RecordingRecord> {
        self.draft.as_ref()
    }

    /// True while the microphone is being opened for a capture.
    pub fn is_opening(&self) -> bool {
        self.opening
    }

    /// A standalone microphone check only makes sense with no capture
    /// opening or running.
    pub fn can_probe(&self) -> bool {
        !self.opening && !self.recording
    }

    /// Claim the single capture slot. Refused while a capture is being
    /// opened or is running.
    pub fn request_start(&mut self) -> bool {
        if self.opening || self.recording {
            return false;
        }
        self.opening = true;
        self.status = MicrophoneStatus::Testing;
        true
    }

    /// Release the slot claimed by [`request_start`](Self::request_start)
    /// without recording.
    pub fn cancel_open(&mut self) {
        self.opening = false;
    }

    /// Begin a new capture; any unsaved draft is replaced.
    pub fn begin(&mut self, id: String, date: String, now_ms: f64) {
        self.opening = false;
        self.recording = true;
        self.elapsed = 0;
        self.status = MicrophoneStatus::Working;
        self.session = Some(AnalysisSession::new(now_ms));
        self.draft = Some(RecordingRecord::empty(id, date));
    }

    pub fn tick_second(&mut self) {
        if self.recording {
            self.elapsed += 1;
        }
    }

    /// Feed one analyser frame; returns the noise point it produced, if any.
    pub fn push_frame(&mut self, frame: AudioAnalysis) -> Option<NoisePoint> {
        if !self.recording {
            return None;
        }
        let session = self.session.as_mut()?;
        let point = session.push(frame);
        self.status = session.status();
        point
    }

    /// Stop capturing and fold the statistics into the draft.
    pub fn finish(&mut self) -> Option<&RecordingRecord> {
        if !self.recording {
            return self.draft.as_ref();
        }
        self.recording = false;
        if let (Some(draft), Some(session)) = (self.draft.as_mut(), self.session.as_ref()) {
            draft.finish(session, self.elapsed);
        }
        self.draft.as_ref()
    }

    /// Mark the device as unusable and drop the capture in progress.
    pub fn fail(&mut self) {
        self.status = MicrophoneStatus::Failed;
        self.opening = false;
        self.recording = false;
        self.session = None;
        self.draft = None;
    }

    /// Hand out the annotated draft for saving. Only finished drafts qualify.
    pub fn take_for_save(
        &mut self,
        notes: &str,
        dream_type: DreamType,
        tags: Vec<String>,
    ) -> Option<RecordingRecord> {
        if self.recording {
            return None;
        }
        let mut draft = self.draft.take()?;
        draft.annotate(notes, dream_type, tags);
        self.session = None;
        Some(draft)
    }

    pub fn discard(&mut self) {
        if !self.recording {
            self.draft = None;
            self.session = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(amplitude: f64, ts: f64) -> AudioAnalysis {
        AudioAnalysis {
            timestamp: ts,
            frequencies: Vec::new(),
            amplitude,
            average_amplitude: amplitude,
            dominant_freq: 440.0,
            noise_level: 0.1,
            clarity: 0.95,
        }
    }

    #[test]
    fn record_cycle_produces_annotated_entry() {
        let mut st = RecorderState::default();
        assert_eq!(st.status, MicrophoneStatus::Testing);
        st.begin("1".into(), "2026-10-15T01:00:00Z".into(), 0.0);
        assert!(st.is_recording());
        // not saveable while capturing
        assert!(st.take_for_save("", DreamType::Normal, vec![]).is_none());
        st.push_frame(frame(0.8, 16.0));
        st.push_frame(frame(0.0, 32.0));
        st.tick_second();
        st.tick_second();
        let draft = st.finish().unwrap();
        assert_eq!(draft.duration, 2);
        assert_eq!(draft.noise_points.len(), 1);

        let saved = st
            .take_for_save("volaba", DreamType::Lucid, vec!["vuelo".into()])
            .unwrap();
        assert_eq!(saved.notes, "volaba");
        assert_eq!(saved.dream_type, DreamType::Lucid);
        assert_eq!(saved.max_amplitude, 0.8);
        assert!(st.draft().is_none());
    }

    #[test]
    fn frames_ignored_when_idle() {
        let mut st = RecorderState::default();
        assert!(st.push_frame(frame(0.9, 0.0)).is_none());
        st.tick_second();
        assert_eq!(st.elapsed(), 0);
    }

    #[test]
    fn failure_clears_capture() {
        let mut st = RecorderState::default();
        st.begin("1".into(), "d".into(), 0.0);
        st.fail();
        assert_eq!(st.status, MicrophoneStatus::Failed);
        assert!(!st.is_recording());
        assert!(st.draft().is_none());
    }

    #[test]
    fn only_one_capture_may_be_opening() {
        let mut st = RecorderState::default();
        assert!(st.request_start());
        assert!(st.is_opening());
        // second click while the permission prompt is up
        assert!(!st.request_start());
        st.begin("1".into(), "d".into(), 0.0);
        assert!(!st.is_opening());
        assert!(!st.request_start());
        st.finish();
        assert!(st.request_start());
        st.cancel_open();
        assert!(st.request_start());
        st.fail();
        assert!(!st.is_opening());
        assert!(st.request_start());
    }

    #[test]
    fn fresh_view_probes_until_a_capture_is_claimed() {
        let mut st = RecorderState::default();
        assert_eq!(st.status, MicrophoneStatus::Testing);
        assert!(st.can_probe());
        assert!(st.request_start());
        assert!(!st.can_probe());
        st.begin("1".into(), "d".into(), 0.0);
        assert!(!st.can_probe());
        st.finish();
        assert!(st.can_probe());
    }

    #[test]
    fn discard_keeps_running_capture() {
        let mut st = RecorderState::default();
        st.begin("1".into(), "d".into(), 0.0);
        st.discard();
        assert!(st.draft().is_some());
        st.finish();
        st.discard();
        assert!(st.draft().is_none());
    }
}
