//! Countdown timer with periodic reminders.
//!
//! `Timer` is a plain state machine advanced once per second by the shell.
//! Every transition returns the [`Cue`]s it wants played; the shell hands
//! them to [`sound::play_cue`] which honours the sound / vibration toggles.

use serde::{Deserialize, Serialize};

use crate::theme::Gradient;

pub mod sound;

pub const DURATION_MIN: u32 = 60;
pub const DURATION_MAX: u32 = 3600;
pub const DURATION_STEP: u32 = 60;
pub const REMINDER_MIN: u32 = 30;
pub const REMINDER_MAX: u32 = 300;
pub const REMINDER_STEP: u32 = 30;
/// Ticks the reminder phase stays visible before returning to `Active`.
pub const REMINDER_HOLD_TICKS: u8 = 2;
/// Delay before an auto-started timer kicks off.
pub const AUTO_START_DELAY_MS: i32 = 3000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerTheme {
    Focus,
    #[default]
    Sleep,
    Meditation,
    Lucid,
}

impl TimerTheme {
    pub const ALL: [TimerTheme; 4] = [
        TimerTheme::Focus,
        TimerTheme::Sleep,
        TimerTheme::Meditation,
        TimerTheme::Lucid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TimerTheme::Focus => "Concentración",
            TimerTheme::Sleep => "Sueño",
            TimerTheme::Meditation => "Meditación",
            TimerTheme::Lucid => "Sueño Lúcido",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TimerTheme::Focus => "Para sesiones de trabajo enfocado",
            TimerTheme::Sleep => "Para transición al sueño",
            TimerTheme::Meditation => "Para práctica meditativa",
            TimerTheme::Lucid => "Para inducir sueños lúcidos",
        }
    }

    pub fn accent(self) -> Gradient {
        match self {
            TimerTheme::Focus => Gradient::new("#2563eb", "#1d8ad6", "#0891b2"),
            TimerTheme::Sleep => Gradient::new("#4f46e5", "#713fe8", "#9333ea"),
            TimerTheme::Meditation => Gradient::new("#16a34a", "#0e9e60", "#059669"),
            TimerTheme::Lucid => Gradient::new("#9333ea", "#b72fb0", "#db2777"),
        }
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            TimerTheme::Focus => "focus",
            TimerTheme::Sleep => "sleep",
            TimerTheme::Meditation => "meditation",
            TimerTheme::Lucid => "lucid",
        }
    }

    pub fn from_attr(s: &str) -> Option<TimerTheme> {
        TimerTheme::ALL.into_iter().find(|t| t.as_attr() == s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimerSettings {
    pub duration: u32,
    pub reminder_interval: u32,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub auto_start: bool,
    pub theme: TimerTheme,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            duration: 300,
            reminder_interval: 60,
            sound_enabled: true,
            vibration_enabled: true,
            auto_start: false,
            theme: TimerTheme::Sleep,
        }
    }
}

fn snap(value: u32, min: u32, max: u32, step: u32) -> u32 {
    let clamped = value.clamp(min, max);
    min + ((clamped - min + step / 2) / step) * step
}

impl TimerSettings {
    /// Clamp both sliders into range and onto their step grid.
    pub fn normalized(mut self) -> Self {
        self.duration = snap(self.duration, DURATION_MIN, DURATION_MAX, DURATION_STEP);
        self.reminder_interval = snap(
            self.reminder_interval,
            REMINDER_MIN,
            REMINDER_MAX,
            REMINDER_STEP,
        );
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    Preparation,
    Active,
    Reminder,
    Completed,
}

impl TimerPhase {
    pub fn label(self) -> &'static str {
        match self {
            TimerPhase::Preparation => "Preparación",
            TimerPhase::Active => "Activo",
            TimerPhase::Reminder => "Recordatorio",
            TimerPhase::Completed => "Completado",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TimerPhase::Preparation => "#2563eb",
            TimerPhase::Active => "#16a34a",
            TimerPhase::Reminder => "#ca8a04",
            TimerPhase::Completed => "#9333ea",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// One oscillator burst, `offset_s` after the cue fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration_s: f64,
    pub offset_s: f64,
    pub waveform: Waveform,
}

const fn tone(frequency: f32, duration_s: f64, offset_s: f64, waveform: Waveform) -> Tone {
    Tone { frequency, duration_s, offset_s, waveform }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Start,
    Stop,
    Reminder,
    Complete,
}

impl Cue {
    pub fn tones(self) -> &'static [Tone] {
        use Waveform::*;
        const START: [Tone; 1] = [tone(440.0, 0.2, 0.0, Sine)];
        const STOP: [Tone; 1] = [tone(220.0, 0.3, 0.0, Sine)];
        const REMINDER: [Tone; 1] = [tone(330.0, 0.5, 0.0, Triangle)];
        // C5 / E5 / G5 arpeggio
        const COMPLETE: [Tone; 3] = [
            tone(523.0, 1.0, 0.0, Sine),
            tone(659.0, 1.0, 0.3, Sine),
            tone(784.0, 1.5, 0.6, Sine),
        ];
        match self {
            Cue::Start => &START,
            Cue::Stop => &STOP,
            Cue::Reminder => &REMINDER,
            Cue::Complete => &COMPLETE,
        }
    }

    /// Vibration pattern in milliseconds; empty means no vibration.
    pub fn vibration(self) -> &'static [u32] {
        match self {
            Cue::Start => &[100],
            Cue::Stop => &[],
            Cue::Reminder => &[50, 100, 50],
            Cue::Complete => &[200, 100, 200, 100, 400],
        }
    }
}

#[derive(Clone, Debug)]
pub struct Timer {
    settings: TimerSettings,
    active: bool,
    paused: bool,
    remaining: u32,
    phase: TimerPhase,
    reminder_count: u32,
    reminder_hold: u8,
}

impl Timer {
    pub fn new(settings: TimerSettings) -> Self {
        let settings = settings.normalized();
        Self {
            remaining: settings.duration,
            settings,
            active: false,
            paused: false,
            phase: TimerPhase::Preparation,
            reminder_count: 0,
            reminder_hold: 0,
        }
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }
    pub fn reminder_count(&self) -> u32 {
        self.reminder_count
    }

    /// True when the per-second interval should be running.
    pub fn is_running(&self) -> bool {
        self.active && !self.paused
    }

    pub fn start(&mut self) -> Vec<Cue> {
        self.active = true;
        self.paused = false;
        self.phase = TimerPhase::Active;
        self.remaining = self.settings.duration;
        self.reminder_count = 0;
        self.reminder_hold = 0;
        vec![Cue::Start]
    }

    pub fn toggle_pause(&mut self) {
        if self.active {
            self.paused = !self.paused;
        }
    }

    pub fn stop(&mut self) -> Vec<Cue> {
        self.active = false;
        self.paused = false;
        self.phase = TimerPhase::Preparation;
        self.remaining = self.settings.duration;
        self.reminder_hold = 0;
        vec![Cue::Stop]
    }

    pub fn reset(&mut self) -> Vec<Cue> {
        self.stop()
    }

    /// Advance one second.
    pub fn tick(&mut self) -> Vec<Cue> {
        if !self.is_running() {
            return Vec::new();
        }
        if self.reminder_hold > 0 {
            self.reminder_hold -= 1;
            if self.reminder_hold == 0 && self.phase == TimerPhase::Reminder {
                self.phase = TimerPhase::Active;
            }
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.active = false;
            self.phase = TimerPhase::Completed;
            self.reminder_hold = 0;
            return vec![Cue::Complete];
        }
        let mut cues = Vec::new();
        if self.remaining % self.settings.reminder_interval == 0
            && self.remaining != self.settings.duration
        {
            self.phase = TimerPhase::Reminder;
            self.reminder_count += 1;
            self.reminder_hold = REMINDER_HOLD_TICKS;
            cues.push(Cue::Reminder);
        }
        self.remaining -= 1;
        cues
    }

    /// Replace settings; while idle the display follows the new duration.
    pub fn update_settings(&mut self, settings: TimerSettings) {
        self.settings = settings.normalized();
        if !self.active {
            self.remaining = self.settings.duration;
        }
    }

    pub fn set_duration(&mut self, seconds: u32) {
        let mut s = self.settings.clone();
        s.duration = seconds;
        self.update_settings(s);
    }

    pub fn set_reminder_interval(&mut self, seconds: u32) {
        let mut s = self.settings.clone();
        s.reminder_interval = seconds;
        self.update_settings(s);
    }

    /// Elapsed share of the configured duration, 0–100.
    pub fn progress(&self) -> f64 {
        let total = self.settings.duration as f64;
        if total <= 0.0 {
            return 0.0;
        }
        (total - self.remaining as f64) / total * 100.0
    }
}

/// `MM:SS`, both zero-padded.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(duration: u32, reminder: u32) -> TimerSettings {
        TimerSettings {
            duration,
            reminder_interval: reminder,
            ..TimerSettings::default()
        }
    }

    #[test]
    fn start_then_stop_restores_duration() {
        let mut t = Timer::new(TimerSettings::default());
        assert_eq!(t.start(), vec![Cue::Start]);
        for _ in 0..17 {
            t.tick();
        }
        assert_eq!(t.remaining(), 283);
        assert_eq!(t.stop(), vec![Cue::Stop]);
        assert_eq!(t.remaining(), 300);
        assert_eq!(t.phase(), TimerPhase::Preparation);
        assert!(!t.is_active());
    }

    #[test]
    fn reminders_fire_on_interval_boundaries_only() {
        let mut t = Timer::new(settings(120, 30));
        t.start();
        let mut reminders = Vec::new();
        for i in 0..119 {
            if t.tick().contains(&Cue::Reminder) {
                reminders.push(i);
            }
        }
        // remaining 90, 60 and 30 each trigger once; the starting 120 does not
        assert_eq!(reminders, vec![30, 60, 90]);
        assert_eq!(t.reminder_count(), 3);
    }

    #[test]
    fn reminder_phase_returns_to_active() {
        let mut t = Timer::new(settings(120, 30));
        t.start();
        for _ in 0..31 {
            t.tick();
        }
        assert_eq!(t.phase(), TimerPhase::Reminder);
        t.tick();
        assert_eq!(t.phase(), TimerPhase::Reminder);
        t.tick();
        assert_eq!(t.phase(), TimerPhase::Active);
    }

    #[test]
    fn completes_at_zero() {
        let mut t = Timer::new(settings(60, 300));
        t.start();
        let mut last = Vec::new();
        for _ in 0..60 {
            last = t.tick();
        }
        assert_eq!(last, vec![Cue::Complete]);
        assert_eq!(t.remaining(), 0);
        assert_eq!(t.phase(), TimerPhase::Completed);
        assert!(!t.is_active());
        assert!(t.tick().is_empty());
        assert!((t.progress() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn pause_freezes_countdown() {
        let mut t = Timer::new(TimerSettings::default());
        t.start();
        t.tick();
        t.toggle_pause();
        assert!(t.tick().is_empty());
        assert_eq!(t.remaining(), 299);
        t.toggle_pause();
        t.tick();
        assert_eq!(t.remaining(), 298);
    }

    #[test]
    fn settings_snap_to_slider_grid() {
        let s = settings(95, 1000).normalized();
        assert_eq!(s.duration, 120);
        assert_eq!(s.reminder_interval, 300);
        let s = settings(0, 44).normalized();
        assert_eq!(s.duration, 60);
        assert_eq!(s.reminder_interval, 30);
    }

    #[test]
    fn idle_duration_change_moves_display() {
        let mut t = Timer::new(TimerSettings::default());
        t.set_duration(600);
        assert_eq!(t.remaining(), 600);
        t.start();
        t.tick();
        t.set_duration(120);
        assert_eq!(t.remaining(), 599);
    }

    #[test]
    fn clock_format_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn complete_cue_is_an_arpeggio() {
        let tones = Cue::Complete.tones();
        assert_eq!(tones.len(), 3);
        assert!(tones.windows(2).all(|w| w[0].offset_s < w[1].offset_s));
        assert!(Cue::Stop.vibration().is_empty());
    }
}
