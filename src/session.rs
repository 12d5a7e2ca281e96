//! The hypnagogic word session: a slow stream of words and colours while the
//! "bits processed" and depth counters climb.

use crate::rng::Rng;
use crate::theme::{Gradient, Theme};
use crate::{CREATIVE_RESPONSES, HYPNAGOGIC_WORDS};

pub const WORD_TICK_MS: i32 = 10_000;
pub const START_BITS: u64 = 40;
pub const MAX_DEPTH: u8 = 100;
const FIRST_WORD: &str = "respirar";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    Guided,
    Free,
    InfiniteGuided,
    InfiniteFree,
}

impl SessionKind {
    pub const ALL: [SessionKind; 4] = [
        SessionKind::Guided,
        SessionKind::Free,
        SessionKind::InfiniteGuided,
        SessionKind::InfiniteFree,
    ];

    pub fn is_infinite(self) -> bool {
        matches!(self, SessionKind::InfiniteGuided | SessionKind::InfiniteFree)
    }

    pub fn is_guided(self) -> bool {
        matches!(self, SessionKind::Guided | SessionKind::InfiniteGuided)
    }

    pub fn as_attr(self) -> &'static str {
        match self {
            SessionKind::Guided => "guided",
            SessionKind::Free => "free",
            SessionKind::InfiniteGuided => "infinite-guided",
            SessionKind::InfiniteFree => "infinite-free",
        }
    }

    pub fn from_attr(s: &str) -> Option<SessionKind> {
        Self::ALL.into_iter().find(|k| k.as_attr() == s)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Guided => "Sesión guiada",
            SessionKind::Free => "Exploración libre",
            SessionKind::InfiniteGuided => "Guiada infinita",
            SessionKind::InfiniteFree => "Libre infinita",
        }
    }
}

/// Pick a response for the first creative keyword found in `question`,
/// or any hypnagogic word when none matches.
pub fn guided_response(question: &str, rng: &mut Rng) -> &'static str {
    let lower = question.to_lowercase();
    let responses = CREATIVE_RESPONSES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, list)| *list)
        .unwrap_or(HYPNAGOGIC_WORDS);
    rng.pick(responses).copied().unwrap_or(FIRST_WORD)
}

#[derive(Clone, Debug)]
pub struct SessionState {
    pub question: String,
    theme: Theme,
    current_word: String,
    gradient: Gradient,
    bits: u64,
    time: u32,
    active: bool,
    depth: u8,
    kind: Option<SessionKind>,
    discoveries: Vec<String>,
    journal: Vec<String>,
}

impl SessionState {
    pub fn new(theme: Theme) -> Self {
        Self {
            question: String::new(),
            theme,
            current_word: FIRST_WORD.to_string(),
            gradient: theme.primary(),
            bits: 0,
            time: 0,
            active: false,
            depth: 0,
            kind: None,
            discoveries: Vec::new(),
            journal: Vec::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }
    pub fn current_word(&self) -> &str {
        &self.current_word
    }
    pub fn gradient(&self) -> Gradient {
        self.gradient
    }
    pub fn bits(&self) -> u64 {
        self.bits
    }
    pub fn time(&self) -> u32 {
        self.time
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn depth(&self) -> u8 {
        self.depth
    }
    pub fn kind(&self) -> Option<SessionKind> {
        self.kind
    }
    pub fn is_infinite(&self) -> bool {
        self.kind.is_some_and(SessionKind::is_infinite)
    }
    pub fn discoveries(&self) -> &[String] {
        &self.discoveries
    }
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    pub fn start(&mut self, kind: SessionKind, rng: &mut Rng) {
        self.kind = Some(kind);
        self.active = true;
        self.bits = START_BITS;
        self.time = 0;
        self.depth = 0;
        self.current_word = if kind.is_guided() {
            guided_response(&self.question, rng).to_string()
        } else {
            HYPNAGOGIC_WORDS[0].to_string()
        };
        log::info!("session started ({})", kind.as_attr());
    }

    pub fn tick_second(&mut self) {
        if self.active {
            self.time += 1;
        }
    }

    pub fn tick_word(&mut self, rng: &mut Rng) {
        if !self.active {
            return;
        }
        self.current_word = rng
            .pick(HYPNAGOGIC_WORDS)
            .copied()
            .unwrap_or(FIRST_WORD)
            .to_string();
        self.gradient = *rng
            .pick(self.theme.gradients())
            .unwrap_or(&self.theme.gradients()[0]);
        self.bits += 500_000 + rng.index(1_000_000) as u64;
        let step = if self.is_infinite() { 1 } else { 2 };
        self.depth = (self.depth + step).min(MAX_DEPTH);
        log::debug!("word {} depth {}", self.current_word, self.depth);
    }

    /// End the session, keeping the word on screen as a discovery.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.discoveries.push(self.current_word.clone());
        log::info!("session stopped after {}s", self.time);
    }

    /// Leave the view without recording a discovery.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn toggle(&mut self, rng: &mut Rng) {
        if self.active {
            self.stop();
        } else {
            self.start(self.kind.unwrap_or(SessionKind::Free), rng);
        }
    }

    pub fn save_journal(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.journal.push(text.to_string());
        true
    }

    pub fn change_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.gradient = theme.primary();
    }
}

/// `M:SS` for the session clock.
pub fn format_session_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guided_keyword_selects_its_list() {
        let mut rng = Rng::seeded(1);
        let arte = CREATIVE_RESPONSES[0].1;
        for _ in 0..20 {
            let w = guided_response("¿Cómo hago ARTE con luz?", &mut rng);
            assert!(arte.contains(&w));
        }
    }

    #[test]
    fn first_keyword_in_table_order_wins() {
        let mut rng = Rng::seeded(2);
        let ciencia = CREATIVE_RESPONSES
            .iter()
            .find(|(k, _)| *k == "ciencia")
            .unwrap()
            .1;
        // "amor" comes after "ciencia" in the table
        let w = guided_response("amor por la ciencia", &mut rng);
        assert!(ciencia.contains(&w));
    }

    #[test]
    fn no_keyword_falls_back_to_hypnagogic_words() {
        let mut rng = Rng::seeded(3);
        let w = guided_response("", &mut rng);
        assert!(HYPNAGOGIC_WORDS.contains(&w));
    }

    #[test]
    fn start_resets_counters() {
        let mut rng = Rng::seeded(4);
        let mut s = SessionState::new(Theme::Ocean);
        s.start(SessionKind::Free, &mut rng);
        assert!(s.is_active());
        assert_eq!(s.bits(), START_BITS);
        assert_eq!(s.current_word(), "luz");
        assert!(!s.is_infinite());
    }

    #[test]
    fn word_ticks_grow_depth_and_bits() {
        let mut rng = Rng::seeded(5);
        let mut s = SessionState::new(Theme::Cosmic);
        s.start(SessionKind::Guided, &mut rng);
        s.tick_word(&mut rng);
        assert_eq!(s.depth(), 2);
        assert!((START_BITS + 500_000..START_BITS + 1_500_000).contains(&s.bits()));
        assert!(Theme::Cosmic.gradients().contains(&s.gradient()));
        for _ in 0..60 {
            s.tick_word(&mut rng);
        }
        assert_eq!(s.depth(), MAX_DEPTH);

        let mut inf = SessionState::new(Theme::Cosmic);
        inf.start(SessionKind::InfiniteFree, &mut rng);
        inf.tick_word(&mut rng);
        assert_eq!(inf.depth(), 1);
    }

    #[test]
    fn idle_session_ignores_ticks() {
        let mut rng = Rng::seeded(6);
        let mut s = SessionState::new(Theme::Cosmic);
        s.tick_second();
        s.tick_word(&mut rng);
        assert_eq!(s.time(), 0);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn stop_records_discovery_and_toggle_restarts() {
        let mut rng = Rng::seeded(7);
        let mut s = SessionState::new(Theme::Cosmic);
        s.start(SessionKind::InfiniteGuided, &mut rng);
        let word = s.current_word().to_string();
        s.toggle(&mut rng);
        assert!(!s.is_active());
        assert_eq!(s.discoveries(), &[word]);
        s.toggle(&mut rng);
        assert!(s.is_active());
        assert_eq!(s.kind(), Some(SessionKind::InfiniteGuided));
    }

    #[test]
    fn journal_rejects_blank_text() {
        let mut s = SessionState::new(Theme::Cosmic);
        assert!(!s.save_journal("   \n"));
        assert!(s.save_journal("  volaba sobre un río "));
        assert_eq!(s.journal(), &["volaba sobre un río".to_string()]);
    }

    #[test]
    fn theme_change_resets_gradient() {
        let mut s = SessionState::new(Theme::Cosmic);
        s.change_theme(Theme::Forest);
        assert_eq!(s.gradient(), Theme::Forest.primary());
    }

    #[test]
    fn kind_attrs_round_trip() {
        for k in SessionKind::ALL {
            assert_eq!(SessionKind::from_attr(k.as_attr()), Some(k));
        }
        assert_eq!(format_session_time(75), "1:15");
    }
}
