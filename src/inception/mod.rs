//! "Inception" word game: dive through dream levels where the words you
//! have to type get progressively distorted.
//!
//! Depth indexes [`levels::DREAM_LEVELS`]; each level's distortion probability
//! drives [`transform_word`]. Deeper levels score more per answer and accept
//! looser answers.

use crate::rng::Rng;

pub mod levels;
pub mod words;

pub use levels::{DREAM_LEVELS, DreamLevel, MAX_LEVEL, dream_level};
pub use words::{BASE_WORDS, START_WORD, WORD_TRANSFORMATIONS};

pub const HISTORY_LEN: usize = 11;
pub const SINK_TRANSITION_MS: u32 = 2000;
pub const WAKE_TRANSITION_MS: u32 = 1500;
const BASE_WORD_INTERVAL_MS: u32 = 8000;
const POINTS_PER_ANSWER: u64 = 10;

// --- Word distortion ----------------------------------------------------------

/// Distort `word` for the given depth.
///
/// Level 0 (and any level outside the table) is the identity. Otherwise the
/// level's distortion probability is rolled first against the word's dream
/// substitutions, then against a level-specific mangling.
pub fn transform_word(word: &str, level: u8, rng: &mut Rng) -> String {
    let distortion = dream_level(level).map_or(0.0, |l| l.word_distortion);
    if distortion == 0.0 {
        return word.to_string();
    }
    if let Some(variants) = words::transformations_of(word) {
        if rng.next_f64() < distortion {
            return variants[rng.index(variants.len())].to_string();
        }
    }
    if rng.next_f64() >= distortion {
        return word.to_string();
    }
    match level {
        1 => {
            let n = word.chars().count();
            if n > 3 {
                uppercase_at(word, rng.index(n))
            } else {
                word.to_string()
            }
        }
        2 => reverse_middle(word),
        3 => fragment(word),
        4 => symbols(word),
        _ => word.to_string(),
    }
}

pub(crate) fn uppercase_at(word: &str, pos: usize) -> String {
    let mut out = String::with_capacity(word.len());
    for (i, c) in word.chars().enumerate() {
        if i == pos {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse the middle third `[n/3, 2n/3)`; words of four chars or fewer pass through.
pub(crate) fn reverse_middle(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    if n > 4 {
        chars[n / 3..(n * 2) / 3].reverse();
    }
    chars.into_iter().collect()
}

/// Even-indexed chars, an ellipsis, then the odd-indexed ones.
pub(crate) fn fragment(word: &str) -> String {
    let even: String = word.chars().step_by(2).collect();
    let odd: String = word.chars().skip(1).step_by(2).collect();
    format!("{even}...{odd}")
}

pub(crate) fn symbols(word: &str) -> String {
    let side = "◊".repeat(word.chars().count().min(3));
    format!("{side}∞{side}")
}

// --- Game state ---------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dive {
    Sinking,
    Waking,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Playing,
    Transition(Dive),
    Limbo,
}

#[derive(Clone, Debug)]
pub struct InceptionGame {
    level: u8,
    current_word: String,
    score: u64,
    time_in_level: u32,
    active: bool,
    history: Vec<String>,
    phase: Phase,
    kicks: u32,
    max_depth: u8,
}

impl Default for InceptionGame {
    fn default() -> Self {
        Self::new()
    }
}

impl InceptionGame {
    pub fn new() -> Self {
        Self {
            level: 0,
            current_word: START_WORD.to_string(),
            score: 0,
            time_in_level: 0,
            active: false,
            history: vec![START_WORD.to_string()],
            phase: Phase::Intro,
            kicks: 0,
            max_depth: 0,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
    pub fn dream(&self) -> &'static DreamLevel {
        &DREAM_LEVELS[self.level as usize]
    }
    pub fn current_word(&self) -> &str {
        &self.current_word
    }
    pub fn score(&self) -> u64 {
        self.score
    }
    pub fn time_in_level(&self) -> u32 {
        self.time_in_level
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn history(&self) -> &[String] {
        &self.history
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn kicks(&self) -> u32 {
        self.kicks
    }
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Period of the automatic word change; faster the deeper you are.
    pub fn word_interval_ms(&self) -> u32 {
        BASE_WORD_INTERVAL_MS / (self.level as u32 + 1)
    }

    pub fn start(&mut self, rng: &mut Rng) {
        self.active = true;
        self.phase = Phase::Playing;
        self.time_in_level = 0;
        self.new_word(rng);
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.phase = Phase::Intro;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn tick_second(&mut self) {
        if self.active {
            self.time_in_level += 1;
        }
    }

    pub fn new_word(&mut self, rng: &mut Rng) {
        let base = rng.pick(&BASE_WORDS).copied().unwrap_or(START_WORD);
        self.current_word = transform_word(base, self.level, rng);
        self.history.push(self.current_word.clone());
        if self.history.len() > HISTORY_LEN {
            let excess = self.history.len() - HISTORY_LEN;
            self.history.drain(..excess);
        }
    }

    /// Sink one level. Returns the transition length when it happened.
    pub fn go_deeper(&mut self, rng: &mut Rng) -> Option<u32> {
        if self.level >= MAX_LEVEL {
            return None;
        }
        self.level += 1;
        self.max_depth = self.max_depth.max(self.level);
        self.phase = Phase::Transition(Dive::Sinking);
        self.new_word(rng);
        Some(SINK_TRANSITION_MS)
    }

    /// Wake one level ("kick"). Returns the transition length when it happened.
    pub fn kick(&mut self, rng: &mut Rng) -> Option<u32> {
        if self.level == 0 {
            return None;
        }
        self.level -= 1;
        self.kicks += 1;
        self.phase = Phase::Transition(Dive::Waking);
        self.new_word(rng);
        Some(WAKE_TRANSITION_MS)
    }

    pub fn finish_transition(&mut self) {
        if let Phase::Transition(_) = self.phase {
            self.phase = if self.level == MAX_LEVEL {
                Phase::Limbo
            } else {
                Phase::Playing
            };
        }
    }

    pub fn accepts_answers(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Limbo)
    }

    /// Score a typed answer. `None` for blank input or when no word is shown.
    pub fn check_answer(&mut self, input: &str, rng: &mut Rng) -> Option<bool> {
        if input.trim().is_empty() || !self.accepts_answers() {
            return None;
        }
        let correct = answer_matches(input, &self.current_word, self.level);
        if correct {
            self.score += POINTS_PER_ANSWER * self.dream().time_multiplier as u64;
            self.new_word(rng);
        }
        Some(correct)
    }
}

fn prefix3(s: &str) -> String {
    s.chars().take(3).collect()
}

/// Reality wants the exact word, light dreams a shared three-letter stem,
/// limbo any attempt longer than two characters.
pub fn answer_matches(input: &str, target: &str, level: u8) -> bool {
    let input = input.trim().to_lowercase();
    let target = target.to_lowercase();
    match level {
        0 => input == target,
        1 | 2 => input.contains(&prefix3(&target)) || target.contains(&prefix3(&input)),
        _ => input.chars().count() > 2,
    }
}

/// Real seconds stretched by the level's multiplier, in the largest units.
pub fn format_dream_time(seconds: u32, level: u8) -> String {
    let mult = dream_level(level).map_or(1, |l| l.time_multiplier) as u64;
    let s = seconds as u64 * mult;
    if s < 60 {
        format!("{s}s")
    } else if s < 3600 {
        format!("{}m {}s", s / 60, s % 60)
    } else if s < 86_400 {
        format!("{}h {}m", s / 3600, (s % 3600) / 60)
    } else {
        format!("{}d {}h", s / 86_400, (s % 86_400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reality_never_distorts() {
        let mut rng = Rng::seeded(1);
        for w in BASE_WORDS.iter().chain(["", "x", "ñandú", "ÉPICO"].iter()) {
            for _ in 0..10 {
                assert_eq!(transform_word(w, 0, &mut rng), *w);
            }
        }
    }

    #[test]
    fn unknown_level_is_identity() {
        let mut rng = Rng::seeded(3);
        assert_eq!(transform_word("tiempo", 9, &mut rng), "tiempo");
    }

    #[test]
    fn deepest_level_always_transforms() {
        let mut rng = Rng::seeded(5);
        for _ in 0..20 {
            let t = transform_word("luz", 4, &mut rng);
            assert!(words::transformations_of("luz").unwrap().contains(&t.as_str()));
            assert_eq!(transform_word("caos", 4, &mut rng), "◊◊◊∞◊◊◊");
            assert_eq!(transform_word("si", 4, &mut rng), "◊◊∞◊◊");
        }
    }

    #[test]
    fn mangling_helpers() {
        assert_eq!(fragment("sombra"), "smr...oba");
        assert_eq!(reverse_middle("silencio"), "sinelcio");
        assert_eq!(reverse_middle("paz"), "paz");
        assert_eq!(uppercase_at("ilusión", 3), "iluSión");
        assert_eq!(uppercase_at("ilusión", 5), "ilusiÓn");
    }

    #[test]
    fn light_dreams_only_touch_case_or_substitute() {
        let mut rng = Rng::seeded(11);
        for _ in 0..50 {
            let t = transform_word("sombra", 1, &mut rng);
            assert_eq!(t.to_lowercase(), "sombra");
        }
    }

    #[test]
    fn dive_and_kick_bounds() {
        let mut rng = Rng::seeded(2);
        let mut g = InceptionGame::new();
        assert_eq!(g.kick(&mut rng), None);
        g.start(&mut rng);
        for expected in 1..=4 {
            assert_eq!(g.go_deeper(&mut rng), Some(SINK_TRANSITION_MS));
            assert_eq!(g.level(), expected);
            assert_eq!(g.phase(), Phase::Transition(Dive::Sinking));
            g.finish_transition();
        }
        assert_eq!(g.phase(), Phase::Limbo);
        assert_eq!(g.go_deeper(&mut rng), None);
        assert_eq!(g.kick(&mut rng), Some(WAKE_TRANSITION_MS));
        assert_eq!(g.kicks(), 1);
        assert_eq!(g.max_depth(), 4);
        g.finish_transition();
        assert_eq!(g.phase(), Phase::Playing);
        assert_eq!(g.word_interval_ms(), 2000);
    }

    #[test]
    fn answers_loosen_with_depth() {
        assert!(answer_matches("  Realidad ", "realidad", 0));
        assert!(!answer_matches("realida", "realidad", 0));
        assert!(answer_matches("realista", "realidad", 1));
        assert!(answer_matches("luz", "luzbel", 2));
        assert!(!answer_matches("mar", "realidad", 2));
        assert!(answer_matches("xyz", "◊◊◊∞◊◊◊", 3));
        assert!(!answer_matches("xy", "◊◊◊∞◊◊◊", 4));
    }

    #[test]
    fn correct_answer_scores_by_multiplier() {
        let mut rng = Rng::seeded(8);
        let mut g = InceptionGame::new();
        assert_eq!(g.check_answer("realidad", &mut rng), None); // intro
        g.start(&mut rng);
        let word = g.current_word().to_string();
        assert_eq!(g.check_answer("   ", &mut rng), None);
        assert_eq!(g.check_answer(&word, &mut rng), Some(true));
        assert_eq!(g.score(), 10);

        g.go_deeper(&mut rng);
        g.go_deeper(&mut rng);
        g.go_deeper(&mut rng);
        g.finish_transition();
        assert_eq!(g.check_answer("cualquiera", &mut rng), Some(true));
        assert_eq!(g.score(), 10 + 10 * 100);
    }

    #[test]
    fn history_is_capped() {
        let mut rng = Rng::seeded(4);
        let mut g = InceptionGame::new();
        for _ in 0..30 {
            g.new_word(&mut rng);
        }
        assert_eq!(g.history().len(), HISTORY_LEN);
        assert_eq!(g.history().last().unwrap(), g.current_word());
    }

    #[test]
    fn reset_restores_intro() {
        let mut rng = Rng::seeded(4);
        let mut g = InceptionGame::new();
        g.start(&mut rng);
        g.go_deeper(&mut rng);
        g.tick_second();
        g.reset();
        assert_eq!(g.level(), 0);
        assert_eq!(g.phase(), Phase::Intro);
        assert_eq!(g.history(), &["realidad".to_string()]);
        assert_eq!(g.time_in_level(), 0);
    }

    #[test]
    fn dream_time_units() {
        assert_eq!(format_dream_time(30, 0), "30s");
        assert_eq!(format_dream_time(30, 1), "2m 30s");
        assert_eq!(format_dream_time(200, 2), "1h 6m");
        assert_eq!(format_dream_time(1000, 4), "5d 18h");
    }
}
