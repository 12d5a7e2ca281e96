//! Tiny seeded generator for word picks, gradients and distortion rolls.
//! Not crypto secure; only the cosmetic layers draw from it.

const MUL: u32 = 1_664_525;
const INC: u32 = 1_013_904_223;

#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn seeded(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from the browser crypto source (`rng` feature) or the page clock.
    pub fn from_entropy() -> Self {
        Self::seeded(entropy_seed())
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MUL).wrapping_add(INC);
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform index in `0..len`; 0 for an empty range.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.index(items.len()))
        }
    }
}

#[cfg(feature = "rng")]
fn entropy_seed() -> u32 {
    let mut buf = [0u8; 4];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u32::from_le_bytes(buf),
        Err(err) => {
            log::warn!("getrandom failed ({err}); seeding from clock");
            crate::performance_now() as u32
        }
    }
}

#[cfg(not(feature = "rng"))]
fn entropy_seed() -> u32 {
    crate::performance_now() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::seeded(7);
        let mut b = Rng::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn floats_stay_in_unit_range() {
        let mut r = Rng::seeded(123);
        for _ in 0..1000 {
            let v = r.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn index_covers_range_and_handles_empty() {
        let mut r = Rng::seeded(99);
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[r.index(5)] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(r.index(0), 0);
        assert!(r.pick::<u8>(&[]).is_none());
    }
}
