//! Decorative draw reveal.
//!
//! After the registry has already assigned a category, the presentation layer
//! spins through candidate names and settles on the result. A [`RevealPlan`]
//! is that finite frame sequence; iterating it twice yields the same frames.

use std::time::Duration;

use rand::Rng;

use giftdraw_core::CategoryName;

const BASE_DELAY_MS: u64 = 40;
const DELAY_STEP_MS: u64 = 12;
const FINAL_HOLD_MS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealFrame {
    pub label: String,
    /// How long the frame stays on screen.
    pub delay: Duration,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPlan {
    frames: Vec<RevealFrame>,
}

impl RevealPlan {
    /// Build `spins` spinning frames over `candidates`, starting at a random
    /// offset and slowing down, followed by one final frame showing `result`.
    pub fn new<R: Rng + ?Sized>(
        candidates: &[CategoryName],
        result: &CategoryName,
        spins: usize,
        rng: &mut R,
    ) -> Self {
        let mut frames = Vec::with_capacity(spins + 1);
        if !candidates.is_empty() {
            let offset = rng.random_range(0..candidates.len());
            for i in 0..spins {
                let label = &candidates[(offset + i) % candidates.len()];
                let step = u64::try_from(i).unwrap_or(u64::MAX);
                frames.push(RevealFrame {
                    label: label.0.clone(),
                    delay: Duration::from_millis(
                        BASE_DELAY_MS.saturating_add(DELAY_STEP_MS.saturating_mul(step)),
                    ),
                    is_final: false,
                });
            }
        }
        frames.push(RevealFrame {
            label: result.0.clone(),
            delay: Duration::from_millis(FINAL_HOLD_MS),
            is_final: true,
        });
        Self { frames }
    }

    /// Restartable: every call starts from the first frame.
    pub fn frames(&self) -> std::slice::Iter<'_, RevealFrame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true: a plan always ends with its final frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn final_frame(&self) -> Option<&RevealFrame> {
        self.frames.last()
    }

    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(|f| f.delay).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names() -> Vec<CategoryName> {
        ["Vestimenta", "Juguetes", "Alimentación"]
            .into_iter()
            .map(CategoryName::from)
            .collect()
    }

    #[test]
    fn ends_on_result_and_is_finite() {
        let result = CategoryName::from("Juguetes");
        let plan = RevealPlan::new(&names(), &result, 12, &mut StdRng::seed_from_u64(5));
        assert_eq!(plan.len(), 13);
        let last = plan.final_frame().expect("final frame");
        assert!(last.is_final);
        assert_eq!(last.label, "Juguetes");
        assert_eq!(plan.frames().filter(|f| f.is_final).count(), 1);
    }

    #[test]
    fn spinning_frames_slow_down() {
        let plan = RevealPlan::new(&names(), &names()[0], 8, &mut StdRng::seed_from_u64(5));
        let delays: Vec<Duration> = plan.frames().filter(|f| !f.is_final).map(|f| f.delay).collect();
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn frames_are_restartable() {
        let plan = RevealPlan::new(&names(), &names()[2], 6, &mut StdRng::seed_from_u64(9));
        let first: Vec<_> = plan.frames().cloned().collect();
        let second: Vec<_> = plan.frames().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn no_candidates_still_reveals_result() {
        let result = CategoryName::from("Vestimenta");
        let plan = RevealPlan::new(&[], &result, 10, &mut StdRng::seed_from_u64(1));
        assert_eq!(plan.len(), 1);
        assert!(!plan.is_empty());
        assert_eq!(plan.total_duration(), Duration::from_millis(FINAL_HOLD_MS));
    }
}
