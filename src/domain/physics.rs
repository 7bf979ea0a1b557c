// Shared weight policy and push-apart helpers used by every collision pair.

pub const MIN_WEIGHT: f32 = 1.0;
pub const MAX_WEIGHT: f32 = 100.0;

/// Push weight clamped into the shared 1..=100 range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self(MIN_WEIGHT);
        }
        Self(value.clamp(MIN_WEIGHT, MAX_WEIGHT))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(MIN_WEIGHT)
    }
}

/// How strongly `pusher` shoves `target`, in 0..=1.
///
/// Zero whenever the pusher is not heavier; otherwise `heavier/lighter - 1`,
/// capped at 1, so only a clearly heavier body moves the other.
pub fn push_factor(pusher: Weight, target: Weight) -> f32 {
    if pusher.0 <= target.0 {
        return 0.0;
    }
    (pusher.0 / target.0 - 1.0).min(1.0)
}

/// Fractions of an overlap each side absorbs; the heavier side moves less.
pub fn separation_shares(a: Weight, b: Weight) -> (f32, f32) {
    let total = a.0 + b.0;
    (b.0 / total, a.0 / total)
}

/// Displacements that pull two overlapping circles apart.
///
/// Returns `None` when they do not overlap. Each displacement is capped at
/// `max_step` so dense clusters settle over several ticks instead of
/// exploding apart in one.
#[allow(clippy::too_many_arguments)]
pub fn separate(
    ax: f32,
    ay: f32,
    ar: f32,
    wa: Weight,
    bx: f32,
    by: f32,
    br: f32,
    wb: Weight,
    max_step: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let dx = bx - ax;
    let dy = by - ay;
    let min_dist = ar + br;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Coincident centers: pick a fixed axis so the pair still separates.
    let (nx, ny) = if dist > 1e-4 {
        (dx / dist, dy / dist)
    } else {
        (1.0, 0.0)
    };
    let overlap = min_dist - dist;
    let (share_a, share_b) = separation_shares(wa, wb);
    let step_a = (overlap * share_a).min(max_step);
    let step_b = (overlap * share_b).min(max_step);
    Some(((-nx * step_a, -ny * step_a), (nx * step_b, ny * step_b)))
}

/// Exponential-ish velocity decay: loses `decay_per_sec` of its speed per second.
pub fn decay(v: f32, decay_per_sec: f32, dt: f32) -> f32 {
    v * (1.0 - decay_per_sec * dt).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_weights_are_out_of_range_then_they_clamp() {
        assert_eq!(Weight::new(0.0).get(), 1.0);
        assert_eq!(Weight::new(250.0).get(), 100.0);
        assert_eq!(Weight::new(f32::NAN).get(), 1.0);
    }

    #[test]
    fn when_pusher_is_not_heavier_then_push_factor_is_zero() {
        assert_eq!(push_factor(Weight::new(10.0), Weight::new(10.0)), 0.0);
        assert_eq!(push_factor(Weight::new(5.0), Weight::new(10.0)), 0.0);
    }

    #[test]
    fn when_pusher_is_heavier_then_push_factor_grows_and_caps_at_one() {
        let target = Weight::new(10.0);
        let mut last = 0.0;
        for w in [11.0, 12.0, 15.0, 19.0] {
            let f = push_factor(Weight::new(w), target);
            assert!(f > last, "factor for {w} should grow");
            last = f;
        }
        assert_eq!(push_factor(Weight::new(20.0), target), 1.0);
        assert_eq!(push_factor(Weight::new(90.0), target), 1.0);
    }

    #[test]
    fn when_bodies_overlap_then_heavier_moves_less() {
        let ((ax, _), (bx, _)) = separate(
            0.0,
            0.0,
            10.0,
            Weight::new(30.0),
            15.0,
            0.0,
            10.0,
            Weight::new(10.0),
            100.0,
        )
        .expect("bodies overlap");

        assert!(ax < 0.0 && bx > 0.0);
        assert!(ax.abs() < bx.abs());
        assert!((bx - ax - 5.0).abs() < 1e-4);
    }

    #[test]
    fn when_separation_exceeds_max_step_then_it_is_clamped() {
        let ((ax, _), (bx, _)) = separate(
            0.0,
            0.0,
            50.0,
            Weight::new(1.0),
            1.0,
            0.0,
            50.0,
            Weight::new(1.0),
            4.0,
        )
        .expect("bodies overlap");

        assert_eq!(ax, -4.0);
        assert_eq!(bx, 4.0);
    }

    #[test]
    fn when_bodies_are_apart_then_nothing_moves() {
        assert!(separate(0.0, 0.0, 5.0, Weight::default(), 20.0, 0.0, 5.0, Weight::default(), 4.0).is_none());
    }
}
