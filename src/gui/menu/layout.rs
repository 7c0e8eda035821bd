use super::{ANGULAR_ORIGIN_DEG, MenuError};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Classification of a tap against the ring.
///
/// Slice 0 is the reserved close wedge and is reported as `CloseSlice` at any
/// radial distance. For every other wedge, taps inside the inner hole or
/// beyond the outer radius fall through to `CenterAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    CloseSlice,
    CenterAction,
    Slice(usize),
}

/// Pure ring partition: outer/inner hit radii plus the slice count.
///
/// The inner radius here is the *hit-test* boundary, not the drawn ring
/// thickness; callers keep the two separate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLayout {
    outer_radius: f64,
    inner_radius: f64,
    slice_count: usize,
}

impl RingLayout {
    pub fn new(outer_radius: f64, inner_radius: f64, slice_count: usize) -> Result<Self, MenuError> {
        if slice_count < 2 {
            return Err(MenuError::Configuration(format!(
                "slice count must be at least 2 (close + one action), got {slice_count}"
            )));
        }
        if !(inner_radius > 0.0) || !(outer_radius > inner_radius) {
            return Err(MenuError::Configuration(format!(
                "radii must satisfy 0 < inner < outer, got inner={inner_radius} outer={outer_radius}"
            )));
        }
        Ok(Self {
            outer_radius,
            inner_radius,
            slice_count,
        })
    }

    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    /// Angular width of one slice, in degrees.
    pub fn sweep(&self) -> f64 {
        360.0 / self.slice_count as f64
    }

    /// Absolute start angle of slice `index`'s wedge, in degrees. Uses the
    /// same angular origin as `classify`.
    pub fn arc_start_deg(&self, index: usize) -> f64 {
        index as f64 * self.sweep() - ANGULAR_ORIGIN_DEG
    }

    /// Midpoint angle of slice `index`, normalized to [0, 360).
    pub fn mid_angle_deg(&self, index: usize) -> f64 {
        (self.arc_start_deg(index) + self.sweep() / 2.0).rem_euclid(360.0)
    }

    fn wedge_index(&self, raw_angle_deg: f64) -> usize {
        let normalized = (raw_angle_deg + ANGULAR_ORIGIN_DEG).rem_euclid(360.0);
        // floor bucketing; the clamp only matters for normalized == 360.0
        ((normalized / self.sweep()) as usize).min(self.slice_count - 1)
    }

    /// Map a tap to a `HitResult`. Total: never fails, even for taps exactly
    /// at the center or on a wedge boundary.
    pub fn classify(&self, tap: Point, center: Point) -> HitResult {
        let (dx, dy) = (tap.x - center.x, tap.y - center.y);
        let distance = dx.hypot(dy);
        let index = self.wedge_index(dy.atan2(dx).to_degrees());

        // the close wedge wins at any distance
        if index == 0 {
            return HitResult::CloseSlice;
        }
        if distance < self.inner_radius || distance > self.outer_radius {
            return HitResult::CenterAction;
        }
        HitResult::Slice(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(count: usize) -> RingLayout {
        RingLayout::new(100.0, 50.0, count).unwrap()
    }

    fn tap_at_angle(center: Point, angle_deg: f64, distance: f64) -> Point {
        let rad = angle_deg.to_radians();
        Point::new(
            center.x + distance * rad.cos(),
            center.y + distance * rad.sin(),
        )
    }

    #[test]
    fn rejects_degenerate_configurations() {
        assert!(RingLayout::new(100.0, 50.0, 1).is_err());
        assert!(RingLayout::new(100.0, 50.0, 0).is_err());
        assert!(RingLayout::new(0.0, 0.0, 6).is_err());
        assert!(RingLayout::new(50.0, 100.0, 6).is_err());
        assert!(RingLayout::new(100.0, 50.0, 2).is_ok());
    }

    #[test]
    fn tap_at_exact_center_is_center_action() {
        // atan2(0,0) = 0, normalizes to 112.5, lands in wedge 1 for six
        // slices; distance 0 < inner radius wins because the wedge is not 0.
        let center = Point::new(100.0, 100.0);
        assert_eq!(
            ring(6).classify(center, center),
            HitResult::CenterAction
        );
    }

    #[test]
    fn tap_on_outer_radius_is_inside_the_ring() {
        // directly right of center, distance exactly equal to the outer
        // radius: the `> outer` check fails, so the slice wins
        let center = Point::new(100.0, 100.0);
        let tap = Point::new(200.0, 100.0);
        assert_eq!(ring(6).classify(tap, center), HitResult::Slice(1));
    }

    #[test]
    fn close_wedge_wins_at_any_distance() {
        let center = Point::new(100.0, 100.0);
        // straight up: raw -90 deg normalizes to 22.5, wedge 0 for six slices
        for distance in [1.0, 49.0, 75.0, 100.0, 500.0] {
            let tap = tap_at_angle(center, -90.0, distance);
            assert_eq!(ring(6).classify(tap, center), HitResult::CloseSlice);
        }
    }

    #[test]
    fn inner_hole_falls_through_to_center_action() {
        let center = Point::new(100.0, 100.0);
        let tap = tap_at_angle(center, 0.0, 10.0);
        assert_eq!(ring(6).classify(tap, center), HitResult::CenterAction);
    }

    #[test]
    fn outside_ring_falls_through_to_center_action() {
        let center = Point::new(100.0, 100.0);
        let tap = tap_at_angle(center, 0.0, 250.0);
        assert_eq!(ring(6).classify(tap, center), HitResult::CenterAction);
    }

    #[test]
    fn boundary_angle_belongs_to_the_starting_slice() {
        // four slices, sweep 90: raw 0 deg normalizes to 112.5 -> wedge 1;
        // raw -22.5 normalizes to exactly 90.0, the start of wedge 1
        let center = Point::new(100.0, 100.0);
        let layout = ring(4);
        assert_eq!(
            layout.classify(tap_at_angle(center, 0.0, 75.0), center),
            HitResult::Slice(1)
        );
        assert_eq!(
            layout.classify(tap_at_angle(center, -22.5, 75.0), center),
            HitResult::Slice(1)
        );
    }

    #[test]
    fn wedge_index_is_clamped_to_the_last_slice() {
        // raw 247.4 deg normalizes to 359.9, just shy of wrapping
        let center = Point::new(100.0, 100.0);
        let tap = tap_at_angle(center, 247.4, 75.0);
        assert_eq!(ring(6).classify(tap, center), HitResult::Slice(5));
    }

    #[test]
    fn classify_is_deterministic_and_total() {
        let layout = ring(5);
        let center = Point::new(40.0, 60.0);
        for ix in -3..=3 {
            for iy in -3..=3 {
                let tap = Point::new(ix as f64 * 55.0, iy as f64 * 55.0);
                let first = layout.classify(tap, center);
                assert_eq!(first, layout.classify(tap, center));
                if let HitResult::Slice(i) = first {
                    assert!(i >= 1 && i < 5);
                }
            }
        }
    }

    #[test]
    fn drawing_and_hit_testing_share_the_angular_origin() {
        let layout = ring(6);
        for index in 0..6 {
            let center = Point::default();
            let mid = layout.arc_start_deg(index) + layout.sweep() / 2.0;
            let tap = tap_at_angle(center, mid, 75.0);
            let expected = if index == 0 {
                HitResult::CloseSlice
            } else {
                HitResult::Slice(index)
            };
            assert_eq!(layout.classify(tap, center), expected);
        }
    }
}
