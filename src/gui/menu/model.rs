use super::anim::{AnimationSpec, AnimationState};
use super::layout::{HitResult, Point, RingLayout};
use super::{HIT_INNER_RATIO, MenuError};
use gdk_pixbuf::Pixbuf;
use palette::Srgba;
use std::time::{Duration, Instant};

/// Slice content is a tagged variant, distinguished exhaustively at render
/// time rather than an untyped label-or-resource pair.
#[derive(Debug, Clone)]
pub enum SliceContent {
    Text(String),
    Icon(Pixbuf),
}

#[derive(Debug, Clone)]
pub struct Slice {
    pub content: SliceContent,
    pub color: Srgba<f64>,
}

#[derive(Debug, Clone)]
pub struct MenuOptions {
    /// Ring diameter in pixels.
    pub donut_size: f64,
    /// Drawn stroke width of the ring band. Does not affect the hit-test
    /// inner boundary, which is always half the outer radius.
    pub thickness: f64,
    pub icon_size: f64,
    pub animation_enabled: bool,
    pub animation: AnimationSpec,
    pub per_slice_delay: Duration,
    pub close_color: Srgba<f64>,
    pub close_tint: Srgba<f64>,
    pub center_icon: Option<Pixbuf>,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            donut_size: 320.0,
            thickness: 85.0,
            icon_size: 20.0,
            animation_enabled: true,
            animation: AnimationSpec::default(),
            per_slice_delay: Duration::from_millis(60),
            close_color: Srgba::new(0.933, 0.376, 0.333, 1.0),
            close_tint: Srgba::new(1.0, 1.0, 1.0, 1.0),
            center_icon: None,
        }
    }
}

/// What a classified tap means to the host.
///
/// `SliceSelected` never carries index 0; the close wedge is reported as
/// `Dismiss` and closes the menu itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapEvent {
    Dismiss,
    CenterAction,
    SliceSelected(usize),
}

#[derive(Debug)]
struct Session {
    center: Point,
    animation: AnimationState,
    generation: u64,
}

/// The radial menu: action slices, options, ring geometry and the active
/// display session. Slice 0 is the reserved close slice; it is implicit (not
/// part of `actions`) and always renders with the configured close style.
#[derive(Debug)]
pub struct RadialMenu {
    actions: Vec<Slice>,
    options: MenuOptions,
    ring: RingLayout,
    session: Option<Session>,
    next_generation: u64,
}

impl RadialMenu {
    /// Validates configuration and content up front; a menu that constructs
    /// successfully can be opened and rendered without further failure.
    pub fn new(actions: Vec<Slice>, options: MenuOptions) -> Result<Self, MenuError> {
        if actions.is_empty() {
            return Err(MenuError::Configuration(
                "at least one action slice is required".into(),
            ));
        }
        for (name, value) in [
            ("donut_size", options.donut_size),
            ("thickness", options.thickness),
            ("icon_size", options.icon_size),
        ] {
            if !(value > 0.0) {
                return Err(MenuError::Configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if options.animation_enabled && options.animation.duration.is_zero() {
            return Err(MenuError::Configuration(
                "animation duration must be non-zero".into(),
            ));
        }
        for (i, slice) in actions.iter().enumerate() {
            // index as seen by the caller, i.e. after the implicit close slice
            let index = i + 1;
            match &slice.content {
                SliceContent::Text(label) if label.trim().is_empty() => {
                    return Err(MenuError::InvalidContent {
                        index,
                        reason: "empty label".into(),
                    });
                }
                SliceContent::Icon(pixbuf) if pixbuf.width() <= 0 || pixbuf.height() <= 0 => {
                    return Err(MenuError::InvalidContent {
                        index,
                        reason: "icon has no pixels".into(),
                    });
                }
                _ => {}
            }
        }

        let outer = options.donut_size / 2.0;
        let ring = RingLayout::new(outer, outer * HIT_INNER_RATIO, actions.len() + 1)?;

        Ok(Self {
            actions,
            options,
            ring,
            session: None,
            next_generation: 0,
        })
    }

    /// Total slice count including the reserved close slice.
    pub fn slice_count(&self) -> usize {
        self.actions.len() + 1
    }

    pub fn ring(&self) -> &RingLayout {
        &self.ring
    }

    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    pub fn slice_color(&self, index: usize) -> Srgba<f64> {
        if index == 0 {
            self.options.close_color
        } else {
            self.actions[index - 1].color
        }
    }

    /// Content for the given slice; the close slice has none (its glyph is a
    /// static overlay drawn by the view).
    pub fn slice_content(&self, index: usize) -> Option<&SliceContent> {
        index.checked_sub(1).map(|i| &self.actions[i].content)
    }

    /// Begin a fresh display session centered on `summon`. Any previous
    /// session (and its pending animations) is discarded.
    pub fn open_at(&mut self, summon: Point, now: Instant) {
        let count = self.slice_count();
        let animation = if self.options.animation_enabled {
            AnimationState::staggered(
                count,
                self.options.per_slice_delay,
                self.options.animation,
                now,
            )
        } else {
            AnimationState::snapped(count)
        };
        self.next_generation += 1;
        self.session = Some(Session {
            center: summon,
            animation,
            generation: self.next_generation,
        });
    }

    /// Idempotent. Cancels all pending per-slice animations by dropping the
    /// session; stale frame callbacks detect this via the generation.
    pub fn close(&mut self) {
        self.session = None;
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn center(&self) -> Option<Point> {
        self.session.as_ref().map(|s| s.center)
    }

    pub fn session_generation(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.generation)
    }

    pub fn is_animating(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.animation.is_animating())
    }

    /// Advance the animation. Returns whether another frame is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.session
            .as_mut()
            .map(|s| s.animation.tick(now))
            .unwrap_or(false)
    }

    pub fn progress(&self, index: usize) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.animation.progress(index))
            .unwrap_or(0.0)
    }

    /// Classify a tap against the static ring geometry (the animated scale
    /// never shifts the hit-test boundary) and translate it into an event.
    ///
    /// Tapping the close wedge closes the menu; selecting a slice or the
    /// center action leaves it open, dismissal stays host-controlled.
    /// Returns `None` when the menu is closed.
    pub fn handle_tap(&mut self, tap: Point) -> Option<TapEvent> {
        let center = self.session.as_ref()?.center;
        Some(match self.ring.classify(tap, center) {
            HitResult::CloseSlice => {
                self.close();
                TapEvent::Dismiss
            }
            HitResult::CenterAction => TapEvent::CenterAction,
            HitResult::Slice(index) => TapEvent::SliceSelected(index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_slice(label: &str) -> Slice {
        Slice {
            content: SliceContent::Text(label.into()),
            color: Srgba::new(0.5, 0.5, 0.5, 1.0),
        }
    }

    fn options() -> MenuOptions {
        MenuOptions {
            donut_size: 200.0,
            ..MenuOptions::default()
        }
    }

    /// Three actions + close slice, outer radius 100, hit inner radius 50.
    fn menu() -> RadialMenu {
        RadialMenu::new(
            vec![text_slice("alpha"), text_slice("beta"), text_slice("gamma")],
            options(),
        )
        .unwrap()
    }

    #[test]
    fn requires_at_least_one_action() {
        let err = RadialMenu::new(Vec::new(), options()).unwrap_err();
        assert!(matches!(err, MenuError::Configuration(_)));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let mut opts = options();
        opts.thickness = 0.0;
        assert!(RadialMenu::new(vec![text_slice("a")], opts).is_err());
    }

    #[test]
    fn rejects_zero_animation_duration_when_enabled() {
        let mut opts = options();
        opts.animation.duration = Duration::ZERO;
        assert!(RadialMenu::new(vec![text_slice("a")], opts.clone()).is_err());
        // irrelevant when animation is off
        opts.animation_enabled = false;
        assert!(RadialMenu::new(vec![text_slice("a")], opts).is_ok());
    }

    #[test]
    fn rejects_empty_labels_at_build_time() {
        let err = RadialMenu::new(vec![text_slice("ok"), text_slice("  ")], options()).unwrap_err();
        assert_eq!(
            err,
            MenuError::InvalidContent {
                index: 2,
                reason: "empty label".into()
            }
        );
    }

    #[test]
    fn close_slice_is_implicit_and_styleless() {
        let menu = menu();
        assert_eq!(menu.slice_count(), 4);
        assert!(menu.slice_content(0).is_none());
        assert!(menu.slice_content(1).is_some());
    }

    #[test]
    fn disabled_animation_snaps_everything_on_open() {
        let mut opts = options();
        opts.animation_enabled = false;
        let mut menu = RadialMenu::new(vec![text_slice("a"), text_slice("b")], opts).unwrap();
        menu.open_at(Point::new(100.0, 100.0), Instant::now());
        assert!(!menu.is_animating());
        for i in 0..menu.slice_count() {
            assert_eq!(menu.progress(i), 1.0);
        }
    }

    #[test]
    fn staggered_open_starts_hidden() {
        let mut menu = menu();
        menu.open_at(Point::new(100.0, 100.0), Instant::now());
        assert!(menu.is_animating());
        for i in 0..menu.slice_count() {
            assert_eq!(menu.progress(i), 0.0);
        }
    }

    #[test]
    fn tap_in_close_wedge_dismisses_and_closes() {
        let mut menu = menu();
        menu.open_at(Point::new(100.0, 100.0), Instant::now());
        // straight up from center: wedge 0 regardless of distance
        assert_eq!(
            menu.handle_tap(Point::new(100.0, 0.0)),
            Some(TapEvent::Dismiss)
        );
        assert!(!menu.is_open());
        // no second dismissal once closed
        assert_eq!(menu.handle_tap(Point::new(100.0, 0.0)), None);
    }

    #[test]
    fn tap_in_ring_band_selects_the_slice() {
        let mut menu = menu();
        menu.open_at(Point::new(100.0, 100.0), Instant::now());
        // raw 0 deg normalizes to 112.5, sweep 90 -> slice 1; distance 75
        assert_eq!(
            menu.handle_tap(Point::new(175.0, 100.0)),
            Some(TapEvent::SliceSelected(1))
        );
        // selection does not auto-close
        assert!(menu.is_open());
    }

    #[test]
    fn tap_in_hole_or_outside_is_the_center_action() {
        let mut menu = menu();
        menu.open_at(Point::new(100.0, 100.0), Instant::now());
        assert_eq!(
            menu.handle_tap(Point::new(100.0, 100.0)),
            Some(TapEvent::CenterAction)
        );
        assert_eq!(
            menu.handle_tap(Point::new(400.0, 100.0)),
            Some(TapEvent::CenterAction)
        );
        assert!(menu.is_open());
    }

    #[test]
    fn close_is_idempotent() {
        let mut menu = menu();
        menu.open_at(Point::new(100.0, 100.0), Instant::now());
        menu.close();
        menu.close();
        assert!(!menu.is_open());
        assert_eq!(menu.progress(1), 0.0);
    }

    #[test]
    fn reopening_starts_a_fresh_schedule() {
        let mut menu = menu();
        let t0 = Instant::now();
        menu.open_at(Point::new(100.0, 100.0), t0);
        let first = menu.session_generation();
        menu.tick(t0 + Duration::from_secs(5));
        assert_eq!(menu.progress(1), 1.0);

        menu.open_at(Point::new(50.0, 50.0), t0 + Duration::from_secs(6));
        assert_ne!(menu.session_generation(), first);
        assert_eq!(menu.progress(1), 0.0);
        assert_eq!(menu.center(), Some(Point::new(50.0, 50.0)));
    }
}
