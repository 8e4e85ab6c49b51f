//! Viewport navigation state machine.
//!
//! The view is either idle or being dragged. Scroll and key input apply in
//! both states. Each transition is a pure function from one
//! [`ViewportState`] to the next; [`ViewportController`] feeds input events
//! through them and swaps in the result whole, so a handler never leaves
//! the state half updated.
//!
//! ```text
//!          DragStart                 DragMove (recenters)
//!   Idle ─────────────▶ Dragging ◀────────┐
//!    ▲                     │  └───────────┘
//!    └──── DragEnd / PointerLeave ─┘
//! ```

use serde::{Deserialize, Serialize};

use crate::config::NavigationConfig;
use crate::projection::{Projection, SkyCoord, ViewportSize};
use crate::units::{normalize_angle, normalize_dec};

/// Lowest zoom; the full-sky view
pub const MIN_ZOOM: f64 = 1.0;

/// Pointer position and view center captured when a drag begins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragAnchor {
    pub pointer_x: f64,
    pub pointer_y: f64,
    pub center: SkyCoord,
}

/// Current view: center, zoom, and the drag anchor while dragging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub center: SkyCoord,
    pub zoom: f64,
    pub drag: Option<DragAnchor>,
}

/// Navigation phase derived from [`ViewportState::drag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Dragging,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(SkyCoord::default(), MIN_ZOOM)
    }
}

impl ViewportState {
    /// Idle state at a normalized center with zoom of at least 1
    pub fn new(center: SkyCoord, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() { zoom.max(MIN_ZOOM) } else { MIN_ZOOM };
        Self {
            center: normalize_center(center.ra, center.dec),
            zoom,
            drag: None,
        }
    }

    pub fn phase(&self) -> NavPhase {
        match self.drag {
            Some(_) => NavPhase::Dragging,
            None => NavPhase::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Projection of this view onto a viewport
    pub fn projection(&self, size: ViewportSize) -> Projection {
        Projection::new(self.center, self.zoom, size)
    }
}

/// Discrete navigation keys.
///
/// `w`/`a`/`s`/`d` move by the fine step, the arrow keys by the coarse step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// Direction a [`NavKey`] moves the view center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dec increases
    North,
    /// Dec decreases
    South,
    /// RA increases
    East,
    /// RA decreases
    West,
}

impl NavKey {
    /// Map a key name (`"w"`, `"ArrowUp"`, ...) to a navigation key
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "w" | "W" => Some(NavKey::W),
            "a" | "A" => Some(NavKey::A),
            "s" | "S" => Some(NavKey::S),
            "d" | "D" => Some(NavKey::D),
            "ArrowUp" => Some(NavKey::ArrowUp),
            "ArrowDown" => Some(NavKey::ArrowDown),
            "ArrowLeft" => Some(NavKey::ArrowLeft),
            "ArrowRight" => Some(NavKey::ArrowRight),
            _ => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            NavKey::W | NavKey::ArrowUp => Direction::North,
            NavKey::S | NavKey::ArrowDown => Direction::South,
            NavKey::D | NavKey::ArrowRight => Direction::East,
            NavKey::A | NavKey::ArrowLeft => Direction::West,
        }
    }

    /// Step at zoom 1, in degrees
    pub fn step_deg(self, config: &NavigationConfig) -> f64 {
        match self {
            NavKey::W | NavKey::A | NavKey::S | NavKey::D => config.fine_step_deg,
            _ => config.coarse_step_deg,
        }
    }
}

/// Begin a drag at a pointer position. A drag already in progress is
/// re-anchored.
pub fn on_drag_start(state: &ViewportState, x: f64, y: f64) -> ViewportState {
    if !(x.is_finite() && y.is_finite()) {
        return *state;
    }
    ViewportState {
        drag: Some(DragAnchor {
            pointer_x: x,
            pointer_y: y,
            center: state.center,
        }),
        ..*state
    }
}

/// Recenter from the drag anchor by the pointer displacement.
///
/// Pan speed scales with `1/zoom`. Ignored while idle or when the viewport
/// has no usable size.
pub fn on_drag_move(
    state: &ViewportState,
    x: f64,
    y: f64,
    size: ViewportSize,
    config: &NavigationConfig,
) -> ViewportState {
    let Some(anchor) = state.drag else {
        return *state;
    };
    if !size.is_valid() || !(x.is_finite() && y.is_finite()) {
        return *state;
    }

    let ra_delta = -(x - anchor.pointer_x) / size.width * config.drag_ra_span_deg / state.zoom;
    let dec_delta = (y - anchor.pointer_y) / size.height * config.drag_dec_span_deg / state.zoom;

    ViewportState {
        center: normalize_center(anchor.center.ra + ra_delta, anchor.center.dec + dec_delta),
        ..*state
    }
}

/// End a drag, keeping the last computed center
pub fn on_drag_end(state: &ViewportState) -> ViewportState {
    ViewportState {
        drag: None,
        ..*state
    }
}

/// Apply a scroll delta: `zoom -= zoom · sensitivity · delta`, never below 1.
///
/// Non-finite deltas or results leave the zoom unchanged.
pub fn on_scroll(state: &ViewportState, delta: f64, config: &NavigationConfig) -> ViewportState {
    let zoom = state.zoom - state.zoom * config.zoom_sensitivity * delta;
    if !zoom.is_finite() {
        return *state;
    }
    ViewportState {
        zoom: zoom.max(MIN_ZOOM),
        ..*state
    }
}

/// Move the center one step in the key's direction, scaled by `1/zoom`
pub fn on_key(state: &ViewportState, key: NavKey, config: &NavigationConfig) -> ViewportState {
    let step = key.step_deg(config) / state.zoom;
    let SkyCoord { ra, dec } = state.center;
    let center = match key.direction() {
        Direction::North => normalize_center(ra, dec + step),
        Direction::South => normalize_center(ra, dec - step),
        Direction::East => normalize_center(ra + step, dec),
        Direction::West => normalize_center(ra - step, dec),
    };
    ViewportState { center, ..*state }
}

fn normalize_center(ra: f64, dec: f64) -> SkyCoord {
    SkyCoord::new(normalize_angle(ra), normalize_dec(dec))
}

/// Input events understood by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    DragStart { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
    PointerLeave,
    Scroll { delta: f64 },
    Key(NavKey),
    Resize(ViewportSize),
    /// Open or close the info overlay
    ToggleInfo,
}

/// Owns the viewport state for one viewing session
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    config: NavigationConfig,
    size: ViewportSize,
    info_open: bool,
}

impl ViewportController {
    pub fn new(config: NavigationConfig, size: ViewportSize) -> Self {
        Self {
            state: ViewportState::new(config.initial_center, config.initial_zoom),
            config,
            size,
            info_open: false,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn info_open(&self) -> bool {
        self.info_open
    }

    pub fn projection(&self) -> Projection {
        self.state.projection(self.size)
    }

    /// Handle one input event. Returns true if the view state or the info
    /// overlay changed.
    ///
    /// While the info overlay is open only `ToggleInfo` and `Resize` have
    /// any effect.
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        use InputEvent::*;
        use NavPhase::*;

        if self.info_open && !matches!(event, ToggleInfo | Resize(_)) {
            return false;
        }

        let was_open = self.info_open;
        let next = match (self.state.phase(), event) {
            (_, ToggleInfo) => {
                self.info_open = !self.info_open;
                if self.info_open {
                    log::info!("Info overlay opened, navigation paused");
                    on_drag_end(&self.state)
                } else {
                    log::info!("Info overlay closed");
                    self.state
                }
            }
            (_, Resize(size)) => {
                log::debug!("Viewport resized to {}x{}", size.width, size.height);
                self.size = size;
                self.state
            }

            (Idle, DragStart { x, y }) => {
                log::debug!("Drag started at ({x}, {y})");
                on_drag_start(&self.state, x, y)
            }
            (Dragging, DragStart { x, y }) => on_drag_start(&self.state, x, y),
            (Dragging, DragMove { x, y }) => {
                on_drag_move(&self.state, x, y, self.size, &self.config)
            }
            (Dragging, DragEnd | PointerLeave) => {
                log::debug!(
                    "Drag ended at RA {:.3}, Dec {:.3}",
                    self.state.center.ra,
                    self.state.center.dec
                );
                on_drag_end(&self.state)
            }
            (Idle, DragMove { .. } | DragEnd | PointerLeave) => self.state,

            (_, Scroll { delta }) => on_scroll(&self.state, delta, &self.config),
            (_, Key(key)) => on_key(&self.state, key, &self.config),
        };

        let changed = next != self.state || was_open != self.info_open;
        self.state = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const SIZE: ViewportSize = ViewportSize::new(1000.0, 500.0);

    fn controller() -> ViewportController {
        ViewportController::new(NavigationConfig::default(), SIZE)
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        assert_eq!(c.state().phase(), NavPhase::Idle);
        assert_eq!(c.state().zoom, 1.0);
        assert_eq!(c.state().center, SkyCoord::new(0.0, 0.0));
    }

    #[test]
    fn test_new_state_clamps_inputs() {
        let s = ViewportState::new(SkyCoord::new(-30.0, 100.0), 0.2);
        assert_relative_eq!(s.center.ra, 330.0);
        assert_relative_eq!(s.center.dec, 90.0);
        assert_eq!(s.zoom, 1.0);
        assert_eq!(ViewportState::new(SkyCoord::default(), f64::NAN).zoom, 1.0);
    }

    #[test]
    fn test_drag_pans_from_anchor() {
        let mut c = controller();
        c.handle_event(InputEvent::DragStart { x: 500.0, y: 250.0 });
        assert_eq!(c.state().phase(), NavPhase::Dragging);

        // A tenth of the width to the right: RA decreases by 72°
        c.handle_event(InputEvent::DragMove { x: 600.0, y: 250.0 });
        assert_relative_eq!(c.state().center.ra, 288.0, epsilon = 1e-9);

        // Moves are relative to the anchor, not the previous position
        c.handle_event(InputEvent::DragMove { x: 550.0, y: 300.0 });
        assert_relative_eq!(c.state().center.ra, 324.0, epsilon = 1e-9);
        assert_relative_eq!(c.state().center.dec, 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_drag_speed_scales_with_zoom() {
        let state = ViewportState::new(SkyCoord::new(100.0, 0.0), 4.0);
        let state = on_drag_start(&state, 0.0, 0.0);
        let state = on_drag_move(&state, -100.0, 0.0, SIZE, &NavigationConfig::default());
        assert_relative_eq!(state.center.ra, 118.0, epsilon = 1e-9);
    }

    #[test]
    fn test_drag_dec_clamps_at_pole() {
        let mut c = controller();
        c.handle_event(InputEvent::DragStart { x: 0.0, y: 0.0 });
        c.handle_event(InputEvent::DragMove { x: 0.0, y: 400.0 });
        assert_eq!(c.state().center.dec, 90.0);
    }

    #[rstest]
    #[case(InputEvent::DragEnd)]
    #[case(InputEvent::PointerLeave)]
    fn test_drag_end_keeps_last_center(#[case] end: InputEvent) {
        let mut c = controller();
        c.handle_event(InputEvent::DragStart { x: 500.0, y: 250.0 });
        c.handle_event(InputEvent::DragMove { x: 450.0, y: 200.0 });
        let dragged = c.state().center;

        assert!(c.handle_event(end));
        assert_eq!(c.state().phase(), NavPhase::Idle);
        assert_eq!(c.state().center, dragged);

        // Moves after the drag do nothing
        assert!(!c.handle_event(InputEvent::DragMove { x: 0.0, y: 0.0 }));
        assert_eq!(c.state().center, dragged);
    }

    #[test]
    fn test_drag_move_ignored_for_empty_viewport() {
        let state = on_drag_start(&ViewportState::default(), 0.0, 0.0);
        let next = on_drag_move(
            &state,
            10.0,
            10.0,
            ViewportSize::new(0.0, 0.0),
            &NavigationConfig::default(),
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_scroll_zoom() {
        let config = NavigationConfig::default();
        let state = ViewportState::default();

        let zoomed = on_scroll(&state, -1000.0, &config);
        assert_relative_eq!(zoomed.zoom, 2.0);

        let zoomed = on_scroll(&zoomed, 500.0, &config);
        assert_relative_eq!(zoomed.zoom, 1.0);
    }

    #[test]
    fn test_zoom_never_below_one() {
        let mut c = controller();
        for _ in 0..50 {
            c.handle_event(InputEvent::Scroll { delta: 5000.0 });
            assert!(c.state().zoom >= 1.0);
        }
        assert_eq!(c.state().zoom, 1.0);
    }

    #[test]
    fn test_scroll_non_finite_ignored() {
        let mut c = controller();
        c.handle_event(InputEvent::Scroll { delta: -1000.0 });
        assert!(!c.handle_event(InputEvent::Scroll { delta: f64::NAN }));
        assert!(!c.handle_event(InputEvent::Scroll {
            delta: f64::NEG_INFINITY
        }));
        assert_relative_eq!(c.state().zoom, 2.0);
    }

    #[rstest]
    #[case(NavKey::W, 0.0, 2.0)]
    #[case(NavKey::S, 0.0, -2.0)]
    #[case(NavKey::D, 2.0, 0.0)]
    #[case(NavKey::A, 358.0, 0.0)]
    #[case(NavKey::ArrowUp, 0.0, 5.0)]
    #[case(NavKey::ArrowDown, 0.0, -5.0)]
    #[case(NavKey::ArrowRight, 5.0, 0.0)]
    #[case(NavKey::ArrowLeft, 355.0, 0.0)]
    fn test_key_steps(#[case] key: NavKey, #[case] ra: f64, #[case] dec: f64) {
        let state = on_key(&ViewportState::default(), key, &NavigationConfig::default());
        assert_relative_eq!(state.center.ra, ra, epsilon = 1e-9);
        assert_relative_eq!(state.center.dec, dec, epsilon = 1e-9);
    }

    #[test]
    fn test_key_step_scales_with_zoom() {
        let state = ViewportState::new(SkyCoord::new(10.0, 89.5), 2.0);
        let state = on_key(&state, NavKey::ArrowUp, &NavigationConfig::default());
        assert_eq!(state.center.dec, 90.0);
        let state = on_key(&state, NavKey::D, &NavigationConfig::default());
        assert_relative_eq!(state.center.ra, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_keys_and_scroll_apply_while_dragging() {
        let mut c = controller();
        c.handle_event(InputEvent::DragStart { x: 0.0, y: 0.0 });
        c.handle_event(InputEvent::Key(NavKey::W));
        c.handle_event(InputEvent::Scroll { delta: -1000.0 });
        assert_eq!(c.state().phase(), NavPhase::Dragging);
        assert_relative_eq!(c.state().center.dec, 2.0);
        assert_relative_eq!(c.state().zoom, 2.0);
    }

    #[test]
    fn test_toggle_info_while_idle_reports_change() {
        let mut c = controller();
        assert!(c.handle_event(InputEvent::ToggleInfo));
        assert!(c.info_open());
        assert_eq!(*c.state(), ViewportState::default());
        assert!(c.handle_event(InputEvent::ToggleInfo));
        assert!(!c.info_open());
    }

    #[test]
    fn test_info_overlay_blocks_navigation() {
        let mut c = controller();
        c.handle_event(InputEvent::DragStart { x: 10.0, y: 10.0 });

        assert!(c.handle_event(InputEvent::ToggleInfo));
        assert!(c.info_open());
        assert_eq!(c.state().phase(), NavPhase::Idle);

        assert!(!c.handle_event(InputEvent::Key(NavKey::W)));
        assert!(!c.handle_event(InputEvent::Scroll { delta: -500.0 }));
        assert!(!c.handle_event(InputEvent::DragStart { x: 0.0, y: 0.0 }));
        assert_eq!(*c.state(), ViewportState::default());

        c.handle_event(InputEvent::Resize(ViewportSize::new(640.0, 480.0)));
        assert_eq!(c.size(), ViewportSize::new(640.0, 480.0));

        c.handle_event(InputEvent::ToggleInfo);
        assert!(!c.info_open());
        assert!(c.handle_event(InputEvent::Key(NavKey::W)));
    }

    #[test]
    fn test_resize_changes_drag_scale() {
        let mut c = controller();
        c.handle_event(InputEvent::Resize(ViewportSize::new(2000.0, 500.0)));
        c.handle_event(InputEvent::DragStart { x: 0.0, y: 0.0 });
        c.handle_event(InputEvent::DragMove { x: -100.0, y: 0.0 });
        assert_relative_eq!(c.state().center.ra, 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_key_name_mapping() {
        assert_eq!(NavKey::from_key_name("w"), Some(NavKey::W));
        assert_eq!(NavKey::from_key_name("ArrowLeft"), Some(NavKey::ArrowLeft));
        assert_eq!(NavKey::from_key_name("q"), None);
    }
}
