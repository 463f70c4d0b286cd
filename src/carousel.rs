//! Scroll affordance for the horizontal movie rows.
//!
//! The browser reports three measurements on every scroll event; everything
//! the controls need is derived from them here, so the rule can be exercised
//! without a layout engine. The rendered row carries [`END_EPSILON_PX`] and
//! [`SCROLL_STEP_RATIO`] as data attributes for the inline script.

/// Distance from the far edge, in CSS pixels, that still counts as "at end".
/// Absorbs sub-pixel rounding of `scrollLeft` on fractional-DPI displays.
pub const END_EPSILON_PX: f64 = 10.0;

/// Fraction of the visible width moved by one control activation.
pub const SCROLL_STEP_RATIO: f64 = 0.75;

/// Placeholder blocks rendered while a row is loading.
pub const PLACEHOLDER_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub scroll_width: f64,
    pub client_width: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, scroll_width: f64, client_width: f64) -> Self {
        Self {
            offset,
            scroll_width,
            client_width,
        }
    }

    fn overflows(&self) -> bool {
        self.scroll_width > self.client_width
    }

    fn max_offset(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAffordance {
    pub can_scroll_left: bool,
    pub can_scroll_right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPosition {
    NoOverflow,
    AtStart,
    AtMiddle,
    AtEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

pub fn scroll_affordance(metrics: ScrollMetrics) -> ScrollAffordance {
    if !metrics.overflows() {
        return ScrollAffordance {
            can_scroll_left: false,
            can_scroll_right: false,
        };
    }
    ScrollAffordance {
        can_scroll_left: metrics.offset > 0.0,
        can_scroll_right: metrics.offset < metrics.max_offset() - END_EPSILON_PX,
    }
}

/// Overflow narrower than [`END_EPSILON_PX`] leaves both controls disabled
/// at offset zero and is reported as `NoOverflow`.
pub fn scroll_position(metrics: ScrollMetrics) -> ScrollPosition {
    let affordance = scroll_affordance(metrics);
    match (affordance.can_scroll_left, affordance.can_scroll_right) {
        (false, false) => ScrollPosition::NoOverflow,
        (false, true) => ScrollPosition::AtStart,
        (true, true) => ScrollPosition::AtMiddle,
        (true, false) => ScrollPosition::AtEnd,
    }
}

/// Offset a control activation scrolls to, clamped to the scrollable range
/// the way the platform clamps `scrollTo`.
pub fn scroll_target(metrics: ScrollMetrics, direction: ScrollDirection) -> f64 {
    let step = metrics.client_width * SCROLL_STEP_RATIO;
    let target = match direction {
        ScrollDirection::Left => metrics.offset - step,
        ScrollDirection::Right => metrics.offset + step,
    };
    target.clamp(0.0, metrics.max_offset())
}

/// Which of the mutually exclusive renderings a data section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionView<'a, T> {
    Loading,
    Error,
    Empty,
    Items(&'a [T]),
}

impl<'a, T> SectionView<'a, T> {
    /// Checks loading, then error, then emptiness, in that order.
    pub fn select(loading: bool, error: bool, items: &'a [T]) -> Self {
        if loading {
            SectionView::Loading
        } else if error {
            SectionView::Error
        } else if items.is_empty() {
            SectionView::Empty
        } else {
            SectionView::Items(items)
        }
    }
}
