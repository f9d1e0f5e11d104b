//! Pure swipe geometry
//!
//! All coordinates are floored to integers. Percentages are applied with
//! integer arithmetic so the floor is exact for every screen size.

use crate::driver::traits::{ScreenSize, SwipeDirection};

/// Where a directional swipe starts, as a percentage of the screen axis
pub const SWIPE_NEAR_PERCENT: u32 = 20;
/// Where a directional swipe ends, as a percentage of the screen axis
pub const SWIPE_FAR_PERCENT: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Start and end of a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipePath {
    pub start: Point,
    pub end: Point,
}

/// `floor(total * percent / 100)`
pub fn percent_of(total: u32, percent: u32) -> i32 {
    (u64::from(total) * u64::from(percent) / 100) as i32
}

/// Point at the given percentages of the screen width and height
pub fn point_at_percent(size: &ScreenSize, x_percent: u32, y_percent: u32) -> Point {
    Point::new(
        percent_of(size.width, x_percent),
        percent_of(size.height, y_percent),
    )
}

/// Swipe path through the screen centre line for `direction`.
///
/// Vertical swipes run along `x = width/2` between 80% and 20% of the height,
/// horizontal ones along `y = height/2` between 80% and 20% of the width.
pub fn swipe_path(size: &ScreenSize, direction: SwipeDirection) -> SwipePath {
    let (start, end) = match direction {
        SwipeDirection::Up => (
            point_at_percent(size, 50, SWIPE_FAR_PERCENT),
            point_at_percent(size, 50, SWIPE_NEAR_PERCENT),
        ),
        SwipeDirection::Down => (
            point_at_percent(size, 50, SWIPE_NEAR_PERCENT),
            point_at_percent(size, 50, SWIPE_FAR_PERCENT),
        ),
        SwipeDirection::Left => (
            point_at_percent(size, SWIPE_FAR_PERCENT, 50),
            point_at_percent(size, SWIPE_NEAR_PERCENT, 50),
        ),
        SwipeDirection::Right => (
            point_at_percent(size, SWIPE_NEAR_PERCENT, 50),
            point_at_percent(size, SWIPE_FAR_PERCENT, 50),
        ),
    };
    SwipePath { start, end }
}
