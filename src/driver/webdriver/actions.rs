//! W3C pointer actions
//!
//! Gestures are expressed as a single touch pointer performing timed
//! sub-actions, submitted to `{session}/actions`.

use super::session::SessionManager;
use super::transport::HttpTransport;
use crate::driver::geometry::{self, Point};
use crate::driver::traits::{ScreenSize, SwipeDirection};
use crate::error::Result;
use log::debug;
use reqwest::Method;
use serde::Serialize;

/// Hold time for a tap
pub const TAP_PAUSE_MS: u64 = 100;
/// Hold time at the end of a drag before releasing, so the backend registers
/// the distance instead of reading a fling
pub const SWIPE_PAUSE_MS: u64 = 1000;
/// Default long press duration
pub const LONG_PRESS_MS: u64 = 1000;

/// One step of a pointer action sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    PointerMove { duration: u64, x: i32, y: i32 },
    PointerDown { button: u8 },
    Pause { duration: u64 },
    PointerUp { button: u8 },
}

impl PointerAction {
    fn move_to(point: Point) -> Self {
        Self::PointerMove {
            duration: 0,
            x: point.x,
            y: point.y,
        }
    }

    fn down() -> Self {
        Self::PointerDown { button: 0 }
    }

    fn up() -> Self {
        Self::PointerUp { button: 0 }
    }

    fn pause(duration: u64) -> Self {
        Self::Pause { duration }
    }
}

#[derive(Debug, Serialize)]
struct PointerParameters {
    #[serde(rename = "pointerType")]
    pointer_type: &'static str,
}

#[derive(Debug, Serialize)]
struct PointerInput<'a> {
    #[serde(rename = "type")]
    input_type: &'static str,
    id: &'static str,
    parameters: PointerParameters,
    actions: &'a [PointerAction],
}

#[derive(Debug, Serialize)]
struct ActionsPayload<'a> {
    actions: [PointerInput<'a>; 1],
}

/// Build the `{actions: [...]}` request body for a single finger
pub fn actions_payload(actions: &[PointerAction]) -> serde_json::Value {
    let payload = ActionsPayload {
        actions: [PointerInput {
            input_type: "pointer",
            id: "finger1",
            parameters: PointerParameters {
                pointer_type: "touch",
            },
            actions,
        }],
    };
    serde_json::json!(payload)
}

/// move → down → pause(100ms) → up
pub fn tap_sequence(at: Point) -> Vec<PointerAction> {
    vec![
        PointerAction::move_to(at),
        PointerAction::down(),
        PointerAction::pause(TAP_PAUSE_MS),
        PointerAction::up(),
    ]
}

/// move(start) → down → move(end) → pause(1000ms) → up
pub fn drag_sequence(start: Point, end: Point) -> Vec<PointerAction> {
    vec![
        PointerAction::move_to(start),
        PointerAction::down(),
        PointerAction::move_to(end),
        PointerAction::pause(SWIPE_PAUSE_MS),
        PointerAction::up(),
    ]
}

pub fn double_tap_sequence(at: Point) -> Vec<PointerAction> {
    vec![
        PointerAction::move_to(at),
        PointerAction::down(),
        PointerAction::pause(50),
        PointerAction::up(),
        PointerAction::pause(100),
        PointerAction::down(),
        PointerAction::pause(50),
        PointerAction::up(),
    ]
}

pub fn long_press_sequence(at: Point, duration_ms: u64) -> Vec<PointerAction> {
    vec![
        PointerAction::move_to(at),
        PointerAction::down(),
        PointerAction::pause(duration_ms),
        PointerAction::up(),
    ]
}

/// Submit `actions` against an already open session
pub async fn perform(
    transport: &dyn HttpTransport,
    session_url: &str,
    actions: &[PointerAction],
) -> Result<()> {
    let url = format!("{}/actions", session_url);
    let body = actions_payload(actions);
    transport
        .send(Method::POST, &url, Some(&body))
        .await?
        .error_for_status(&Method::POST, &url)?;
    Ok(())
}

/// Submits gestures, each inside its own session
#[derive(Clone)]
pub struct GestureDispatcher {
    sessions: SessionManager,
}

impl GestureDispatcher {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Open a session, perform `actions`, close the session
    pub async fn dispatch(&self, actions: Vec<PointerAction>) -> Result<()> {
        let transport = self.sessions.transport().clone();
        self.sessions
            .with_session(move |session_url| async move {
                perform(transport.as_ref(), &session_url, &actions).await
            })
            .await
    }

    pub async fn tap(&self, x: i32, y: i32) -> Result<()> {
        self.dispatch(tap_sequence(Point::new(x, y))).await
    }

    pub async fn double_tap(&self, x: i32, y: i32) -> Result<()> {
        self.dispatch(double_tap_sequence(Point::new(x, y))).await
    }

    pub async fn long_press(&self, x: i32, y: i32, duration_ms: u64) -> Result<()> {
        self.dispatch(long_press_sequence(Point::new(x, y), duration_ms))
            .await
    }

    pub async fn drag(&self, start: Point, end: Point) -> Result<()> {
        self.dispatch(drag_sequence(start, end)).await
    }

    /// Swipe through the screen centre; `size` must be freshly queried
    pub async fn swipe(&self, size: &ScreenSize, direction: SwipeDirection) -> Result<()> {
        let path = geometry::swipe_path(size, direction);
        debug!(
            "Swipe {} from ({}, {}) to ({}, {})",
            direction, path.start.x, path.start.y, path.end.x, path.end.y
        );
        self.drag(path.start, path.end).await
    }
}
