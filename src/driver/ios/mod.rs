//! iOS backend using WebDriverAgent
//!
//! Works for simulators and real devices alike, as long as WDA is reachable
//! over HTTP (directly or through a port forward).

pub mod source;
pub mod wda;

pub use source::SourceTreeElement;
pub use wda::{WdaClient, DEFAULT_WDA_PORT};
