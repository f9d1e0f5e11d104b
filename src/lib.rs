pub mod driver;
pub mod error;
pub mod utils;

// Re-export common items
pub use driver::connect;
pub use driver::elements::ScreenElement;
pub use driver::traits::{
    InstalledApp, Orientation, RemoteControl, ScreenSize, Swipe, SwipeDirection,
};
pub use error::{ErrorKind, RemoteError, Result};
pub use utils::config::{BackendKind, Config};
