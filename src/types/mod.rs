//! Value types for bulb state and commands.

mod brightness;
mod color;
mod hsv;
mod kelvin;
mod mode;
mod power;

pub use brightness::Brightness;
pub use color::Color;
pub use hsv::Hsv;
pub use kelvin::{Kelvin, KelvinRange};
pub use mode::{ColorMode, LightMode};
pub use power::PowerMode;
