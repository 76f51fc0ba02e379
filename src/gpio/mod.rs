//! Pin and bank selection, and `embedded-hal` digital pins on the expander.

mod common;
mod pins;
mod selector;

pub(crate) use selector::check_pin;

pub use common::{Bank, Direction, LogicLevel, Pullup};
pub use pins::{ExpanderPin, Input, Output, Pins};
pub use selector::{PINS_PER_BANK, PinId, PinSelector};
