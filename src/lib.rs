#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod driver;
mod error;
pub mod gpio;
pub mod registers;
pub mod transport;

#[cfg(feature = "async")]
pub use driver::AsyncMcp23s17;
pub use driver::Mcp23s17;
pub use error::{Error, InvalidArgument};
pub use gpio::{Bank, Direction, LogicLevel, PinId, PinSelector, Pullup};
pub use registers::{DeviceAddress, Register};
pub use transport::{BusConfig, ConfigureBus, SharedBusDevice};
