use std::fmt;

/// Wrapper for problems when communicating with the MCP23S17.
///
/// `E` is the error type of the underlying SPI device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// An argument was rejected before any SPI transaction was started.
    InvalidArgument(InvalidArgument),
    /// The SPI device (bus or chip-select line) reported an error.
    ///
    /// The driver does not retry. The transaction may have been partially
    /// transmitted, so the chip state is unknown for the register involved.
    Transport(E),
}

/// Reasons a caller-supplied argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// The bank symbol was not `A` or `B` (in either case).
    UnknownBank(String),
    /// Pin index outside 0..=7.
    PinOutOfRange(u8),
    /// A multi-pin selection contained no pins.
    EmptyPinSelection,
    /// A pin name was not a bank letter followed by a pin number, such as `A7`.
    MalformedPinName(String),
    /// The direction symbol was not `input` or `output`.
    UnknownDirection(String),
    /// The logic level symbol was not `high` or `low`.
    UnknownLevel(String),
    /// The pull-up symbol was not `up` or `none`.
    UnknownPullup(String),
    /// Device address does not fit in seven bits.
    AddressOutOfRange(u8),
}

impl<E> From<InvalidArgument> for Error<E> {
    fn from(value: InvalidArgument) -> Self {
        Self::InvalidArgument(value)
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBank(bank) => write!(f, "bank must be 'a' or 'b', got {bank:?}"),
            Self::PinOutOfRange(pin) => write!(f, "pin must be 0-7, got {pin}"),
            Self::EmptyPinSelection => f.write_str("pin selection is empty"),
            Self::MalformedPinName(name) => {
                write!(f, "pin name must be a bank and a number (eg 'A7'), got {name:?}")
            }
            Self::UnknownDirection(direction) => {
                write!(f, "direction must be 'input' or 'output', got {direction:?}")
            }
            Self::UnknownLevel(level) => write!(f, "level must be 'high' or 'low', got {level:?}"),
            Self::UnknownPullup(mode) => write!(f, "pull-up must be 'up' or 'none', got {mode:?}"),
            Self::AddressOutOfRange(address) => {
                write!(f, "device address must fit in 7 bits, got {address:#04x}")
            }
        }
    }
}

impl std::error::Error for InvalidArgument {}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            Self::Transport(err) => write!(f, "SPI transport error: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(reason) => Some(reason),
            Self::Transport(_) => None,
        }
    }
}

impl<E: fmt::Debug> embedded_hal::digital::Error for Error<E> {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        // embedded-hal defines no more specific digital error kinds.
        embedded_hal::digital::ErrorKind::Other
    }
}
