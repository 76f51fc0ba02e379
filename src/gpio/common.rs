use std::str::FromStr;

use crate::InvalidArgument;

/// One of the two 8-pin GPIO banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// Pins GPA0 to GPA7.
    A,
    /// Pins GPB0 to GPB7.
    B,
}

impl Bank {
    /// Parse a bank letter, ignoring case.
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(Self::A),
            'b' => Some(Self::B),
            _ => None,
        }
    }
}

impl FromStr for Bank {
    type Err = InvalidArgument;

    /// Parse `"a"` or `"b"`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(Bank::from_char), chars.next()) {
            (Some(bank), None) => Ok(bank),
            _ => Err(InvalidArgument::UnknownBank(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// GPIO pin level setting.
pub enum LogicLevel {
    /// Pin driven (or read) high.
    High,
    /// Pin driven (or read) low.
    Low,
}

impl LogicLevel {
    /// True if the level is high.
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// True if the level is low.
    pub fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl From<bool> for LogicLevel {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}

impl From<LogicLevel> for bool {
    fn from(value: LogicLevel) -> Self {
        value.is_high()
    }
}

impl FromStr for LogicLevel {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("high") {
            Ok(Self::High)
        } else if s.eq_ignore_ascii_case("low") {
            Ok(Self::Low)
        } else {
            Err(InvalidArgument::UnknownLevel(s.to_owned()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// GPIO pin direction.
///
/// The chip's IODIR registers hold 1 for input and 0 for output.
pub enum Direction {
    /// Pin is an input (IODIR bit set).
    Input,
    /// Pin is an output (IODIR bit clear).
    Output,
}

impl From<bool> for Direction {
    fn from(value: bool) -> Self {
        if value { Self::Input } else { Self::Output }
    }
}

impl From<Direction> for bool {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Input => true,
            Direction::Output => false,
        }
    }
}

impl FromStr for Direction {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("input") {
            Ok(Self::Input)
        } else if s.eq_ignore_ascii_case("output") {
            Ok(Self::Output)
        } else {
            Err(InvalidArgument::UnknownDirection(s.to_owned()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Internal 100 kΩ pull-up resistor setting.
pub enum Pullup {
    /// Pull-up enabled (GPPU bit set).
    Up,
    /// No pull-up (GPPU bit clear).
    None,
}

impl From<bool> for Pullup {
    fn from(value: bool) -> Self {
        if value { Self::Up } else { Self::None }
    }
}

impl From<Pullup> for bool {
    fn from(value: Pullup) -> Self {
        matches!(value, Pullup::Up)
    }
}

impl FromStr for Pullup {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("up") {
            Ok(Self::Up)
        } else if s.eq_ignore_ascii_case("none") {
            Ok(Self::None)
        } else {
            Err(InvalidArgument::UnknownPullup(s.to_owned()))
        }
    }
}
