use std::fmt;
use std::str::FromStr;

use bit_field::BitField;

use super::Bank;
use crate::InvalidArgument;

/// Number of pins in each bank.
pub const PINS_PER_BANK: u8 = 8;

/// Check that a pin index is in 0..=7.
pub(crate) fn check_pin(pin: u8) -> Result<u8, InvalidArgument> {
    if pin < PINS_PER_BANK {
        Ok(pin)
    } else {
        Err(InvalidArgument::PinOutOfRange(pin))
    }
}

/// One or more pins within a bank.
///
/// Integer arguments need a `u8` type (`7u8`), since the conversion is
/// implemented only for `u8`. Slices, arrays and vectors of `u8` select
/// several pins at once, which are changed together in a single register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSelector<'a> {
    /// A single pin index.
    Single(u8),
    /// A non-empty collection of pin indices. Duplicates are allowed.
    Multiple(&'a [u8]),
}

impl PinSelector<'_> {
    /// Bit mask over the bank register with a bit set for each selected pin.
    ///
    /// # Errors
    ///
    /// Fails if any pin is outside 0..=7 or if the collection is empty.
    pub fn mask(&self) -> Result<u8, InvalidArgument> {
        match *self {
            Self::Single(pin) => single_pin_mask(pin),
            Self::Multiple(pins) if pins.is_empty() => Err(InvalidArgument::EmptyPinSelection),
            Self::Multiple(pins) => pins
                .iter()
                .try_fold(0u8, |mask, &pin| Ok(mask | single_pin_mask(pin)?)),
        }
    }
}

fn single_pin_mask(pin: u8) -> Result<u8, InvalidArgument> {
    let pin = check_pin(pin)?;
    let mut mask = 0u8;
    mask.set_bit(usize::from(pin), true);
    Ok(mask)
}

impl From<u8> for PinSelector<'_> {
    fn from(value: u8) -> Self {
        Self::Single(value)
    }
}

impl<'a> From<&'a [u8]> for PinSelector<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Multiple(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for PinSelector<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Self::Multiple(value.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for PinSelector<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Self::Multiple(value.as_slice())
    }
}

/// A single pin on the expander, such as GPA7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinId {
    bank: Bank,
    pin: u8,
}

impl PinId {
    /// Identify pin `pin` (0..=7) of `bank`.
    pub fn new(bank: Bank, pin: u8) -> Result<Self, InvalidArgument> {
        Ok(Self {
            bank,
            pin: check_pin(pin)?,
        })
    }

    pub(super) fn new_unchecked(bank: Bank, pin: u8) -> Self {
        debug_assert!(pin < PINS_PER_BANK);
        Self { bank, pin }
    }

    /// The bank the pin belongs to.
    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// The pin's index within its bank.
    pub fn pin(&self) -> u8 {
        self.pin
    }
}

impl FromStr for PinId {
    type Err = InvalidArgument;

    /// Parse a bank letter followed by a pin number: `"A7"`, `"b0"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidArgument::MalformedPinName(s.to_owned());
        let mut chars = s.chars();
        let bank_char = chars.next().ok_or_else(malformed)?;
        let bank = Bank::from_char(bank_char)
            .ok_or_else(|| InvalidArgument::UnknownBank(bank_char.to_string()))?;
        let number = chars.as_str();
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let pin = number
            .parse::<u8>()
            .map_err(|_| InvalidArgument::MalformedPinName(s.to_owned()))?;
        Self::new(bank, pin)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{}", self.bank, self.pin)
    }
}
