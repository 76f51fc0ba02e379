//! MCP23S17 register map and SPI control bytes.
//!
//! Offsets are for the power-on register layout (IOCON.BANK = 0), where the A
//! and B registers of each function are adjacent.
//!
//! ## Datasheet
//!
//! See table 3-3 for the register addresses and section 3.3.2 for the SPI
//! control byte.

use crate::{Bank, InvalidArgument};

/// A register this driver reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// I/O direction, bank A. 1 = input, 0 = output.
    IodirA = 0x00,
    /// I/O direction, bank B.
    IodirB = 0x01,
    /// Pull-up enable, bank A.
    GppuA = 0x0C,
    /// Pull-up enable, bank B.
    GppuB = 0x0D,
    /// Port value, bank A. Reads the logic level on the pins.
    GpioA = 0x12,
    /// Port value, bank B.
    GpioB = 0x13,
    /// Output latch, bank A.
    OlatA = 0x14,
    /// Output latch, bank B.
    OlatB = 0x15,
}

impl Register {
    /// Direction register for the bank.
    pub fn direction(bank: Bank) -> Self {
        match bank {
            Bank::A => Self::IodirA,
            Bank::B => Self::IodirB,
        }
    }

    /// Pull-up register for the bank.
    pub fn pullup(bank: Bank) -> Self {
        match bank {
            Bank::A => Self::GppuA,
            Bank::B => Self::GppuB,
        }
    }

    /// Input (port) register for the bank.
    pub fn input(bank: Bank) -> Self {
        match bank {
            Bank::A => Self::GpioA,
            Bank::B => Self::GpioB,
        }
    }

    /// Output latch register for the bank.
    pub fn output_latch(bank: Bank) -> Self {
        match bank {
            Bank::A => Self::OlatA,
            Bank::B => Self::OlatB,
        }
    }
}

impl From<Register> for u8 {
    fn from(value: Register) -> Self {
        value as u8
    }
}

/// Seven-bit device address, sent shifted left by one in the SPI control byte.
///
/// The upper four bits are fixed at `0100` by the chip. The lower three match
/// the A2, A1 and A0 hardware address pins, and are only compared by the chip
/// when IOCON.HAEN is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// `0b0100000`: all hardware address pins low.
    pub const DEFAULT: Self = Self(0b010_0000);

    /// Use a raw seven-bit address.
    ///
    /// # Errors
    ///
    /// Fails if `address` is larger than `0x7F`.
    pub fn new(address: u8) -> Result<Self, InvalidArgument> {
        if address <= 0x7F {
            Ok(Self(address))
        } else {
            Err(InvalidArgument::AddressOutOfRange(address))
        }
    }

    /// Address selected by the levels on the A2, A1 and A0 pins.
    pub fn from_hardware_pins(a2: bool, a1: bool, a0: bool) -> Self {
        Self(Self::DEFAULT.0 | u8::from(a2) << 2 | u8::from(a1) << 1 | u8::from(a0))
    }

    /// The seven-bit address.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Control byte that starts a write transaction (R/W bit clear).
    pub fn write_byte(self) -> u8 {
        self.0 << 1
    }

    /// Control byte that starts a read transaction (R/W bit set).
    pub fn read_byte(self) -> u8 {
        self.write_byte() | 1
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Set (`true`) or clear (`false`) the `mask` bits of `current`.
pub(crate) fn apply_mask(current: u8, mask: u8, set: bool) -> u8 {
    if set { current | mask } else { current & !mask }
}
