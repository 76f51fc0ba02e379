use std::cell::RefCell;

use bit_field::BitField;
use embedded_hal::spi::{Operation, SpiDevice};
use log::{debug, trace};

use crate::error::Error;
use crate::gpio::{Bank, Direction, LogicLevel, PinId, PinSelector, Pins, Pullup, check_pin};
use crate::registers::{DeviceAddress, Register, apply_mask};

#[cfg(feature = "async")]
mod asynch;

#[cfg(feature = "async")]
pub use asynch::AsyncMcp23s17;

/// Driver for the MCP23S17.
///
/// # Quick start
///
/// Create the driver with an [`SpiDevice`] configured for SPI mode 0 at up to
/// 10 MHz (see [`BusConfig`]), by calling [`Mcp23s17::new`] for the default
/// address or [`Mcp23s17::with_address`] if the hardware address pins are used.
///
/// Configure pins with [`Mcp23s17::set_direction`] and [`Mcp23s17::set_pullup`],
/// drive outputs with [`Mcp23s17::set_output`] and read inputs with
/// [`Mcp23s17::read_pin`] or [`Mcp23s17::read_bank`].
///
/// For `embedded-hal` digital pins, put the driver in a [`RefCell`] and call
/// [`Mcp23s17::split`].
///
/// [`BusConfig`]: crate::BusConfig
///
/// # Overview
///
/// Each pin method is a read-modify-write of one register: the register is read,
/// the selected bits are set or cleared, and the result is written back, in two
/// separate SPI transactions. Nothing is cached, so changes made by another
/// driver instance in between are preserved, but two such updates of the same
/// register racing each other can lose one of the changes.
///
/// Arguments are validated before the SPI device is touched, so an
/// [`Error::InvalidArgument`] always means nothing was sent.
#[derive(Debug)]
pub struct Mcp23s17<SPI> {
    spi: SPI,
    address: DeviceAddress,
}

impl<SPI: SpiDevice> Mcp23s17<SPI> {
    ////////////////////////////////////////////////////////////////////////////////
    // Constructors
    ////////////////////////////////////////////////////////////////////////////////

    /// Create a driver for a chip at the default address (`0b0100000`).
    pub fn new(spi: SPI) -> Self {
        Self::with_address(spi, DeviceAddress::DEFAULT)
    }

    /// Create a driver for a chip at the given address.
    ///
    /// The chip ignores the hardware address bits until IOCON.HAEN is set, so
    /// with HAEN clear any address with the fixed `0100` prefix reaches it.
    pub fn with_address(spi: SPI, address: DeviceAddress) -> Self {
        Self { spi, address }
    }

    /// The address used in the SPI control byte.
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Destroy the driver and return the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Split a shared driver into its sixteen pins.
    ///
    /// The pins borrow the driver, which must not be borrowed elsewhere while a
    /// pin method runs.
    pub fn split(driver: &RefCell<Self>) -> Pins<'_, SPI> {
        Pins::new(driver)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Register access
    ////////////////////////////////////////////////////////////////////////////////

    /// Write `data` starting at `register`.
    ///
    /// Sends `[write control byte, register, data...]` in one SPI transaction.
    /// With more than one data byte the chip advances its register pointer
    /// after each byte (unless IOCON.SEQOP is set).
    ///
    /// # Datasheet
    ///
    /// See figure 3-5 for the SPI write sequence.
    pub fn write_register(
        &mut self,
        register: impl Into<u8>,
        data: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        let register = register.into();
        trace!("MCP23S17 write {register:#04x}: {data:02x?}");
        let mut frame = Vec::with_capacity(2 + data.len());
        frame.push(self.address.write_byte());
        frame.push(register);
        frame.extend_from_slice(data);
        self.spi
            .transaction(&mut [Operation::Write(&frame)])
            .map_err(Error::Transport)
    }

    /// Read `buf.len()` bytes starting at `register` into `buf`.
    ///
    /// Sends `[read control byte, register]` and then clocks in the bytes, all
    /// in one SPI transaction.
    ///
    /// # Datasheet
    ///
    /// See figure 3-5 for the SPI read sequence.
    pub fn read_register_into(
        &mut self,
        register: impl Into<u8>,
        buf: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        let register = register.into();
        let header = [self.address.read_byte(), register];
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(&mut *buf)])
            .map_err(Error::Transport)?;
        trace!("MCP23S17 read {register:#04x}: {buf:02x?}");
        Ok(())
    }

    /// Read `count` bytes starting at `register`.
    pub fn read_register(
        &mut self,
        register: impl Into<u8>,
        count: usize,
    ) -> Result<Vec<u8>, Error<SPI::Error>> {
        let mut buf = vec![0u8; count];
        self.read_register_into(register, &mut buf)?;
        Ok(buf)
    }

    fn read_byte(&mut self, register: Register) -> Result<u8, Error<SPI::Error>> {
        let mut buf = [0u8];
        self.read_register_into(register, &mut buf)?;
        Ok(buf[0])
    }

    /// Set or clear the `mask` bits of `register`, keeping the others.
    fn update_register(
        &mut self,
        register: Register,
        mask: u8,
        set: bool,
    ) -> Result<(), Error<SPI::Error>> {
        let current = self.read_byte(register)?;
        let new = apply_mask(current, mask, set);
        debug!("MCP23S17 {register:?}: {current:#010b} -> {new:#010b}");
        self.write_register(register, &[new])
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Pin configuration
    ////////////////////////////////////////////////////////////////////////////////

    /// Set the direction of one or more pins in `bank`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if a pin is out of range or the selection is
    /// empty.
    pub fn set_direction<'p>(
        &mut self,
        bank: Bank,
        pins: impl Into<PinSelector<'p>>,
        direction: Direction,
    ) -> Result<(), Error<SPI::Error>> {
        let mask = pins.into().mask()?;
        self.update_register(Register::direction(bank), mask, direction.into())
    }

    /// Set the output level of one or more pins in `bank`.
    ///
    /// This writes the output latch, so it can be done before the pins are made
    /// outputs to avoid a glitch.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if a pin is out of range or the selection is
    /// empty.
    pub fn set_output<'p>(
        &mut self,
        bank: Bank,
        pins: impl Into<PinSelector<'p>>,
        level: LogicLevel,
    ) -> Result<(), Error<SPI::Error>> {
        let mask = pins.into().mask()?;
        self.update_register(Register::output_latch(bank), mask, level.into())
    }

    /// Enable or disable the internal pull-up of one or more pins in `bank`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if a pin is out of range or the selection is
    /// empty.
    pub fn set_pullup<'p>(
        &mut self,
        bank: Bank,
        pins: impl Into<PinSelector<'p>>,
        pullup: Pullup,
    ) -> Result<(), Error<SPI::Error>> {
        let mask = pins.into().mask()?;
        self.update_register(Register::pullup(bank), mask, pullup.into())
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Reading
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the logic levels of all eight pins of `bank`, pin 0 in bit 0.
    pub fn read_bank(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::input(bank))
    }

    /// Read the logic level of a single pin. `true` is high.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `pin` is greater than 7.
    pub fn read_pin(&mut self, bank: Bank, pin: u8) -> Result<bool, Error<SPI::Error>> {
        let pin = check_pin(pin)?;
        Ok(self.read_bank(bank)?.get_bit(usize::from(pin)))
    }

    /// Read a pin by name, such as `"A7"` or `"b0"`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the name is not a bank letter followed by a
    /// pin number in 0..=7.
    pub fn read_pin_named(&mut self, name: &str) -> Result<bool, Error<SPI::Error>> {
        let pin: PinId = name.parse()?;
        self.read_pin(pin.bank(), pin.pin())
    }

    /// Read the direction register of `bank`. A set bit is an input.
    pub fn read_direction(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::direction(bank))
    }

    /// Read the output latch of `bank`.
    ///
    /// This is the level the driver last set, which differs from
    /// [`Mcp23s17::read_bank`] for input pins and for outputs being held at
    /// another level externally.
    pub fn read_output_latch(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::output_latch(bank))
    }

    /// Read the pull-up register of `bank`. A set bit is an enabled pull-up.
    pub fn read_pullups(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::pullup(bank))
    }
}
