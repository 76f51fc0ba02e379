//! The driver over `embedded-hal-async` SPI devices.

use bit_field::BitField;
use embedded_hal_async::spi::{Operation, SpiDevice};
use log::{debug, trace};

use crate::error::Error;
use crate::gpio::{Bank, Direction, LogicLevel, PinId, PinSelector, Pullup, check_pin};
use crate::registers::{DeviceAddress, Register, apply_mask};

/// Async driver for the MCP23S17.
///
/// This has the same methods and behaviour as [`Mcp23s17`], as `async fn`s.
/// Dropping a returned future part way through a read-modify-write can leave
/// the register unchanged, but never half-written: each SPI transaction is
/// completed or not started by the [`SpiDevice`] implementation.
///
/// [`Mcp23s17`]: crate::Mcp23s17
#[derive(Debug)]
pub struct AsyncMcp23s17<SPI> {
    spi: SPI,
    address: DeviceAddress,
}

impl<SPI: SpiDevice> AsyncMcp23s17<SPI> {
    /// Create a driver for a chip at the default address (`0b0100000`).
    pub fn new(spi: SPI) -> Self {
        Self::with_address(spi, DeviceAddress::DEFAULT)
    }

    /// Create a driver for a chip at the given address.
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

    /// Write `data` starting at `register`.
    pub async fn write_register(
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
            .await
            .map_err(Error::Transport)
    }

    /// Read `buf.len()` bytes starting at `register` into `buf`.
    pub async fn read_register_into(
        &mut self,
        register: impl Into<u8>,
        buf: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        let register = register.into();
        let header = [self.address.read_byte(), register];
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(&mut *buf)])
            .await
            .map_err(Error::Transport)?;
        trace!("MCP23S17 read {register:#04x}: {buf:02x?}");
        Ok(())
    }

    /// Read `count` bytes starting at `register`.
    pub async fn read_register(
        &mut self,
        register: impl Into<u8>,
        count: usize,
    ) -> Result<Vec<u8>, Error<SPI::Error>> {
        let mut buf = vec![0u8; count];
        self.read_register_into(register, &mut buf).await?;
        Ok(buf)
    }

    async fn read_byte(&mut self, register: Register) -> Result<u8, Error<SPI::Error>> {
        let mut buf = [0u8];
        self.read_register_into(register, &mut buf).await?;
        Ok(buf[0])
    }

    async fn update_register(
        &mut self,
        register: Register,
        mask: u8,
        set: bool,
    ) -> Result<(), Error<SPI::Error>> {
        let current = self.read_byte(register).await?;
        let new = apply_mask(current, mask, set);
        debug!("MCP23S17 {register:?}: {current:#010b} -> {new:#010b}");
        self.write_register(register, &[new]).await
    }

    /// Set the direction of one or more pins in `bank`.
    pub async fn set_direction<'p>(
        &mut self,
        bank: Bank,
        pins: impl Into<PinSelector<'p>>,
        direction: Direction,
    ) -> Result<(), Error<SPI::Error>> {
        let mask = pins.into().mask()?;
        self.update_register(Register::direction(bank), mask, direction.into())
            .await
    }

    /// Set the output level of one or more pins in `bank`.
    pub async fn set_output<'p>(
        &mut self,
        bank: Bank,
        pins: impl Into<PinSelector<'p>>,
        level: LogicLevel,
    ) -> Result<(), Error<SPI::Error>> {
        let mask = pins.into().mask()?;
        self.update_register(Register::output_latch(bank), mask, level.into())
            .await
    }

    /// Enable or disable the internal pull-up of one or more pins in `bank`.
    pub async fn set_pullup<'p>(
        &mut self,
        bank: Bank,
        pins: impl Into<PinSelector<'p>>,
        pullup: Pullup,
    ) -> Result<(), Error<SPI::Error>> {
        let mask = pins.into().mask()?;
        self.update_register(Register::pullup(bank), mask, pullup.into())
            .await
    }

    /// Read the logic levels of all eight pins of `bank`, pin 0 in bit 0.
    pub async fn read_bank(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::input(bank)).await
    }

    /// Read the logic level of a single pin. `true` is high.
    pub async fn read_pin(&mut self, bank: Bank, pin: u8) -> Result<bool, Error<SPI::Error>> {
        let pin = check_pin(pin)?;
        Ok(self.read_bank(bank).await?.get_bit(usize::from(pin)))
    }

    /// Read a pin by name, such as `"A7"` or `"b0"`.
    pub async fn read_pin_named(&mut self, name: &str) -> Result<bool, Error<SPI::Error>> {
        let pin: PinId = name.parse()?;
        self.read_pin(pin.bank(), pin.pin()).await
    }

    /// Read the direction register of `bank`. A set bit is an input.
    pub async fn read_direction(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::direction(bank)).await
    }

    /// Read the output latch of `bank`.
    pub async fn read_output_latch(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::output_latch(bank)).await
    }

    /// Read the pull-up register of `bank`. A set bit is an enabled pull-up.
    pub async fn read_pullups(&mut self, bank: Bank) -> Result<u8, Error<SPI::Error>> {
        self.read_byte(Register::pullup(bank)).await
    }
}
