//! SPI device for a bus shared with other peripherals.
//!
//! [`Mcp23s17`] works with any [`SpiDevice`]. [`SharedBusDevice`] is provided
//! for a [`SpiBus`] behind a [`std::sync::Mutex`] whose clock settings other
//! users of the bus may change: it re-applies the MCP23S17's [`BusConfig`]
//! inside the lock before selecting the chip.
//!
//! [`Mcp23s17`]: crate::Mcp23s17

use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{ErrorType, MODE_0, Mode, Operation, SpiBus, SpiDevice};
use embedded_hal_bus::spi::{DeviceError, NoDelay};
use log::trace;

/// Clock settings for the SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// SCK frequency in hertz.
    pub frequency_hz: u32,
    /// Clock polarity and phase.
    pub mode: Mode,
}

impl BusConfig {
    /// 5 MHz, SPI mode 0 (CPOL = 0, CPHA = 0).
    ///
    /// The MCP23S17 supports modes 0 and 3 at up to 10 MHz.
    pub const DEFAULT: Self = Self {
        frequency_hz: 5_000_000,
        mode: MODE_0,
    };
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An SPI bus whose clock settings can be changed at run time.
///
/// Implement this for the host HAL's SPI bus type to use it with
/// [`SharedBusDevice`].
pub trait ConfigureBus: ErrorType {
    /// Apply `config` to the bus. Called with the bus locked and idle.
    fn configure(&mut self, config: &BusConfig) -> Result<(), Self::Error>;
}

/// [`SpiDevice`] over a mutex-shared [`SpiBus`] and a chip-select pin.
///
/// Each transaction blocks until the bus mutex is acquired and holds it until
/// chip-select is released again, so other devices on the bus never see a
/// partial MCP23S17 transaction. There is no timeout on acquiring the lock.
///
/// A poisoned mutex is still used, since the bus is reconfigured at the start
/// of every transaction.
pub struct SharedBusDevice<'a, BUS, CS, D = NoDelay> {
    bus: &'a Mutex<BUS>,
    cs: CS,
    delay: D,
    config: BusConfig,
}

impl<'a, BUS, CS> SharedBusDevice<'a, BUS, CS, NoDelay>
where
    BUS: SpiBus + ConfigureBus,
    CS: OutputPin,
{
    /// Create a device with the default [`BusConfig`] that does not support
    /// [`Operation::DelayNs`].
    ///
    /// # Panics
    ///
    /// Transactions containing a delay operation will panic. The MCP23S17
    /// driver never issues one.
    pub fn new_no_delay(
        bus: &'a Mutex<BUS>,
        cs: CS,
    ) -> Result<Self, DeviceError<BUS::Error, CS::Error>> {
        Self::new(bus, cs, NoDelay)
    }
}

impl<'a, BUS, CS, D> SharedBusDevice<'a, BUS, CS, D>
where
    BUS: SpiBus + ConfigureBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a device with the default [`BusConfig`].
    ///
    /// Drives chip-select high (with one low pulse, so the chip sees a clean
    /// rising edge), then locks the bus once to apply the configuration.
    pub fn new(
        bus: &'a Mutex<BUS>,
        cs: CS,
        delay: D,
    ) -> Result<Self, DeviceError<BUS::Error, CS::Error>> {
        Self::with_config(bus, cs, delay, BusConfig::DEFAULT)
    }

    /// Create a device with the given clock settings.
    pub fn with_config(
        bus: &'a Mutex<BUS>,
        mut cs: CS,
        delay: D,
        config: BusConfig,
    ) -> Result<Self, DeviceError<BUS::Error, CS::Error>> {
        cs.set_high().map_err(DeviceError::Cs)?;
        cs.set_low().map_err(DeviceError::Cs)?;
        cs.set_high().map_err(DeviceError::Cs)?;
        lock(bus).configure(&config).map_err(DeviceError::Spi)?;
        trace!("shared SPI device ready: {config:?}");
        Ok(Self {
            bus,
            cs,
            delay,
            config,
        })
    }

    /// The clock settings applied before each transaction.
    pub fn config(&self) -> BusConfig {
        self.config
    }

    /// Return the chip-select pin and delay, leaving the bus to its other users.
    pub fn release(self) -> (CS, D) {
        (self.cs, self.delay)
    }
}

fn lock<BUS>(bus: &Mutex<BUS>) -> MutexGuard<'_, BUS> {
    bus.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<BUS, CS, D> ErrorType for SharedBusDevice<'_, BUS, CS, D>
where
    BUS: ErrorType,
    CS: OutputPin,
{
    type Error = DeviceError<BUS::Error, CS::Error>;
}

impl<BUS, CS, D> SpiDevice for SharedBusDevice<'_, BUS, CS, D>
where
    BUS: SpiBus + ConfigureBus,
    CS: OutputPin,
    D: DelayNs,
{
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut bus = lock(self.bus);
        bus.configure(&self.config).map_err(DeviceError::Spi)?;

        self.cs.set_low().map_err(DeviceError::Cs)?;
        let op_result = operations.iter_mut().try_for_each(|op| match op {
            Operation::Read(buf) => bus.read(buf),
            Operation::Write(buf) => bus.write(buf),
            Operation::Transfer(read, write) => bus.transfer(read, write),
            Operation::TransferInPlace(buf) => bus.transfer_in_place(buf),
            Operation::DelayNs(ns) => {
                bus.flush()?;
                self.delay.delay_ns(*ns);
                Ok(())
            }
        });
        // Chip-select is released even if the bus failed part way.
        let flush_result = bus.flush();
        let cs_result = self.cs.set_high();

        op_result.map_err(DeviceError::Spi)?;
        flush_result.map_err(DeviceError::Spi)?;
        cs_result.map_err(DeviceError::Cs)?;
        Ok(())
    }
}
