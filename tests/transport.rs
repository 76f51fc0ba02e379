//! Chip-select framing and bus configuration of the shared-bus SPI device.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Mutex;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, ErrorKind, MODE_3, SpiBus};
use embedded_hal_bus::spi::{DeviceError, NoDelay};
use mcp23s17_hal::{Bank, BusConfig, ConfigureBus, Error, LogicLevel, Mcp23s17, SharedBusDevice};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Configure(BusConfig),
    CsHigh,
    CsLow,
    Write(Vec<u8>),
    Read(usize),
    Flush,
}

type Log = Rc<RefCell<Vec<Event>>>;

/// SPI bus that records calls and answers reads from a queue (zero when empty).
struct FakeBus {
    log: Log,
    replies: VecDeque<u8>,
    fail_writes: bool,
}

impl FakeBus {
    fn new(log: &Log, replies: &[u8]) -> Self {
        Self {
            log: Rc::clone(log),
            replies: replies.iter().copied().collect(),
            fail_writes: false,
        }
    }
}

impl spi::ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl SpiBus for FakeBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Read(words.len()));
        for word in words {
            *word = self.replies.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Write(words.to_vec()));
        if self.fail_writes {
            Err(ErrorKind::Other)
        } else {
            Ok(())
        }
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.write(words)?;
        self.read(words)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Flush);
        Ok(())
    }
}

impl ConfigureBus for FakeBus {
    fn configure(&mut self, config: &BusConfig) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Configure(*config));
        Ok(())
    }
}

/// Chip-select pin that records level changes.
struct FakeCs(Log);

impl digital::ErrorType for FakeCs {
    type Error = Infallible;
}

impl OutputPin for FakeCs {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::CsLow);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(Event::CsHigh);
        Ok(())
    }
}

type DeviceResult = Result<(), Error<DeviceError<ErrorKind, Infallible>>>;

fn take(log: &Log) -> Vec<Event> {
    std::mem::take(&mut *log.borrow_mut())
}

/// Construction pulses chip-select and configures the bus for 5 MHz mode 0.
#[test]
fn construction_deselects_and_configures() -> Result<(), DeviceError<ErrorKind, Infallible>> {
    let log = Log::default();
    let bus = Mutex::new(FakeBus::new(&log, &[]));
    let device = SharedBusDevice::new_no_delay(&bus, FakeCs(Rc::clone(&log)))?;
    assert_eq!(device.config(), BusConfig::DEFAULT);
    assert_eq!(BusConfig::DEFAULT.frequency_hz, 5_000_000);
    assert_eq!(
        take(&log),
        [
            Event::CsHigh,
            Event::CsLow,
            Event::CsHigh,
            Event::Configure(BusConfig::DEFAULT),
        ]
    );
    Ok(())
}

/// A read is configure, select, 2-byte write, N-byte read, deselect.
#[test]
fn read_transaction_order() -> DeviceResult {
    let log = Log::default();
    let bus = Mutex::new(FakeBus::new(&log, &[0x11, 0x22, 0x33]));
    let device = SharedBusDevice::new_no_delay(&bus, FakeCs(Rc::clone(&log)))
        .map_err(Error::Transport)?;
    take(&log);

    let mut driver = Mcp23s17::new(device);
    assert_eq!(driver.read_register(0x12u8, 3)?, vec![0x11, 0x22, 0x33]);
    assert_eq!(
        take(&log),
        [
            Event::Configure(BusConfig::DEFAULT),
            Event::CsLow,
            Event::Write(vec![0x41, 0x12]),
            Event::Read(3),
            Event::Flush,
            Event::CsHigh,
        ]
    );
    Ok(())
}

/// A pin update is two complete transactions, each reconfiguring the bus.
#[test]
fn read_modify_write_is_two_transactions() -> DeviceResult {
    let log = Log::default();
    let bus = Mutex::new(FakeBus::new(&log, &[0b0010_0001]));
    let device = SharedBusDevice::new_no_delay(&bus, FakeCs(Rc::clone(&log)))
        .map_err(Error::Transport)?;
    take(&log);

    let mut driver = Mcp23s17::new(device);
    driver.set_output(Bank::B, 3u8, LogicLevel::High)?;
    assert_eq!(
        take(&log),
        [
            Event::Configure(BusConfig::DEFAULT),
            Event::CsLow,
            Event::Write(vec![0x41, 0x15]),
            Event::Read(1),
            Event::Flush,
            Event::CsHigh,
            Event::Configure(BusConfig::DEFAULT),
            Event::CsLow,
            Event::Write(vec![0x40, 0x15, 0b0010_1001]),
            Event::Flush,
            Event::CsHigh,
        ]
    );
    Ok(())
}

/// A custom configuration is re-applied before every transaction.
#[test]
fn custom_config_is_reapplied() -> DeviceResult {
    let config = BusConfig {
        frequency_hz: 10_000_000,
        mode: MODE_3,
    };
    let log = Log::default();
    let bus = Mutex::new(FakeBus::new(&log, &[]));
    let device = SharedBusDevice::with_config(&bus, FakeCs(Rc::clone(&log)), NoDelay, config)
        .map_err(Error::Transport)?;
    let mut driver = Mcp23s17::new(device);
    driver.write_register(0x14u8, &[0xAA])?;
    let configs = take(&log)
        .into_iter()
        .filter(|event| matches!(event, Event::Configure(_)))
        .collect::<Vec<_>>();
    assert_eq!(configs, [Event::Configure(config), Event::Configure(config)]);
    Ok(())
}

/// Chip-select is released even when the bus fails mid-transaction.
#[test]
fn bus_error_still_deselects() {
    let log = Log::default();
    let mut fake_bus = FakeBus::new(&log, &[]);
    fake_bus.fail_writes = true;
    let bus = Mutex::new(fake_bus);
    let device = SharedBusDevice::new_no_delay(&bus, FakeCs(Rc::clone(&log)))
        .expect("construction does not write");
    take(&log);

    let mut driver = Mcp23s17::new(device);
    assert_eq!(
        driver.read_bank(Bank::A),
        Err(Error::Transport(DeviceError::Spi(ErrorKind::Other)))
    );
    assert_eq!(
        take(&log),
        [
            Event::Configure(BusConfig::DEFAULT),
            Event::CsLow,
            Event::Write(vec![0x41, 0x12]),
            Event::Flush,
            Event::CsHigh,
        ]
    );
}

/// The bus is free for other users between transactions.
#[test]
fn bus_is_unlocked_between_transactions() -> DeviceResult {
    let log = Log::default();
    let bus = Mutex::new(FakeBus::new(&log, &[]));
    let device = SharedBusDevice::new_no_delay(&bus, FakeCs(Rc::clone(&log)))
        .map_err(Error::Transport)?;
    let mut driver = Mcp23s17::new(device);
    driver.read_bank(Bank::A)?;
    assert!(bus.try_lock().is_ok());
    driver.set_direction(Bank::A, 0u8, mcp23s17_hal::Direction::Output)?;
    assert!(bus.try_lock().is_ok());
    Ok(())
}
