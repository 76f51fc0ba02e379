//! The async driver against the mock SPI device's async implementation.
#![cfg(feature = "async")]

use embassy_futures::block_on;
use embedded_hal::spi::ErrorType;
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use mcp23s17_hal::{AsyncMcp23s17, Bank, Direction, Error, InvalidArgument, LogicLevel, Pullup};

type TestResult = Result<(), Error<<SpiMock<u8> as ErrorType>::Error>>;

fn read(register: u8, value: u8) -> [SpiTransaction<u8>; 4] {
    [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(vec![0x41, register]),
        SpiTransaction::read(value),
        SpiTransaction::transaction_end(),
    ]
}

fn write(register: u8, value: u8) -> [SpiTransaction<u8>; 3] {
    [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(vec![0x40, register, value]),
        SpiTransaction::transaction_end(),
    ]
}

/// Blink-and-button setup: bank B outputs, A7 pulled-up input.
#[test]
fn configure_and_drive_pins() -> TestResult {
    let expectations = [
        read(0x01, 0xFF).to_vec(),
        write(0x01, 0x00).to_vec(),
        read(0x0C, 0x00).to_vec(),
        write(0x0C, 0x80).to_vec(),
        read(0x00, 0xFF).to_vec(),
        write(0x00, 0xFF).to_vec(),
        read(0x15, 0x00).to_vec(),
        write(0x15, 0xAA).to_vec(),
        read(0x12, 0x80).to_vec(),
    ]
    .concat();
    let mut driver = AsyncMcp23s17::new(SpiMock::new(&expectations));

    block_on(async {
        driver
            .set_direction(Bank::B, &[0u8, 1, 2, 3, 4, 5, 6, 7], Direction::Output)
            .await?;
        driver.set_pullup(Bank::A, 7u8, Pullup::Up).await?;
        driver.set_direction(Bank::A, 7u8, Direction::Input).await?;
        driver
            .set_output(Bank::B, &[1u8, 3, 5, 7], LogicLevel::High)
            .await?;
        assert!(driver.read_pin_named("A7").await?);
        Ok::<_, Error<_>>(())
    })?;

    driver.release().done();
    Ok(())
}

/// Invalid arguments are rejected without any SPI traffic.
#[test]
fn invalid_arguments_send_nothing() {
    let mut driver = AsyncMcp23s17::new(SpiMock::<u8>::new(&[]));
    assert_eq!(
        block_on(driver.read_pin_named("c1")),
        Err(Error::InvalidArgument(InvalidArgument::UnknownBank("c".into())))
    );
    assert_eq!(
        block_on(driver.set_output(Bank::A, 9u8, LogicLevel::Low)),
        Err(Error::InvalidArgument(InvalidArgument::PinOutOfRange(9)))
    );
    driver.release().done();
}
