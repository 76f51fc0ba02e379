use std::cell::RefCell;

use bit_field::BitField;
use embedded_hal::spi::SpiDevice;

use super::{Bank, Direction, LogicLevel, PinId, Pullup};
use crate::{Error, Mcp23s17};

/// An expander pin that can be configured for digital input or output.
///
/// Pins share the driver through a [`RefCell`], so they can only be used from
/// the thread that owns the driver. Each method call borrows the driver for the
/// duration of one pin operation.
#[derive(Debug)]
pub struct ExpanderPin<'a, SPI> {
    driver: &'a RefCell<Mcp23s17<SPI>>,
    id: PinId,
}

impl<'a, SPI: SpiDevice> ExpanderPin<'a, SPI> {
    /// Which pin this is.
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Set up the pin as a digital input without pull-up.
    ///
    /// You can retrieve the pin (for reconfiguration as an output) by calling
    /// [`Input::destroy`].
    pub fn configure_as_digital_input(self) -> Result<Input<'a, SPI>, Error<SPI::Error>> {
        self.set_pullup(Pullup::None)?;
        self.set_direction(Direction::Input)?;
        Ok(Input(self))
    }

    /// Set up the pin as a digital input with the internal pull-up enabled.
    pub fn configure_as_pulled_up_input(self) -> Result<Input<'a, SPI>, Error<SPI::Error>> {
        self.set_pullup(Pullup::Up)?;
        self.set_direction(Direction::Input)?;
        Ok(Input(self))
    }

    /// Set up the pin as a digital output.
    ///
    /// The pin drives whatever level is already in the output latch.
    pub fn configure_as_digital_output(self) -> Result<Output<'a, SPI>, Error<SPI::Error>> {
        self.set_direction(Direction::Output)?;
        Ok(Output(self))
    }

    fn set_direction(&self, direction: Direction) -> Result<(), Error<SPI::Error>> {
        self.driver
            .borrow_mut()
            .set_direction(self.id.bank(), self.id.pin(), direction)
    }

    fn set_pullup(&self, pullup: Pullup) -> Result<(), Error<SPI::Error>> {
        self.driver
            .borrow_mut()
            .set_pullup(self.id.bank(), self.id.pin(), pullup)
    }
}

impl<'a, SPI: SpiDevice> TryFrom<ExpanderPin<'a, SPI>> for Input<'a, SPI> {
    type Error = Error<SPI::Error>;
    fn try_from(pin: ExpanderPin<'a, SPI>) -> Result<Self, Self::Error> {
        pin.configure_as_digital_input()
    }
}

impl<'a, SPI: SpiDevice> TryFrom<ExpanderPin<'a, SPI>> for Output<'a, SPI> {
    type Error = Error<SPI::Error>;
    fn try_from(pin: ExpanderPin<'a, SPI>) -> Result<Self, Self::Error> {
        pin.configure_as_digital_output()
    }
}

/// An expander pin in digital input mode.
#[derive(Debug)]
pub struct Input<'a, SPI>(ExpanderPin<'a, SPI>);

impl<'a, SPI: SpiDevice> Input<'a, SPI> {
    /// Get the input level of this pin.
    pub fn get_level(&self) -> Result<LogicLevel, Error<SPI::Error>> {
        let pin = self.0.id;
        self.0
            .driver
            .borrow_mut()
            .read_pin(pin.bank(), pin.pin())
            .map(LogicLevel::from)
    }

    /// Return the underlying pin, so that it can be reconfigured.
    ///
    /// This method does not change any MCP23S17 registers.
    pub fn destroy(self) -> ExpanderPin<'a, SPI> {
        self.0
    }

    /// Switch the pin from input to output.
    pub fn try_into_output(self) -> Result<Output<'a, SPI>, Error<SPI::Error>> {
        self.0.configure_as_digital_output()
    }
}

impl<SPI: SpiDevice> embedded_hal::digital::ErrorType for Input<'_, SPI> {
    type Error = Error<SPI::Error>;
}

impl<SPI: SpiDevice> embedded_hal::digital::InputPin for Input<'_, SPI> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.get_level().map(LogicLevel::is_high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.get_level().map(LogicLevel::is_low)
    }
}

/// An expander pin in digital output mode.
#[derive(Debug)]
pub struct Output<'a, SPI>(ExpanderPin<'a, SPI>);

impl<'a, SPI: SpiDevice> Output<'a, SPI> {
    /// Set the output level of this pin.
    pub fn set_level(&self, level: LogicLevel) -> Result<(), Error<SPI::Error>> {
        let pin = self.0.id;
        self.0
            .driver
            .borrow_mut()
            .set_output(pin.bank(), pin.pin(), level)
    }

    /// Get the level currently held in the output latch for this pin.
    pub fn get_output_level(&self) -> Result<LogicLevel, Error<SPI::Error>> {
        let pin = self.0.id;
        let latch = self.0.driver.borrow_mut().read_output_latch(pin.bank())?;
        Ok(latch.get_bit(usize::from(pin.pin())).into())
    }

    /// Return the underlying pin, so that it can be reconfigured.
    pub fn destroy(self) -> ExpanderPin<'a, SPI> {
        self.0
    }

    /// Switch the pin from output to input. The pull-up setting is unchanged.
    pub fn try_into_input(self) -> Result<Input<'a, SPI>, Error<SPI::Error>> {
        self.0.set_direction(Direction::Input)?;
        Ok(Input(self.0))
    }
}

impl<SPI: SpiDevice> embedded_hal::digital::ErrorType for Output<'_, SPI> {
    type Error = Error<SPI::Error>;
}

impl<SPI: SpiDevice> embedded_hal::digital::OutputPin for Output<'_, SPI> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::High)
    }
}

impl<SPI: SpiDevice> embedded_hal::digital::StatefulOutputPin for Output<'_, SPI> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.get_output_level().map(LogicLevel::is_high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.get_output_level().map(LogicLevel::is_low)
    }
}

/// The sixteen expander pins, indexed by pin number within each bank.
#[derive(Debug)]
pub struct Pins<'a, SPI> {
    /// Pins GPA0 to GPA7.
    pub bank_a: [ExpanderPin<'a, SPI>; 8],
    /// Pins GPB0 to GPB7.
    pub bank_b: [ExpanderPin<'a, SPI>; 8],
}

impl<'a, SPI> Pins<'a, SPI> {
    pub(crate) fn new(driver: &'a RefCell<Mcp23s17<SPI>>) -> Self {
        let bank_pins = |bank| {
            std::array::from_fn(|pin| ExpanderPin {
                driver,
                id: PinId::new_unchecked(bank, pin as u8),
            })
        };
        Self {
            bank_a: bank_pins(Bank::A),
            bank_b: bank_pins(Bank::B),
        }
    }
}
