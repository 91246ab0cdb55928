use crate::error::PowerError;

/// Drives the module's power key.
///
/// SIM7600 boards expose power through a GPIO line or a relay; the modem
/// only needs to know when to pulse it. Implementations should block until
/// the module has had time to react.
pub trait PowerControl: Send {
    /// Switch the module on.
    fn power_on(&mut self) -> Result<(), PowerError>;

    /// Switch the module off.
    fn power_down(&mut self) -> Result<(), PowerError>;
}

impl<P: PowerControl + ?Sized> PowerControl for Box<P> {
    fn power_on(&mut self) -> Result<(), PowerError> {
        (**self).power_on()
    }

    fn power_down(&mut self) -> Result<(), PowerError> {
        (**self).power_down()
    }
}
