use crate::device::error::DeviceError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Scale factors are fractions of the screen size.
    #[error("scale factor {0} is outside 0.0..=1.0")]
    InvalidScale(f64),

    #[error("device {0} reported an empty screen")]
    EmptyScreen(String),

    #[error("activity intent needs an action, component or data uri")]
    EmptyIntent,
}
