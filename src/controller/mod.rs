mod signal;
mod traits;

pub use signal::{ControlsSignal, SignalController};
pub use traits::{RadioController, RadioControls};
