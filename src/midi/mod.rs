pub mod device;
pub mod event;

pub use device::{MidiDeviceInfo, MidiDeviceManager};
pub use event::MidiEvent;
