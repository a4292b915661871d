pub mod app;

pub use app::{InstrumentDispatcher, TonepadApp};
