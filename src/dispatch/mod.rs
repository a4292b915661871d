// Pipeline d'activation : dispatcher, file de timers et journal

pub mod dispatcher;
pub mod scheduler;
pub mod sink;

pub use dispatcher::{DispatchSettings, Dispatcher, KeyState};
pub use scheduler::{ScheduledTask, Scheduler, Transition};
pub use sink::{LogSink, NoteLog};
