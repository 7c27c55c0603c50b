pub mod poll;
pub mod probe;

pub use poll::PollArgs;
pub use probe::ProbeArgs;
