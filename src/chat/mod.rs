mod event;
mod log;
mod orchestrator;
mod registry;

#[cfg(test)]
mod tests;

pub use event::ChatEvent;
pub use log::MessageLog;
pub use orchestrator::ChatOrchestrator;
pub use registry::SessionRegistry;
