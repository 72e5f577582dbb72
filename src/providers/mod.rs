mod simulated;

pub use simulated::SimulatedProvider;
