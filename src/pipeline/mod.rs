pub mod orchestrator;
pub mod outputs;
pub mod stage;
pub mod stages;

pub use orchestrator::{Composer, SynthesizedStack};
pub use outputs::StackOutput;
pub use stage::CompositionStage;
