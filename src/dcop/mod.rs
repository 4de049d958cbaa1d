pub mod agent;
pub mod engine;
pub mod mailbox;
pub mod order;
pub mod types;
pub mod variable;

pub use agent::*;
pub use engine::*;
pub use mailbox::*;
pub use order::*;
pub use types::*;
pub use variable::*;
