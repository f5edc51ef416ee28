//! The Game Master tool-call orchestration loop
//!
//! One turn: prompt the model with the registered tools, run any tools it
//! asks for, feed the results into a second call, and return the answer.

pub mod builder;
pub mod game_master;
pub mod prompt;
pub mod testing;

pub use builder::GameMasterBuilder;
pub use game_master::{GameMaster, Turn};
pub use prompt::{follow_up_prompt, synthesize_summary};
