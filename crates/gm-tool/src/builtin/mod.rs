//! Built-in game tools

pub mod character;
pub mod clock;
pub mod dice;
pub mod lore;

pub use character::{create_character_tool, get_character_tool, list_characters_tool};
pub use clock::create_time_tool;
pub use dice::{DiceRoll, DiceSpec, create_dice_tool};
pub use lore::create_lore_tool;

use crate::store::CharacterStore;
use gm_core::{ModelClient, Result, Tool};
use std::sync::Arc;

/// The full built-in tool set, in the order it is advertised to the model
pub fn game_master_tools(
    store: Arc<dyn CharacterStore>,
    lore_delegate: Option<Arc<dyn ModelClient>>,
) -> Result<Vec<Arc<dyn Tool>>> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(create_dice_tool()?),
        Arc::new(create_character_tool(store.clone())?),
        Arc::new(get_character_tool(store.clone())?),
        Arc::new(list_characters_tool(store)?),
        Arc::new(create_lore_tool(lore_delegate)?),
        Arc::new(create_time_tool()?),
    ];
    Ok(tools)
}
