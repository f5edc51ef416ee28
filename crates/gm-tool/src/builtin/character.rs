use super::dice::DiceSpec;
use crate::function_tool::required_str;
use crate::store::{AbilityScores, Character, CharacterStore};
use crate::{FunctionTool, ToolSchema};
use chrono::Utc;
use gm_core::{Error, Result, ToolResponse};
use rand::Rng;
use serde_json::{Value, json};
use std::sync::Arc;

pub const CREATE_CHARACTER_TOOL_NAME: &str = "createCharacter";
pub const GET_CHARACTER_TOOL_NAME: &str = "getCharacter";
pub const LIST_CHARACTERS_TOOL_NAME: &str = "listCharacters";

const MAX_LEVEL: u32 = 20;

/// Hit die for a character class; unknown classes use a d8
pub fn hit_die(class: &str) -> u32 {
    match class.trim().to_lowercase().as_str() {
        "barbarian" => 12,
        "fighter" | "paladin" | "ranger" => 10,
        "sorcerer" | "wizard" => 6,
        _ => 8,
    }
}

/// Rolls 4d6 and keeps the highest three
fn roll_ability<R: Rng>(rng: &mut R) -> u8 {
    let four_d6 = DiceSpec {
        count: 4,
        sides: 6,
        modifier: 0,
    };
    let mut rolls = four_d6.roll_with(rng).results;
    rolls.sort_unstable();
    rolls.iter().skip(1).sum::<u32>() as u8
}

/// Rolls a fresh character sheet.
///
/// Hit points are the class hit die maximum at level one plus the average
/// die (rounded up) for every further level, each adjusted by the
/// constitution modifier and never below one per level.
pub fn roll_character<R: Rng>(
    rng: &mut R,
    name: &str,
    class: &str,
    race: &str,
    level: u32,
) -> Result<Character> {
    if !(1..=MAX_LEVEL).contains(&level) {
        return Err(Error::InvalidInput(format!(
            "Level must be between 1 and {}, got {}",
            MAX_LEVEL, level
        )));
    }

    let abilities = AbilityScores {
        strength: roll_ability(rng),
        dexterity: roll_ability(rng),
        constitution: roll_ability(rng),
        intelligence: roll_ability(rng),
        wisdom: roll_ability(rng),
        charisma: roll_ability(rng),
    };

    let die = hit_die(class) as i32;
    let con = AbilityScores::modifier(abilities.constitution);
    let first = (die + con).max(1);
    let later = ((die / 2 + 1) + con).max(1) * (level as i32 - 1);

    Ok(Character {
        name: name.trim().to_string(),
        class: class.trim().to_lowercase(),
        race: race.trim().to_lowercase(),
        level,
        hit_points: first + later,
        abilities,
        created_at: Utc::now(),
    })
}

fn level_param(params: &Value) -> Result<u32> {
    match &params["level"] {
        Value::Null => Ok(1),
        v => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| Error::InvalidInput(format!("Invalid level {}", v))),
    }
}

/// Creates the character creation tool
pub fn create_character_tool(store: Arc<dyn CharacterStore>) -> Result<FunctionTool> {
    let schema = ToolSchema::new()
        .property("name", "string", "The character's name")
        .property("class", "string", "Class such as fighter, wizard or rogue")
        .property("race", "string", "Race such as human, elf or dwarf")
        .property("level", "integer", "Starting level (1-20), defaults to 1")
        .required("name")
        .required("class")
        .required("race")
        .build();

    FunctionTool::builder()
        .name(CREATE_CHARACTER_TOOL_NAME)
        .description(
            "Creates a new player character with rolled ability scores and hit points, \
             and saves it so it can be looked up later.",
        )
        .schema(schema)
        .execute(move |ctx, params| {
            let store = store.clone();
            async move {
                let character = {
                    let mut rng = rand::thread_rng();
                    roll_character(
                        &mut rng,
                        required_str(&params, "name")?,
                        required_str(&params, "class")?,
                        required_str(&params, "race")?,
                        level_param(&params)?,
                    )?
                };

                let saved = store.create(character).await?;
                tracing::info!(
                    invocation_id = %ctx.invocation_id(),
                    character = %saved.name,
                    class = %saved.class,
                    "Created character"
                );

                Ok(ToolResponse {
                    result: serde_json::to_value(saved)?,
                })
            }
        })
        .build()
}

/// Creates the character lookup tool
pub fn get_character_tool(store: Arc<dyn CharacterStore>) -> Result<FunctionTool> {
    let schema = ToolSchema::new()
        .property("name", "string", "Name of the character to look up")
        .required("name")
        .build();

    FunctionTool::builder()
        .name(GET_CHARACTER_TOOL_NAME)
        .description("Looks up a previously created character by name.")
        .schema(schema)
        .execute(move |_ctx, params| {
            let store = store.clone();
            async move {
                let name = required_str(&params, "name")?;
                match store.get(name).await? {
                    Some(character) => Ok(ToolResponse {
                        result: serde_json::to_value(character)?,
                    }),
                    None => Err(Error::InvalidInput(format!(
                        "No character named '{}'",
                        name
                    ))),
                }
            }
        })
        .build()
}

/// Creates the tool listing every stored character
pub fn list_characters_tool(store: Arc<dyn CharacterStore>) -> Result<FunctionTool> {
    FunctionTool::builder()
        .name(LIST_CHARACTERS_TOOL_NAME)
        .description("Lists the names, classes and levels of all saved characters.")
        .schema(ToolSchema::new().build())
        .execute(move |_ctx, _params| {
            let store = store.clone();
            async move {
                let characters: Vec<Value> = store
                    .list()
                    .await?
                    .into_iter()
                    .map(|c| json!({"name": c.name, "class": c.class, "level": c.level}))
                    .collect();
                Ok(ToolResponse {
                    result: json!({ "characters": characters }),
                })
            }
        })
        .build()
}
