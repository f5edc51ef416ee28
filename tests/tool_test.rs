// Game Master turns driven through the built-in tools

use gm_agent::GameMaster;
use gm_agent::testing::ScriptedModel;
use gm_core::{Error, ModelResponse, ToolInvocationRequest, ToolOutcome};
use gm_tool::builtin::game_master_tools;
use gm_tool::{InMemoryCharacterStore, ToolRegistry};
use serde_json::json;
use std::sync::Arc;

fn builtin_registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry
        .register_all(game_master_tools(Arc::new(InMemoryCharacterStore::new()), None).unwrap())
        .unwrap();
    Arc::new(registry)
}

fn game_master(model: Arc<ScriptedModel>, tools: Arc<ToolRegistry>) -> GameMaster {
    GameMaster::builder()
        .model(model)
        .tools(tools)
        .system_prompt("You are the Game Master.")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_roll_2d6_text_path() {
    let model = Arc::new(ScriptedModel::new().then_text("The dice clatter: 3 and 5, for 8."));
    let gm = game_master(model.clone(), builtin_registry());

    let turn = gm.respond("roll 2d6").await.unwrap();

    assert_eq!(turn.reply, "The dice clatter: 3 and 5, for 8.");
    assert_eq!(turn.model_calls, 1);
    assert!(turn.tool_results.is_empty());

    let advertised: Vec<String> = model.requests()[0]
        .tools
        .iter()
        .map(|t| t.name.clone())
        .collect();
    assert_eq!(advertised[0], "diceRoll");
    assert!(advertised.contains(&"createCharacter".to_string()));
}

#[tokio::test]
async fn test_dice_roll_1d20() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool_calls(vec![ToolInvocationRequest::new(
                "diceRoll",
                json!({"notation": "1d20"}),
            )])
            .then_text("Fate has spoken."),
    );
    let gm = game_master(model.clone(), builtin_registry());

    let turn = gm.respond("I try to pick the lock").await.unwrap();

    assert_eq!(turn.reply, "Fate has spoken.");
    let result = turn.tool_results[0].result_value();
    let total = result["total"].as_i64().unwrap();
    assert!((1..=20).contains(&total));
    assert_eq!(result["results"].as_array().unwrap().len(), 1);

    let follow_up = model.requests()[1].last_user_text().unwrap();
    assert!(follow_up.contains(&format!("\"total\":{}", total)));
}

#[tokio::test]
async fn test_invalid_dice_folded_into_results() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool_calls(vec![
                ToolInvocationRequest::new("diceRoll", json!({"dice_type": "d3"})),
                ToolInvocationRequest::new("diceRoll", json!({"dice_type": "d6", "num_dice": 0})),
                ToolInvocationRequest::new("diceRoll", json!({"dice_type": "d8", "num_dice": 2})),
            ])
            .then_text("Two of those dice do not exist."),
    );
    let gm = game_master(model, builtin_registry());

    let turn = gm.respond("roll weird dice").await.unwrap();

    assert!(turn.tool_results[0].is_error());
    assert!(turn.tool_results[1].is_error());
    assert!(!turn.tool_results[2].is_error());
}

#[tokio::test]
async fn test_character_persists_across_turns() {
    let registry = builtin_registry();
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool_calls(vec![ToolInvocationRequest::new(
                "createCharacter",
                json!({"name": "Aria", "class": "wizard", "race": "elf"}),
            )])
            .then_text("Aria the elf wizard joins the party.")
            .then_tool_calls(vec![ToolInvocationRequest::new(
                "getCharacter",
                json!({"name": "aria"}),
            )])
            .then_text("Aria is a level 1 wizard."),
    );
    let gm = game_master(model, registry);

    let created = gm.respond("Create an elf wizard named Aria").await.unwrap();
    assert!(!created.tool_results[0].is_error());

    let looked_up = gm.respond("Tell me about Aria").await.unwrap();
    let sheet = looked_up.tool_results[0].result_value();
    assert_eq!(sheet["name"], "Aria");
    assert_eq!(sheet["class"], "wizard");
    assert_eq!(sheet["level"], 1);
}

#[tokio::test]
async fn test_cast_spell_is_unknown() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool_calls(vec![ToolInvocationRequest::new(
                "castSpell",
                json!({"spell": "magic missile"}),
            )])
            .then_text("There is no spellcasting tool, but the missile flies true."),
    );
    let gm = game_master(model.clone(), builtin_registry());

    let turn = gm.respond("I cast magic missile").await.unwrap();

    assert_eq!(turn.model_calls, 2);
    assert_eq!(
        turn.tool_results[0].outcome,
        ToolOutcome::Failure("Unknown tool: castSpell".to_string())
    );
    assert!(
        model.requests()[1]
            .last_user_text()
            .unwrap()
            .contains("Unknown tool: castSpell")
    );
}

#[tokio::test]
async fn test_lore_without_delegate_still_completes_turn() {
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool_calls(vec![ToolInvocationRequest::new(
                "retrieveLore",
                json!({"query": "owlbear"}),
            )])
            .then_error(Error::ModelResponseFormat("empty".to_string())),
    );
    let gm = game_master(model, builtin_registry());

    let turn = gm.respond("What is an owlbear?").await.unwrap();

    assert!(turn.fallback);
    assert!(turn.reply.contains("retrieveLore failed"));
    assert!(turn.reply.contains("lore delegate not configured"));
}

#[tokio::test]
async fn test_scripted_model_exhaustion() {
    use gm_core::{ModelClient, ModelRequest};

    let model = ScriptedModel::new().then_text("once");
    let first = model
        .invoke(ModelRequest::single_turn("sys", "a"))
        .await
        .unwrap();
    assert_eq!(first, ModelResponse::Text("once".to_string()));
    assert!(
        model
            .invoke(ModelRequest::single_turn("sys", "b"))
            .await
            .is_err()
    );
}
