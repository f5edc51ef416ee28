use crate::{FunctionTool, ToolSchema};
use gm_core::{Error, Result, ToolResponse};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

pub const DICE_TOOL_NAME: &str = "diceRoll";

/// Die sizes the table accepts
pub const DICE_SIDES: [u32; 7] = [4, 6, 8, 10, 12, 20, 100];

const MAX_DICE: u32 = 100;

/// A parsed roll such as `3d8+2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceSpec {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Result<Self> {
        if !DICE_SIDES.contains(&sides) {
            return Err(Error::InvalidInput(format!(
                "Invalid dice type d{}; use one of d4, d6, d8, d10, d12, d20, d100",
                sides
            )));
        }
        if count == 0 || count > MAX_DICE {
            return Err(Error::InvalidInput(format!(
                "Number of dice must be between 1 and {}, got {}",
                MAX_DICE, count
            )));
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// Parses `[count]d<sides>[+|-modifier]`, e.g. `d20`, `2d6`, `4d8-1`
    pub fn parse(notation: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("Invalid dice notation '{}'", notation));
        let compact: String = notation
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let (count_part, rest) = compact.split_once('d').ok_or_else(invalid)?;
        let count = if count_part.is_empty() {
            1
        } else {
            count_part.parse().map_err(|_| invalid())?
        };

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let modifier: i32 = rest[pos..].parse().map_err(|_| invalid())?;
                (&rest[..pos], modifier)
            }
            None => (rest, 0),
        };
        let sides = sides_part.parse().map_err(|_| invalid())?;

        Self::new(count, sides, modifier)
    }

    /// Builds a spec from the `dice_type`/`num_dice` argument style
    pub fn from_type(dice_type: &str, num_dice: u32) -> Result<Self> {
        let sides = dice_type
            .trim()
            .to_lowercase()
            .strip_prefix('d')
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::InvalidInput(format!("Invalid dice type {}", dice_type)))?;
        Self::new(num_dice, sides, 0)
    }

    pub fn notation(&self) -> String {
        match self.modifier {
            0 => format!("{}d{}", self.count, self.sides),
            m if m > 0 => format!("{}d{}+{}", self.count, self.sides, m),
            m => format!("{}d{}{}", self.count, self.sides, m),
        }
    }

    pub fn roll_with<R: Rng>(&self, rng: &mut R) -> DiceRoll {
        let results: Vec<u32> = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides))
            .collect();
        let sum: i64 = results.iter().map(|&r| i64::from(r)).sum();
        DiceRoll {
            notation: self.notation(),
            total: sum + i64::from(self.modifier),
            modifier: self.modifier,
            results,
        }
    }

    pub fn roll(&self) -> DiceRoll {
        self.roll_with(&mut rand::thread_rng())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub notation: String,
    pub results: Vec<u32>,
    pub modifier: i32,
    pub total: i64,
}

fn spec_from_params(params: &Value) -> Result<DiceSpec> {
    if let Some(notation) = params["notation"].as_str() {
        return DiceSpec::parse(notation);
    }
    if let Some(dice_type) = params["dice_type"].as_str() {
        let num_dice = match &params["num_dice"] {
            Value::Null => 1,
            n => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| Error::InvalidInput(format!("Invalid num_dice {}", n)))?,
        };
        return DiceSpec::from_type(dice_type, num_dice);
    }
    Err(Error::InvalidInput(
        "Provide either 'notation' or 'dice_type'".to_string(),
    ))
}

/// Creates the dice rolling tool
pub fn create_dice_tool() -> Result<FunctionTool> {
    let schema = ToolSchema::new()
        .property(
            "notation",
            "string",
            "Dice notation such as '1d20', '2d6' or '4d8+2'",
        )
        .enum_property(
            "dice_type",
            ["d4", "d6", "d8", "d10", "d12", "d20", "d100"],
            "Die size, used together with num_dice when notation is absent",
        )
        .property("num_dice", "integer", "How many dice to roll (1-100)")
        .build();

    FunctionTool::builder()
        .name(DICE_TOOL_NAME)
        .description(
            "Rolls tabletop dice and returns each result and the total. \
             Use it whenever a player or NPC rolls.",
        )
        .schema(schema)
        .execute(|ctx, params| async move {
            let spec = spec_from_params(&params)?;
            let roll = spec.roll();

            tracing::debug!(
                invocation_id = %ctx.invocation_id(),
                tool_call_id = %ctx.function_call_id(),
                notation = %roll.notation,
                total = roll.total,
                "Rolled dice"
            );

            Ok(ToolResponse {
                result: serde_json::to_value(roll)?,
            })
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DefaultToolContext;
    use gm_core::Tool;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    #[test]
    fn test_parse_notation() {
        assert_eq!(DiceSpec::parse("2d6").unwrap(), DiceSpec::new(2, 6, 0).unwrap());
        assert_eq!(DiceSpec::parse("d20").unwrap().count, 1);
        assert_eq!(DiceSpec::parse(" 4D8 + 2 ").unwrap().modifier, 2);
        assert_eq!(DiceSpec::parse("1d100-3").unwrap().modifier, -3);
    }

    #[test]
    fn test_parse_rejects_bad_notation() {
        assert!(DiceSpec::parse("roll").is_err());
        assert!(DiceSpec::parse("2d").is_err());
        assert!(DiceSpec::parse("1d3").is_err());
        assert!(DiceSpec::parse("0d6").is_err());
        assert!(DiceSpec::parse("101d6").is_err());
        assert!(DiceSpec::parse("2d6+x").is_err());
    }

    #[test]
    fn test_from_type() {
        assert_eq!(
            DiceSpec::from_type("d6", 2).unwrap(),
            DiceSpec::new(2, 6, 0).unwrap()
        );
        assert!(DiceSpec::from_type("d3", 1).is_err());
        assert!(DiceSpec::from_type("d6", 0).is_err());
    }

    #[test]
    fn test_roll_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let spec = DiceSpec::parse("10d6+1").unwrap();
        let roll = spec.roll_with(&mut rng);

        assert_eq!(roll.results.len(), 10);
        assert!(roll.results.iter().all(|&r| (1..=6).contains(&r)));
        let sum: i64 = roll.results.iter().map(|&r| i64::from(r)).sum();
        assert_eq!(roll.total, sum + 1);
        assert_eq!(roll.notation, "10d6+1");
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let spec = DiceSpec::parse("3d20").unwrap();
        let a = spec.roll_with(&mut StdRng::seed_from_u64(7));
        let b = spec.roll_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_dice_tool_with_notation() {
        let tool = create_dice_tool().unwrap();
        assert_eq!(tool.name(), DICE_TOOL_NAME);

        let ctx = Arc::new(DefaultToolContext::new("call-1", "inv-1"));
        let response = tool
            .execute(ctx, serde_json::json!({"notation": "1d20"}))
            .await
            .unwrap();

        let total = response.result["total"].as_i64().unwrap();
        assert!((1..=20).contains(&total));
        assert_eq!(response.result["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dice_tool_with_type_and_count() {
        let tool = create_dice_tool().unwrap();
        let ctx = Arc::new(DefaultToolContext::new("call-2", "inv-2"));
        let response = tool
            .execute(ctx, serde_json::json!({"dice_type": "d6", "num_dice": 2}))
            .await
            .unwrap();

        let results = response.result["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| (1..=6).contains(&r.as_u64().unwrap())));
    }

    #[tokio::test]
    async fn test_dice_tool_rejects_missing_arguments() {
        let tool = create_dice_tool().unwrap();
        let ctx = Arc::new(DefaultToolContext::new("call-3", "inv-3"));
        let err = tool.execute(ctx, serde_json::json!({})).await.unwrap_err();
        assert!(err.to_string().contains("notation"));
    }
}
