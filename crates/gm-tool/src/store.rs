//! Character storage
//!
//! The character store is an external key-value collaborator; the trait is
//! the seam and `InMemoryCharacterStore` backs the tool host and tests.
//! Keys are character names compared case-insensitively.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gm_core::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    /// Standard ability modifier: (score - 10) / 2, rounded down
    pub fn modifier(score: u8) -> i32 {
        (i32::from(score) - 10).div_euclid(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: String,
    pub race: String,
    pub level: u32,
    pub hit_points: i32,
    pub abilities: AbilityScores,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Stores a new character; fails if the name is taken
    async fn create(&self, character: Character) -> Result<Character>;

    async fn get(&self, name: &str) -> Result<Option<Character>>;

    /// All characters, sorted by name
    async fn list(&self) -> Result<Vec<Character>>;
}

#[derive(Debug, Default)]
pub struct InMemoryCharacterStore {
    characters: DashMap<String, Character>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl CharacterStore for InMemoryCharacterStore {
    async fn create(&self, character: Character) -> Result<Character> {
        match self.characters.entry(key(&character.name)) {
            Entry::Occupied(_) => Err(Error::InvalidInput(format!(
                "A character named '{}' already exists",
                character.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(character.clone());
                Ok(character)
            }
        }
    }

    async fn get(&self, name: &str) -> Result<Option<Character>> {
        Ok(self.characters.get(&key(name)).map(|c| c.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Character>> {
        let mut all: Vec<Character> = self
            .characters
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> Character {
        Character {
            name: name.to_string(),
            class: "wizard".to_string(),
            race: "elf".to_string(),
            level: 1,
            hit_points: 6,
            abilities: AbilityScores {
                strength: 8,
                dexterity: 14,
                constitution: 12,
                intelligence: 16,
                wisdom: 10,
                charisma: 11,
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_case_insensitive() {
        let store = InMemoryCharacterStore::new();
        store.create(sample("Aria")).await.unwrap();

        let found = store.get("aria").await.unwrap().unwrap();
        assert_eq!(found.name, "Aria");
        assert!(store.get("Borin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let store = InMemoryCharacterStore::new();
        store.create(sample("Aria")).await.unwrap();
        let err = store.create(sample("ARIA")).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = InMemoryCharacterStore::new();
        store.create(sample("Zed")).await.unwrap();
        store.create(sample("Aria")).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Aria", "Zed"]);
    }

    #[test]
    fn test_ability_modifier() {
        assert_eq!(AbilityScores::modifier(10), 0);
        assert_eq!(AbilityScores::modifier(15), 2);
        assert_eq!(AbilityScores::modifier(8), -1);
        assert_eq!(AbilityScores::modifier(3), -4);
    }
}
