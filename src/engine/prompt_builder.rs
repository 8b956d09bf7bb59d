use serde_json::{json, Value};

use crate::model::game_state::{Emotion, GameSetting, PlayerState, STARTING_HEALTH};

/// Builds the text sent to the narrator model.
/// This struct only formats text: no parsing, no networking.
pub struct PromptBuilder;

impl PromptBuilder {
    /// System instruction fixing persona, language, genre and output format.
    pub fn system_instruction(setting: GameSetting, language: &str) -> String {
        let mut prompt = String::new();

        push_persona(&mut prompt);
        push_output_fields(&mut prompt, setting);
        push_story_rules(&mut prompt);
        push_language(&mut prompt, language);

        prompt
    }

    pub fn opening_message() -> String {
        format!(
            "Start a new adventure. The player has {STARTING_HEALTH} health and an empty inventory."
        )
    }

    pub fn action_message(action: &str, player: &PlayerState) -> String {
        format!(
            "Player action: \"{}\"\n\n\
Current state:\n\
- Health: {}\n\
- Inventory: [{}]\n",
            action,
            player.health,
            player.inventory.join(", ")
        )
    }

    /// JSON schema of the structured reply, sent as `response_format`.
    pub fn response_schema() -> Value {
        let emotions: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();

        json!({
            "type": "object",
            "properties": {
                "storyText": {
                    "type": "string",
                    "description": "Story text shown to the player."
                },
                "health": {
                    "type": "number",
                    "description": "New, updated value of the player's health."
                },
                "inventory": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Full, updated list of items in the player's inventory."
                },
                "emotion": {
                    "type": "string",
                    "enum": emotions,
                    "description": "Tone of the scene."
                }
            },
            "required": ["storyText", "health", "inventory", "emotion"],
            "additionalProperties": false
        })
    }
}

fn push_persona(prompt: &mut String) {
    prompt.push_str(
        "You are a dynamic and creative game master of a text adventure game.\n\n\
Rules:\n\
- You FULLY control the player's state: their health and their inventory.\n\
- Your reply MUST ALWAYS be a single JSON object matching the provided schema.\n",
    );
}

fn push_output_fields(prompt: &mut String, setting: GameSetting) {
    prompt.push_str(&format!(
        "- In 'storyText' you write a gripping, interactive {} story. Describe the outcome of the \
player's action and the new scene vividly, then prompt the next action. Use 2-4 paragraphs.\n",
        setting.genre()
    ));

    prompt.push_str(
        "- In 'health' you set the NEW value of the player's health. Lower it when they take damage, \
raise it when they heal.\n\
- In 'inventory' you return the FULL, UPDATED list of the player's items. Add items they find, \
remove items they lose or use up.\n\
- In 'emotion' you tag the tone of the scene: one of ",
    );
    let emotions: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
    prompt.push_str(&emotions.join(", "));
    prompt.push_str(".\n");
}

fn push_story_rules(prompt: &mut String) {
    prompt.push_str(
        "- The plot must depend on the inventory and health. If the player has a useful item, describe \
how they use it. If health is low, describe the character's weakness.\n\
- The story may end in death (health <= 0).\n\
- Never break character. You are the game master, not an AI model.\n\
- Open the game with a gripping scenario that demands immediate action.\n",
    );
}

fn push_language(prompt: &mut String, language: &str) {
    prompt.push_str(&format!("- ALWAYS answer in {language}.\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_message_lists_state() {
        let player = PlayerState {
            health: 42,
            inventory: vec!["rope".into(), "lantern".into()],
        };
        let msg = PromptBuilder::action_message("open the door", &player);

        assert!(msg.contains("\"open the door\""));
        assert!(msg.contains("Health: 42"));
        assert!(msg.contains("Inventory: [rope, lantern]"));
    }

    #[test]
    fn system_instruction_carries_genre_and_language() {
        let prompt = PromptBuilder::system_instruction(GameSetting::Cyberpunk, "Russian");
        assert!(prompt.contains("cyberpunk"));
        assert!(prompt.contains("ALWAYS answer in Russian"));
        assert!(prompt.contains("action"));
    }

    #[test]
    fn schema_requires_every_field() {
        let schema = PromptBuilder::response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert_eq!(schema["properties"]["emotion"]["enum"][0], "neutral");
        // strict structured output rejects open objects
        assert_eq!(schema["additionalProperties"], false);
    }
}
