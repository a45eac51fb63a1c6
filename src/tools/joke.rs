//! Random joke tool.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use super::Tool;
use crate::error::ChatError;
use crate::models::Params;

pub const JOKES: [&str; 10] = [
    "Why don't scientists trust atoms? Because they make up everything! 😄",
    "What do you call a fake noodle? An impasta! 🍝",
    "Why did the scarecrow win an award? Because he was outstanding in his field! 🌾",
    "I told my wife she was drawing her eyebrows too high. She looked surprised! 😲",
    "Why don't eggs tell jokes? They'd crack each other up! 🥚",
    "What do you call a bear with no teeth? A gummy bear! 🐻",
    "Why did the math book look so sad? Because it had too many problems! 📚",
    "What do you call a fish wearing a bowtie? So-fish-ticated! 🐟",
    "Why don't skeletons fight each other? They don't have the guts! 💀",
    "What do you call a can opener that doesn't work? A can't opener! 🥫",
];

#[derive(Debug, Clone, Default)]
pub struct JokeTool;

impl JokeTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for JokeTool {
    fn id(&self) -> &str {
        "joke"
    }

    fn description(&self) -> &str {
        "Tell a random joke"
    }

    async fn invoke(&self, _params: &Params) -> Result<String, ChatError> {
        let joke = JOKES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(JOKES[0]);
        Ok(joke.to_string())
    }
}
