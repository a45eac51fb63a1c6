//! Simple text games.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{param_or, Tool};
use crate::error::ChatError;
use crate::models::Params;

pub const DEFAULT_GAME: &str = "rps";

const HANGMAN_WORDS: [&str; 8] = [
    "PYTHON",
    "JAVASCRIPT",
    "PROGRAMMING",
    "ALGORITHM",
    "DATABASE",
    "FRONTEND",
    "BACKEND",
    "API",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Game {
    RockPaperScissors,
    NumberGuess,
    Hangman,
    Unknown,
}

impl Game {
    fn parse(game_type: &str) -> Self {
        match game_type.to_lowercase().as_str() {
            "rps" | "rock" | "paper" | "scissors" => Game::RockPaperScissors,
            "number" | "guess" | "guessing" => Game::NumberGuess,
            "word" | "hangman" => Game::Hangman,
            _ => Game::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayTool;

impl PlayTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for PlayTool {
    fn id(&self) -> &str {
        "play"
    }

    fn description(&self) -> &str {
        "Play a simple text game"
    }

    async fn invoke(&self, params: &Params) -> Result<String, ChatError> {
        let mut rng = rand::thread_rng();

        let reply = match Game::parse(param_or(params, "game_type", DEFAULT_GAME)) {
            Game::RockPaperScissors => {
                let choice = ["rock", "paper", "scissors"]
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("rock");
                format!(
                    "🎮 Let's play Rock, Paper, Scissors! I chose {}! What did you choose?",
                    choice
                )
            }
            Game::NumberGuess => {
                let number: u32 = rng.gen_range(1..=100);
                format!(
                    "🎲 I'm thinking of a number between 1 and 100. Can you guess it? (Hint: It's {} 😉)",
                    number
                )
            }
            Game::Hangman => {
                let word = HANGMAN_WORDS
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(HANGMAN_WORDS[0]);
                format!(
                    "🎯 Let's play Hangman! I'm thinking of a programming-related word with {} letters. Start guessing!",
                    word.len()
                )
            }
            Game::Unknown => "🎮 I can play Rock, Paper, Scissors, Number Guessing, or Hangman! Just ask me to play one of these games!".to_string(),
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(kind: &str) -> Params {
        let mut params = Params::new();
        params.insert("game_type".to_string(), kind.to_string());
        params
    }

    #[test]
    fn test_game_parse() {
        assert_eq!(Game::parse("Scissors"), Game::RockPaperScissors);
        assert_eq!(Game::parse("guessing"), Game::NumberGuess);
        assert_eq!(Game::parse("WORD"), Game::Hangman);
        assert_eq!(Game::parse("chess"), Game::Unknown);
    }

    #[tokio::test]
    async fn test_default_game_is_rps() {
        let reply = PlayTool::new().invoke(&Params::new()).await.unwrap();
        assert!(reply.contains("Rock, Paper, Scissors"));
    }

    #[tokio::test]
    async fn test_each_game() {
        let tool = PlayTool::new();
        assert!(tool.invoke(&game("number")).await.unwrap().contains("between 1 and 100"));
        assert!(tool.invoke(&game("hangman")).await.unwrap().contains("Hangman"));
        assert!(tool.invoke(&game("game")).await.unwrap().starts_with("🎮 I can play"));
    }
}
