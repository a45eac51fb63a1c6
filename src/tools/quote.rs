//! Inspirational quote tool.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use super::Tool;
use crate::error::ChatError;
use crate::models::Params;

pub const QUOTES: [&str; 10] = [
    "The only way to do great work is to love what you do. - Steve Jobs 💫",
    "Life is what happens when you're busy making other plans. - John Lennon 🌟",
    "The future belongs to those who believe in the beauty of their dreams. - Eleanor Roosevelt ✨",
    "Success is not final, failure is not fatal: it is the courage to continue that counts. - Winston Churchill 🎯",
    "The only limit to our realization of tomorrow is our doubts of today. - Franklin D. Roosevelt 🚀",
    "Believe you can and you're halfway there. - Theodore Roosevelt 💪",
    "It does not matter how slowly you go as long as you do not stop. - Confucius 🐢",
    "The journey of a thousand miles begins with one step. - Lao Tzu 👣",
    "What you get by achieving your goals is not as important as what you become by achieving your goals. - Zig Ziglar 🎯",
    "The best way to predict the future is to create it. - Peter Drucker 🔮",
];

#[derive(Debug, Clone, Default)]
pub struct QuoteTool;

impl QuoteTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for QuoteTool {
    fn id(&self) -> &str {
        "quote"
    }

    fn description(&self) -> &str {
        "Share an inspirational quote"
    }

    async fn invoke(&self, _params: &Params) -> Result<String, ChatError> {
        let quote = QUOTES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(QUOTES[0]);
        Ok(quote.to_string())
    }
}
