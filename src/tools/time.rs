//! Current time tool.

use async_trait::async_trait;
use chrono::Local;

use super::Tool;
use crate::error::ChatError;
use crate::models::Params;

#[derive(Debug, Clone, Default)]
pub struct TimeTool;

impl TimeTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for TimeTool {
    fn id(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Get current time and date"
    }

    async fn invoke(&self, _params: &Params) -> Result<String, ChatError> {
        Ok(format!(
            "Current time: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_time_format() {
        let reply = TimeTool::new().invoke(&Params::new()).await.unwrap();
        let stamp = reply.strip_prefix("Current time: ").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
