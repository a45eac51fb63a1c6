//! Code execution tool backed by the [`Sandbox`].

use async_trait::async_trait;

use super::{param_or, Sandbox, Tool};
use crate::config::SandboxConfig;
use crate::error::ChatError;
use crate::models::Params;

pub const MISSING_CODE_HINT: &str =
    "Please provide Python code in ```python``` blocks for execution.";

#[derive(Debug, Clone)]
pub struct CodeTool {
    sandbox: Sandbox,
}

impl CodeTool {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            sandbox: Sandbox::new(config),
        }
    }
}

#[async_trait]
impl Tool for CodeTool {
    fn id(&self) -> &str {
        "code_execute"
    }

    fn description(&self) -> &str {
        "Execute Python code safely"
    }

    async fn invoke(&self, params: &Params) -> Result<String, ChatError> {
        let code = param_or(params, "code", "");
        if code.is_empty() {
            return Ok(MISSING_CODE_HINT.to_string());
        }

        // Rejections and timeouts are ordinary replies, not faults
        match self.sandbox.run(code).await {
            Ok(output) => Ok(output.render()),
            Err(e @ (ChatError::ExecutionRejected(_) | ChatError::ExecutionTimeout(_))) => {
                Ok(e.to_string())
            }
            Err(e) => Ok(format!("Error executing code: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(snippet: &str) -> Params {
        let mut params = Params::new();
        params.insert("code".to_string(), snippet.to_string());
        params
    }

    #[tokio::test]
    async fn test_missing_code_hint() {
        let tool = CodeTool::new(&SandboxConfig::default());
        assert_eq!(tool.invoke(&Params::new()).await.unwrap(), MISSING_CODE_HINT);
    }

    #[tokio::test]
    async fn test_rejection_is_a_normal_reply() {
        let tool = CodeTool::new(&SandboxConfig::default());
        let reply = tool.invoke(&code("import os\nprint(os.getcwd())")).await.unwrap();
        assert!(reply.contains("security"));
        assert!(reply.contains("'os'"));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_reported() {
        let tool = CodeTool::new(&SandboxConfig {
            interpreter: "definitely-not-an-interpreter".to_string(),
            ..SandboxConfig::default()
        });
        let reply = tool.invoke(&code("print(1)")).await.unwrap();
        assert!(reply.starts_with("Error executing code:"));
    }
}
