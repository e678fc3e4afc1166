//! GenAI-based chat backend for OpenRouter
//!
//! OpenRouter speaks the OpenAI chat-completions protocol, so every model
//! name is routed through genai's OpenAI adapter at the configured base URL.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use genai::adapter::AdapterKind;
use genai::chat::{
    ChatMessage, ChatOptions, ChatRequest, ChatStreamEvent, Tool, ToolCall, ToolResponse,
};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget, WebConfig};
use tracing::{debug, error};

use super::logging::{log_llm_interaction, LogConfig};
use super::{ChatBackend, Completion};
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::session::{Message, Role, ToolInvocationRequest};
use crate::tools::ToolDefinition;

/// Chat backend talking to an OpenAI-compatible endpoint
pub struct GenAIProvider {
    client: Client,
    model: String,
}

impl GenAIProvider {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build a provider from the `[llm]` config, resolving the API key
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            Error::Config(format!(
                "{} not found in environment variables",
                config.api_key_env
            ))
        })?;
        Ok(Self::with_api_key(config, api_key))
    }

    /// Build a provider with an explicit API key
    pub fn with_api_key(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let base_url = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };

        let target_resolver = ServiceTargetResolver::from_resolver_fn(
            move |service_target: ServiceTarget| -> std::result::Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget { model, .. } = service_target;
                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(base_url.clone()),
                    auth: AuthData::from_single(api_key.clone()),
                    model: ModelIden::new(AdapterKind::OpenAI, model.model_name),
                })
            },
        );

        let web_config = WebConfig::default()
            .with_timeout(config.timeout())
            .with_connect_timeout(Self::CONNECT_TIMEOUT);

        let client = Client::builder()
            .with_web_config(web_config)
            .with_service_target_resolver(target_resolver)
            .build();

        Self {
            client,
            model: config.model.clone(),
        }
    }

    /// Convert the message log into a genai request
    ///
    /// Tool responses whose call was trimmed out of the log are skipped, so
    /// the wire conversation never references an unknown call id.
    fn build_request(messages: &[Message], tools: &[ToolDefinition]) -> ChatRequest {
        let mut chat_req = ChatRequest::default();
        let mut announced: HashSet<&str> = HashSet::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    chat_req = chat_req.append_message(ChatMessage::system(msg.text()));
                }
                Role::User => {
                    chat_req = chat_req.append_message(ChatMessage::user(msg.text()));
                }
                Role::Assistant if msg.has_tool_calls() => {
                    // tool_calls must travel as a single assistant message
                    let calls: Vec<ToolCall> = msg
                        .tool_calls
                        .iter()
                        .map(|tc| {
                            announced.insert(tc.id.as_str());
                            ToolCall {
                                call_id: tc.id.clone(),
                                fn_name: tc.tool_name.clone(),
                                fn_arguments: tc.arguments.clone(),
                                thought_signatures: None,
                            }
                        })
                        .collect();
                    chat_req = chat_req.append_message(calls);
                }
                Role::Assistant => {
                    chat_req = chat_req.append_message(ChatMessage::assistant(msg.text()));
                }
                Role::Tool => match msg.tool_call_id.as_deref() {
                    Some(call_id) if announced.contains(call_id) => {
                        let response = ToolResponse::new(call_id.to_string(), msg.text().to_string());
                        chat_req = chat_req.append_message(response);
                    }
                    other => {
                        debug!(call_id = ?other, "Skipping tool response without a matching call");
                    }
                },
            }
        }

        if !tools.is_empty() {
            let genai_tools: Vec<Tool> = tools
                .iter()
                .map(|t| {
                    Tool::new(&t.name)
                        .with_description(&t.description)
                        .with_schema(t.parameters.clone())
                })
                .collect();
            chat_req = chat_req.with_tools(genai_tools);
        }

        chat_req
    }

    fn fail(&self, messages: &[Message], tools: &[ToolDefinition], error_msg: String) -> Error {
        log_llm_interaction(LogConfig {
            model: &self.model,
            messages,
            tools: Some(tools),
            error: Some(&error_msg),
            ..Default::default()
        });
        Error::Provider(error_msg)
    }
}

#[async_trait]
impl ChatBackend for GenAIProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Completion> {
        let chat_req = Self::build_request(messages, tools);
        debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "Sending chat request");

        // Stream to stay clear of gateway idle timeouts on slow models.
        // Tool calls arrive as argument fragments; genai merges them into
        // the End event when capture is on.
        let options = ChatOptions::default().with_capture_tool_calls(true);
        let stream_response = match self
            .client
            .exec_chat_stream(&self.model, chat_req, Some(&options))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = ?e, model = %self.model, "LLM request failed");
                return Err(self.fail(messages, tools, format!("GenAI error: {}", e)));
            }
        };

        let mut content = String::new();
        let mut tool_calls: Vec<ToolInvocationRequest> = Vec::new();
        let mut stream = stream_response.stream;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    content.push_str(&chunk.content);
                }
                Ok(ChatStreamEvent::End(end)) => {
                    tool_calls = end
                        .captured_into_tool_calls()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|call| {
                            ToolInvocationRequest::new(call.call_id, call.fn_name, call.fn_arguments)
                        })
                        .collect();
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = ?e, model = %self.model, "LLM stream error");
                    return Err(self.fail(messages, tools, format!("GenAI stream error: {}", e)));
                }
            }
        }

        let result = Completion {
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls,
        };

        log_llm_interaction(LogConfig {
            model: &self.model,
            messages,
            tools: Some(tools),
            result: Some(&result),
            ..Default::default()
        });

        Ok(result)
    }
}
