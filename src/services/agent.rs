// SPDX-License-Identifier: MIT

//! The chat agent layer.
//!
//! Wraps the OpenAI chat API with the Absher system prompt, per-session
//! conversation memory, and two tools: documentation search and the
//! renewal-intent signal. A `submit_renewal_request` tool call is turned
//! into a [`ProposedAction`] via the renewal workflow's propose step, so
//! the fee on the popup is always the server-computed one.

use crate::error::{AppError, Result};
use crate::models::{Notification, ProposedAction, SessionUser};
use crate::services::composer::services_status_block;
use crate::services::docs::DocIndex;
use crate::services::openai::{ChatMessage, OpenAiClient, ToolDefinition};
use crate::services::renewal::RenewalService;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;

/// Upper bound on tool rounds within one user turn.
const MAX_TOOL_ROUNDS: usize = 4;

/// Conversation memory is capped per session; old turns fall off.
const MAX_HISTORY_MESSAGES: usize = 40;

const SEARCH_DOCS_TOOL: &str = "search_absher_docs";
const SUBMIT_RENEWAL_TOOL: &str = "submit_renewal_request";

const SYSTEM_PROMPT: &str = "\
You are AbsherAgent, an intelligent assistant for the Absher platform.

Your responsibilities:
- Explain how Absher services work using the search_absher_docs tool.
- Interpret the user's service status (national ID, driver license, passport, vehicle registration).
- Guide the user step-by-step through renewals and service actions.
- Only trigger a renewal action (submit_renewal_request) when the user explicitly confirms.

Language:
- Always reply in the same language the user uses (Arabic or English).

Data sources:
- The service status provided in the conversation input is the ONLY source of truth about the user's current service state.
- Use search_absher_docs for official Absher process information.
- Do NOT invent policies, requirements, or conditions.

Fee & payment rules:
- You MUST NOT provide, calculate, estimate, or confirm any fee amounts.
- If the user asks about fees, reply: \"The official fee will be calculated automatically by the Absher system.\"
- You MUST NOT request or handle any payment information. Payment is handled by the UI/backend after the renewal request tool is triggered.

Renewal process:
1. Inform the user clearly when a service is expired or expiring.
2. Ask the user if they want to renew.
3. Ask for explicit confirmation such as \"yes\", \"ok\", \"proceed\".
4. Only after explicit confirmation: call submit_renewal_request.

Safety:
- Never execute a renewal silently.
- Never state that a service has been renewed or paid for.
- Never modify service status yourself.
- Always be clear, polite, professional, and helpful.";

/// Result of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub reply: String,
    pub proposed_action: Option<ProposedAction>,
}

#[derive(Deserialize)]
struct SearchDocsArgs {
    query: String,
    #[serde(default = "default_k")]
    k: usize,
}

fn default_k() -> usize {
    4
}

#[derive(Deserialize)]
struct SubmitRenewalArgs {
    service_type: String,
    #[serde(default)]
    reason: Option<String>,
}

/// LLM-backed chat agent with per-session memory.
#[derive(Clone)]
pub struct ChatAgent {
    openai: OpenAiClient,
    docs: DocIndex,
    renewal: RenewalService,
    histories: Arc<DashMap<String, Vec<ChatMessage>>>,
    model: String,
    threshold_days: i64,
}

impl ChatAgent {
    pub fn new(
        openai: OpenAiClient,
        docs: DocIndex,
        renewal: RenewalService,
        model: String,
        threshold_days: i64,
    ) -> Self {
        Self {
            openai,
            docs,
            renewal,
            histories: Arc::new(DashMap::new()),
            model,
            threshold_days,
        }
    }

    /// Run one chat turn for a session user.
    pub async fn handle_chat(
        &self,
        user: &SessionUser,
        session_id: &str,
        message: &str,
        notifications: &[Notification],
    ) -> Result<ChatTurn> {
        let input = build_agent_input(user, session_id, message, notifications, self.threshold_days);

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        if let Some(history) = self.histories.get(session_id) {
            messages.extend(history.iter().cloned());
        }
        messages.push(ChatMessage::user(&input));

        let tools = tool_definitions();
        let mut proposed_action = None;
        let mut reply_text = None;

        for _round in 0..MAX_TOOL_ROUNDS {
            let reply = self
                .openai
                .chat(&self.model, &messages, Some(tools.as_slice()))
                .await?;
            messages.push(reply.clone());

            let Some(tool_calls) = reply.tool_calls.filter(|c| !c.is_empty()) else {
                reply_text = reply.content;
                break;
            };

            for call in tool_calls {
                let result = self.run_tool(session_id, &call.function.name, &call.function.arguments, &mut proposed_action);
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        let reply = reply_text.ok_or_else(|| {
            AppError::OpenAiApi("agent did not produce a final reply".to_string())
        })?;

        self.remember(session_id, &messages);

        Ok(ChatTurn {
            reply,
            proposed_action,
        })
    }

    /// Execute one tool call and return its (stringified) result for the
    /// model. Tool failures are reported back to the model, not raised.
    fn run_tool(
        &self,
        session_id: &str,
        name: &str,
        arguments: &str,
        proposed_action: &mut Option<ProposedAction>,
    ) -> String {
        match name {
            SEARCH_DOCS_TOOL => match serde_json::from_str::<SearchDocsArgs>(arguments) {
                Ok(args) => self.docs.search(&args.query, args.k.clamp(1, 20)),
                Err(e) => format!("Invalid arguments: {e}"),
            },
            SUBMIT_RENEWAL_TOOL => match serde_json::from_str::<SubmitRenewalArgs>(arguments) {
                Ok(args) => {
                    match self
                        .renewal
                        .propose(session_id, &args.service_type, args.reason.as_deref())
                    {
                        Ok(action) => {
                            let result = serde_json::json!({
                                "ok": true,
                                "action_id": action.id,
                                "service_type": args.service_type,
                                "message": "Renewal request prepared; the user will see a confirmation popup.",
                            })
                            .to_string();
                            *proposed_action = Some(action);
                            result
                        }
                        Err(e) => {
                            tracing::warn!(session_id = %session_id, error = %e, "Renewal proposal failed");
                            serde_json::json!({"ok": false, "message": e.to_string()}).to_string()
                        }
                    }
                }
                Err(e) => format!("Invalid arguments: {e}"),
            },
            other => {
                tracing::warn!(tool = other, "Agent requested unknown tool");
                format!("Unknown tool: {other}")
            }
        }
    }

    /// Persist the turn's messages (minus the system prompt) as history.
    fn remember(&self, session_id: &str, messages: &[ChatMessage]) {
        let mut history: Vec<ChatMessage> =
            messages.iter().skip(1).cloned().collect();
        if history.len() > MAX_HISTORY_MESSAGES {
            history.drain(..history.len() - MAX_HISTORY_MESSAGES);
        }
        self.histories.insert(session_id.to_string(), history);
    }
}

fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            SEARCH_DOCS_TOOL,
            "Semantic search over the official Absher documentation. Use it whenever the user \
             asks how Absher services work: renewal steps, required documents, procedures or \
             system rules.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "User question about how Absher services work."
                    },
                    "k": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 20,
                        "description": "Number of snippets to retrieve."
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolDefinition::function(
            SUBMIT_RENEWAL_TOOL,
            "Use this tool ONLY when the user has explicitly confirmed they want to proceed \
             with renewing a specific Absher service. This does NOT perform the renewal or \
             payment; it prepares a renewal request so the frontend can show an approval popup.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "service_type": {
                        "type": "string",
                        "enum": ["national_id", "driver_license", "passport", "vehicle_registration"],
                        "description": "Which service to renew."
                    },
                    "reason": {
                        "type": "string",
                        "description": "Short explanation for the UI of what will happen and why."
                    }
                },
                "required": ["service_type"]
            }),
        ),
    ]
}

/// The structured context the agent sees as the user turn.
fn build_agent_input(
    user: &SessionUser,
    session_id: &str,
    message: &str,
    notifications: &[Notification],
    threshold_days: i64,
) -> String {
    let services_status = services_status_block(user, Utc::now(), threshold_days);
    let notifications_context = build_notifications_context(notifications);

    format!(
        "Internal user_id (for tools): {session_id}\n\
         National ID: {national_id}\n\
         User name: {name}\n\
         \n\
         Current services status (SOURCE OF TRUTH):\n\
         {services_status}\n\
         \n\
         Recent proactive notifications (historical only):\n\
         {notifications_context}\n\
         \n\
         User message:\n\
         {message}",
        national_id = user.national_id,
        name = user.name,
    )
}

fn build_notifications_context(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No proactive notifications were sent yet.".to_string();
    }

    let mut sorted: Vec<&Notification> = notifications.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
        .iter()
        .map(|n| {
            format!(
                "- [{}] via {}: {}",
                crate::time_utils::format_utc_rfc3339(n.created_at),
                match n.channel {
                    crate::models::Channel::Sms => "SMS",
                    crate::models::Channel::InApp => "IN_APP",
                },
                n.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, NotificationMeta, ServiceKind, ServiceRecord};
    use crate::store::{MemoryStore, SessionStore};
    use chrono::Duration;

    fn test_agent() -> (ChatAgent, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let renewal = RenewalService::new(store.clone(), 3);
        let agent = ChatAgent::new(
            OpenAiClient::new_mock(),
            DocIndex::default(),
            renewal,
            "gpt-4.1-mini".to_string(),
            3,
        );
        (agent, store)
    }

    fn seed_session(store: &MemoryStore) -> (String, SessionUser) {
        let user = SessionUser {
            national_id: "1000000001".to_string(),
            name: "Test User".to_string(),
            phone_number: "+966500000000".to_string(),
            services: vec![ServiceRecord::new(
                ServiceKind::DriverLicense,
                Some(Utc::now() + Duration::days(2)),
            )],
        };
        let id = store.create_session(user.clone());
        (id, user)
    }

    #[tokio::test]
    async fn test_chat_turn_with_mock_client() {
        let (agent, store) = test_agent();
        let (session_id, user) = seed_session(&store);

        let turn = agent
            .handle_chat(&user, &session_id, "hello", &[])
            .await
            .expect("mock chat should succeed");
        assert!(!turn.reply.is_empty());
        assert!(turn.proposed_action.is_none());
    }

    #[tokio::test]
    async fn test_history_survives_across_turns() {
        let (agent, store) = test_agent();
        let (session_id, user) = seed_session(&store);

        agent
            .handle_chat(&user, &session_id, "first", &[])
            .await
            .unwrap();
        agent
            .handle_chat(&user, &session_id, "second", &[])
            .await
            .unwrap();

        let history = agent.histories.get(&session_id).unwrap();
        // Two user turns + two assistant replies.
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_submit_renewal_tool_produces_proposed_action() {
        let (agent, store) = test_agent();
        let (session_id, _) = seed_session(&store);

        let mut proposed = None;
        let result = agent.run_tool(
            &session_id,
            SUBMIT_RENEWAL_TOOL,
            r#"{"service_type": "driver_license", "reason": "Renew the license"}"#,
            &mut proposed,
        );

        assert!(result.contains("\"ok\":true"));
        let action = proposed.expect("tool call should yield a proposed action");
        assert_eq!(action.data.amount, 80.0);
        assert_eq!(action.data.service_type, Some(ServiceKind::DriverLicense));
        assert_eq!(action.description, "Renew the license");
    }

    #[test]
    fn test_unknown_tool_reported_to_model() {
        let (agent, store) = test_agent();
        let (session_id, _) = seed_session(&store);

        let mut proposed = None;
        let result = agent.run_tool(&session_id, "mystery_tool", "{}", &mut proposed);
        assert!(result.contains("Unknown tool"));
        assert!(proposed.is_none());
    }

    #[test]
    fn test_notifications_context_newest_first() {
        let older = Notification {
            id: "a".to_string(),
            user_id: "s".to_string(),
            channel: Channel::Sms,
            message: "older".to_string(),
            created_at: Utc::now() - Duration::hours(2),
            meta: NotificationMeta::default(),
        };
        let newer = Notification {
            id: "b".to_string(),
            user_id: "s".to_string(),
            channel: Channel::InApp,
            message: "newer".to_string(),
            created_at: Utc::now(),
            meta: NotificationMeta::default(),
        };

        let context = build_notifications_context(&[older, newer]);
        let newer_pos = context.find("newer").unwrap();
        let older_pos = context.find("older").unwrap();
        assert!(newer_pos < older_pos);
    }
}
