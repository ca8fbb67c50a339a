// SPDX-License-Identifier: MIT

//! Notification text composition (proactive SMS + login summaries).
//!
//! Thin prompt layer over the OpenAI client. Callers treat a failure here
//! as non-fatal: the scanner skips that one reminder, the login flow logs
//! and moves on.

use crate::error::AppError;
use crate::models::{ServiceRecord, SessionUser};
use crate::services::expiry::{self, ExpiryStatus};
use crate::services::openai::OpenAiClient;
use chrono::{DateTime, Utc};

/// Fallback SMS when the login-summary reply does not follow the expected
/// two-part format.
const FALLBACK_LOGIN_SMS: &str =
    "Absher Assistant: Login completed. Everything is fine at the moment.";

/// In-app + SMS pair produced after login.
#[derive(Debug, Clone)]
pub struct LoginSummary {
    pub in_app: String,
    pub sms: String,
}

/// Composes user-facing notification text.
#[derive(Clone)]
pub struct MessageComposer {
    openai: OpenAiClient,
    model: String,
}

impl MessageComposer {
    pub fn new(openai: OpenAiClient, model: String) -> Self {
        Self { openai, model }
    }

    /// Short Arabic SMS about an expiring/expired service.
    pub async fn reminder_sms(
        &self,
        user: &SessionUser,
        service: &ServiceRecord,
        expiry: DateTime<Utc>,
        status: ExpiryStatus,
    ) -> Result<String, AppError> {
        let status_line = expiry::describe(&service.service_name, expiry, status);
        let prompt = format!(
            "You are an assistant that writes VERY short SMS messages in Arabic only \
             for Absher platform users. All output must be in Arabic.\n\
             \n\
             Context:\n\
             - User name: {name}\n\
             - Service: {service}\n\
             - Current status: {status_line}\n\
             - Days left until expiry: {days_left}\n\
             \n\
             Requirements for the SMS:\n\
             - Max ~160 characters.\n\
             - Start with \"مساعد أبشر:\".\n\
             - Use polite and clear Arabic.\n\
             - Mention the service and expiry status.\n\
             - Invite the user to log in or reply to renew.\n\
             - Do NOT include any links.\n\
             - Return ONLY the SMS text, no explanations.",
            name = user.name,
            service = service.service_name,
            days_left = status.days_left(),
        );

        self.openai.complete_text(&self.model, &prompt).await
    }

    /// In-app + SMS login summary of the user's service status.
    pub async fn login_summary(
        &self,
        user: &SessionUser,
        threshold_days: i64,
    ) -> Result<LoginSummary, AppError> {
        let services_status = services_status_block(user, Utc::now(), threshold_days);
        let prompt = format!(
            "You are an assistant that summarizes a user's Absher services status.\n\
             \n\
             User:\n\
             - Name: {name}\n\
             \n\
             Current services status:\n\
             {services_status}\n\
             \n\
             You must speak in Arabic.\n\
             \n\
             You must produce two messages:\n\
             \n\
             1) IN_APP message:\n\
             - Slightly more detailed and friendly.\n\
             - Can be 2-4 short sentences.\n\
             - Mention if there are any services expiring soon or expired.\n\
             - If everything is fine, reassure the user.\n\
             \n\
             2) SMS message:\n\
             - Very short (~160 characters).\n\
             - Brief summary of whether everything is OK or which service is expiring soon.\n\
             - Invite user to renew if needed.\n\
             \n\
             Return your answer in the following format exactly:\n\
             \n\
             IN_APP:\n\
             <in-app message here>\n\
             \n\
             SMS:\n\
             <sms message here>",
            name = user.name,
        );

        let text = self.openai.complete_text(&self.model, &prompt).await?;
        Ok(parse_login_summary(&text))
    }
}

/// One status line per tracked service, for prompt context.
pub fn services_status_block(
    user: &SessionUser,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> String {
    let lines: Vec<String> = user
        .tracked_services()
        .filter_map(|service| {
            let expiry = service.expiry_date?;
            let status = expiry::classify(expiry, now, threshold_days);
            Some(format!(
                "- {}",
                expiry::describe(&service.service_name, expiry, status)
            ))
        })
        .collect();

    if lines.is_empty() {
        "User has no registered services.".to_string()
    } else {
        lines.join("\n")
    }
}

/// Split the two-part reply; if the markers are missing, the whole text
/// becomes the in-app message and the SMS falls back to a canned line.
fn parse_login_summary(text: &str) -> LoginSummary {
    if let Some(rest) = text.split("IN_APP:").nth(1) {
        if let Some((in_app, sms)) = rest.split_once("SMS:") {
            return LoginSummary {
                in_app: in_app.trim().to_string(),
                sms: sms.trim().to_string(),
            };
        }
    }

    LoginSummary {
        in_app: text.trim().to_string(),
        sms: FALLBACK_LOGIN_SMS.to_string(),
    }
}
