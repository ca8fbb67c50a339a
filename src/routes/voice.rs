// SPDX-License-Identifier: MIT

//! Voice glue: speech-to-text and text-to-speech passthrough.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voice/transcribe", post(transcribe))
        .route("/voice/tts", post(text_to_speech))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub struct TranscriptionOut {
    pub text: String,
}

/// Transcribe an uploaded audio blob (webm/ogg/mp3); language auto-detected.
async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionOut>> {
    let mut audio: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("audio") {
            let file_name = field
                .file_name()
                .unwrap_or("recording.webm")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read audio field: {e}")))?;
            audio = Some((file_name, bytes.to_vec()));
        }
    }

    let (file_name, bytes) = audio.ok_or_else(|| {
        AppError::BadRequest("Missing 'audio' field in multipart body".to_string())
    })?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Empty audio file".to_string()));
    }

    let text = state.openai.transcribe(&file_name, bytes).await?;
    Ok(Json(TranscriptionOut { text }))
}

#[derive(Deserialize, Validate)]
pub struct TextToSpeechRequest {
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
}

/// Synthesize speech; returns an MP3 blob.
async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextToSpeechRequest>,
) -> Result<Response> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let audio = state.openai.speech(&payload.text).await?;

    Ok((
        [(header::CONTENT_TYPE, "audio/mpeg")],
        audio,
    )
        .into_response())
}
