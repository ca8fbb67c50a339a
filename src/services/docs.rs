// SPDX-License-Identifier: MIT

//! Keyword retrieval over the bundled Absher service documentation.
//!
//! Backs the agent's `search_absher_docs` tool. Token-overlap scoring is
//! deliberately simple; the documentation set is a handful of short
//! sections.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One documentation section.
#[derive(Debug, Clone, Deserialize)]
pub struct DocSection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
}

#[derive(Deserialize)]
struct DocsFile {
    #[serde(default)]
    sections: Vec<DocSection>,
}

/// Searchable index over the documentation sections.
#[derive(Default, Clone)]
pub struct DocIndex {
    sections: Arc<Vec<DocSection>>,
}

impl DocIndex {
    /// Load sections from a JSON file. A missing or unreadable file yields
    /// an empty index: doc search degrades, the server still runs.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let Ok(raw) = fs::read_to_string(path.as_ref()) else {
            tracing::warn!(path = %path.as_ref().display(), "Docs file missing, search disabled");
            return Self::default();
        };
        Self::load_from_json(&raw)
    }

    pub fn load_from_json(raw: &str) -> Self {
        match serde_json::from_str::<DocsFile>(raw) {
            Ok(file) => {
                tracing::info!(count = file.sections.len(), "Loaded documentation sections");
                Self {
                    sections: Arc::new(file.sections),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed docs file, search disabled");
                Self::default()
            }
        }
    }

    /// Top-k sections by query token overlap, formatted for the agent.
    pub fn search(&self, query: &str, k: usize) -> String {
        let query_tokens: Vec<String> = tokenize(query);
        if query_tokens.is_empty() || self.sections.is_empty() {
            return "No relevant information found in the Absher documentation.".to_string();
        }

        let mut scored: Vec<(usize, &DocSection)> = self
            .sections
            .iter()
            .map(|section| {
                let title = section.title.to_lowercase();
                let text = section.text.to_lowercase();
                let score = query_tokens
                    .iter()
                    .map(|t| {
                        // Title hits weigh double.
                        usize::from(text.contains(t.as_str()))
                            + 2 * usize::from(title.contains(t.as_str()))
                    })
                    .sum();
                (score, section)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        if scored.is_empty() {
            return "No relevant information found in the Absher documentation.".to_string();
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(_, s)| format!("{}\n{}", s.title, s.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_string)
        .collect()
}
