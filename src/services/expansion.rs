//! Orchestrates a single idea expansion: build the fixed two-message prompt,
//! call the completion service once, extract sections, pick follow-up
//! prompts, and persist everything atomically.
//!
//! There is no retry. A failed call leaves the idea in its prior state.

use std::sync::Arc;
use thiserror::Error;

use crate::clients::{Completion, CompletionClient, CompletionError, Usage};
use crate::db::Store;
use crate::domain::IdeaId;
use crate::models::Idea;
use crate::parser::extract_sections;
use crate::services::followup::generate_follow_ups;

/// Fixed system instruction enumerating the six required headers.
const SYSTEM_PROMPT: &str = "You are an expert product strategist and business analyst. Your role is to help expand and analyze business ideas comprehensively.

When given an idea, you will provide a structured analysis with the following sections:

## Problem Statement
Clearly define the problem this idea solves. Identify pain points and market gaps.

## Target Users
Describe the ideal users/customers. Include demographics, behaviors, and needs.

## Core Features
List the essential features and functionalities. Prioritize MVP features.

## User Workflow
Outline how users will interact with the product/service. Describe the user journey.

## Risks & Challenges
Identify potential obstacles, technical challenges, and market risks.

## Success Metrics
Define KPIs and metrics to measure success. Include both quantitative and qualitative metrics.

Use markdown formatting with bullet points, headers, and clear structure. Be specific and actionable.";

/// System message for free-form follow-up prompts.
const FOLLOW_UP_SYSTEM_PROMPT: &str =
    "You are an expert business analyst and product strategist.";

fn build_user_prompt(raw_idea: &str) -> String {
    format!(
        "Please expand and analyze the following idea in detail:\n\n\
         \"{}\"\n\n\
         Provide a comprehensive analysis using the structured format with all six sections.",
        raw_idea.trim()
    )
}

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("Idea not found: {0}")]
    NotFound(IdeaId),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ExpansionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Expansion result: the refreshed idea plus the service's token accounting.
#[derive(Debug, Clone)]
pub struct ExpandedIdea {
    pub idea: Idea,
    pub usage: Option<Usage>,
}

pub struct ExpansionService {
    store: Store,
    client: Arc<CompletionClient>,
}

impl ExpansionService {
    #[must_use]
    pub const fn new(store: Store, client: Arc<CompletionClient>) -> Self {
        Self { store, client }
    }

    /// Expands an idea owned by `user_id`. Re-expanding an already expanded
    /// idea replaces the prior content and section rows.
    pub async fn expand_idea(
        &self,
        id: IdeaId,
        user_id: i32,
    ) -> Result<ExpandedIdea, ExpansionError> {
        let idea = self
            .store
            .get_idea(id.value(), user_id)
            .await?
            .ok_or(ExpansionError::NotFound(id))?;

        // The single external call. Any failure propagates from here with
        // the idea row untouched.
        let completion = self
            .client
            .chat(SYSTEM_PROMPT, &build_user_prompt(&idea.raw_idea))
            .await?;

        let sections = extract_sections(&completion.content);
        if sections.is_empty() {
            tracing::warn!(
                idea_id = id.value(),
                "Generated text contained no recognizable section headers"
            );
        }

        let prompts = generate_follow_ups(&idea.raw_idea, &sections);

        let updated = self
            .store
            .save_idea_expansion(id.value(), user_id, &completion.content, &sections, &prompts)
            .await?
            .ok_or(ExpansionError::NotFound(id))?;

        if let Some(usage) = &completion.usage {
            tracing::info!(
                idea_id = id.value(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Idea expanded"
            );
        } else {
            tracing::info!(idea_id = id.value(), "Idea expanded");
        }

        Ok(ExpandedIdea {
            idea: updated,
            usage: completion.usage,
        })
    }

    /// Runs a free-form follow-up prompt through the completion service.
    pub async fn expand_prompt(&self, prompt: &str) -> Result<Completion, ExpansionError> {
        Ok(self.client.chat(FOLLOW_UP_SYSTEM_PROMPT, prompt).await?)
    }

    /// One-token connectivity probe.
    pub async fn test_connection(&self) -> Result<(), CompletionError> {
        self.client.test_connection().await
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }
}
