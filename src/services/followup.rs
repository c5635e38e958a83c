//! Catalog of follow-up exploration prompts surfaced after an expansion.
//!
//! Generation is a pure function of the raw idea text and the parsed
//! sections: some templates only make sense once a matching section came
//! back non-empty.

use crate::domain::SectionType;
use crate::models::FollowUpPrompt;
use crate::parser::ParsedSections;

struct Template {
    category: &'static str,
    title: &'static str,
    icon: &'static str,
    color: &'static str,
    /// Section that must be non-empty for this template to be offered.
    requires: Option<SectionType>,
    prompt: &'static str,
}

/// Catalog order is presentation order.
const CATALOG: &[Template] = &[
    Template {
        category: "technical",
        title: "Technical Architecture",
        icon: "🏗️",
        color: "indigo",
        requires: Some(SectionType::Features),
        prompt: "Design a technical architecture for the following idea: \"{idea}\". \
                 Recommend a technology stack, outline the data model, and describe how the \
                 core features would be implemented and integrated.",
    },
    Template {
        category: "market",
        title: "Competitive Analysis",
        icon: "📈",
        color: "sky",
        requires: Some(SectionType::Users),
        prompt: "Perform a competitive and market analysis for the following idea: \"{idea}\". \
                 Identify existing competitors, market size, differentiation opportunities, and \
                 positioning for the target users.",
    },
    Template {
        category: "gtm",
        title: "Go-to-Market Strategy",
        icon: "🚀",
        color: "emerald",
        requires: None,
        prompt: "Create a go-to-market strategy for the following idea: \"{idea}\". \
                 Cover launch channels, early-adopter acquisition, messaging, and a 90-day plan.",
    },
    Template {
        category: "monetization",
        title: "Monetization Models",
        icon: "💰",
        color: "amber",
        requires: None,
        prompt: "Propose monetization models for the following idea: \"{idea}\". \
                 Compare pricing strategies, revenue streams, and which model fits best at each \
                 stage of growth.",
    },
    Template {
        category: "ux",
        title: "UX Design Directions",
        icon: "🎨",
        color: "rose",
        requires: Some(SectionType::Workflow),
        prompt: "Suggest UX design directions for the following idea: \"{idea}\". \
                 Walk through the key screens and interactions of the user workflow and call out \
                 usability risks.",
    },
    Template {
        category: "legal",
        title: "Legal & Compliance",
        icon: "⚖️",
        color: "slate",
        requires: None,
        prompt: "Outline the legal and compliance considerations for the following idea: \
                 \"{idea}\". Include data protection, terms of service, licensing, and any \
                 regulated-industry concerns.",
    },
];

/// Returns the applicable follow-up prompts in catalog order.
#[must_use]
pub fn generate_follow_ups(raw_idea: &str, sections: &ParsedSections) -> Vec<FollowUpPrompt> {
    CATALOG
        .iter()
        .filter(|t| t.requires.is_none_or(|section| sections.has(section)))
        .map(|t| FollowUpPrompt {
            category: t.category.to_string(),
            title: t.title.to_string(),
            icon: t.icon.to_string(),
            color: t.color.to_string(),
            prompt: t.prompt.replace("{idea}", raw_idea.trim()),
        })
        .collect()
}
