pub mod idea;

pub use idea::{FollowUpPrompt, Idea, IdeaSection, IdeaStats};
