pub mod prelude;

pub mod idea_sections;
pub mod ideas;
pub mod password_reset_tokens;
pub mod users;
