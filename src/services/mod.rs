pub mod auth_service;
pub use auth_service::{AuthError, AuthService, IssuedResetToken};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod idea_service;
pub use idea_service::{IdeaError, IdeaPage, IdeaService};

pub mod idea_service_impl;
pub use idea_service_impl::SeaOrmIdeaService;

pub mod expansion;
pub use expansion::{ExpandedIdea, ExpansionError, ExpansionService};

pub mod followup;
pub use followup::generate_follow_ups;
