pub use super::idea_sections::Entity as IdeaSections;
pub use super::ideas::Entity as Ideas;
pub use super::password_reset_tokens::Entity as PasswordResetTokens;
pub use super::users::Entity as Users;
