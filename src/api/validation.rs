use super::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_IDEA_LENGTH: usize = 10;
pub const MAX_IDEA_LENGTH: usize = 1000;
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 50;

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(ApiError::validation(
            "Name must be at least 2 characters long",
        ));
    }
    Ok(trimmed)
}

/// Same shape the original used: something, an @, something, a dot, something.
pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();

    let valid = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !local.contains(char::is_whitespace)
            && domain.split_once('.').is_some_and(|(host, tld)| {
                !host.is_empty()
                    && !tld.is_empty()
                    && !domain.contains(char::is_whitespace)
                    && !domain.contains('@')
            })
    });

    if !valid {
        return Err(ApiError::validation("Please provide a valid email address"));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must not exceed {MAX_PASSWORD_LENGTH} characters"
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors.join("; ")))
    }
}

pub fn validate_idea_title(title: &str) -> Result<&str, ApiError> {
    let trimmed = title.trim();

    if trimmed.chars().count() < MIN_TITLE_LENGTH {
        return Err(ApiError::validation(format!(
            "Title must be at least {MIN_TITLE_LENGTH} characters long"
        )));
    }

    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::validation(format!(
            "Title must not exceed {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(trimmed)
}

pub fn validate_idea_content(content: &str) -> Result<&str, ApiError> {
    let trimmed = content.trim();

    if trimmed.chars().count() < MIN_IDEA_LENGTH {
        return Err(ApiError::validation(format!(
            "Idea must be at least {MIN_IDEA_LENGTH} characters long"
        )));
    }

    if trimmed.chars().count() > MAX_IDEA_LENGTH {
        return Err(ApiError::validation(format!(
            "Idea must not exceed {MAX_IDEA_LENGTH} characters"
        )));
    }

    Ok(trimmed)
}

/// Clamps a requested page size into the allowed range.
#[must_use]
pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("  padded@example.com  ").is_ok());
        assert!(validate_email("no-at-sign.example.com").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Valid1Password").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("nouppercase1").is_err());
        assert!(validate_password("NOLOWERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
        assert!(validate_password(&format!("A1a{}", "x".repeat(130))).is_err());
    }

    #[test]
    fn test_validate_idea_title() {
        assert!(validate_idea_title("My Idea").is_ok());
        assert!(validate_idea_title("ab").is_err());
        assert!(validate_idea_title(&"t".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_idea_content() {
        assert!(validate_idea_content("A marketplace for vintage synths").is_ok());
        assert!(validate_idea_content("too short").is_err());
        assert!(validate_idea_content(&"x".repeat(1001)).is_err());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(500)), MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Jo").is_ok());
        assert!(validate_name(" J ").is_err());
    }
}
