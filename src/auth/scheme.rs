//! Authorization header rendering.
//!
//! The stored login token is attached to outgoing requests either verbatim or
//! as an RFC 6750 `Bearer` credential, depending on [`TokenScheme`].

use crate::config::TokenScheme;

/// Name of the header the token is attached under.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Formats a token into an `Authorization` header value.
///
/// # Examples
///
/// ```
/// use rest_case_runner::auth::scheme::authorization_value;
/// use rest_case_runner::config::TokenScheme;
///
/// assert_eq!(authorization_value(TokenScheme::Raw, "abc123"), "abc123");
/// assert_eq!(authorization_value(TokenScheme::Bearer, "abc123"), "Bearer abc123");
/// ```
pub fn authorization_value(scheme: TokenScheme, token: &str) -> String {
    match scheme {
        TokenScheme::Raw => token.to_string(),
        TokenScheme::Bearer => format!("Bearer {}", token),
    }
}

/// Masks a token for logging, keeping at most the first four characters.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
