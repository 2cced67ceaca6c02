//! Session cookies

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::refresh::TokenPair;

/// Tokens carried by the browser session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Names and attributes of the session cookies
#[derive(Debug, Clone)]
pub struct SessionCookies {
    access_name: Arc<str>,
    refresh_name: Arc<str>,
    secure: bool,
}

impl SessionCookies {
    pub fn new(access_name: &str, refresh_name: &str, secure: bool) -> Self {
        Self {
            access_name: Arc::from(access_name),
            refresh_name: Arc::from(refresh_name),
            secure,
        }
    }

    pub fn access_name(&self) -> &str {
        &self.access_name
    }

    /// Read session tokens; empty cookie values count as absent
    pub fn read(&self, jar: &CookieJar) -> SessionTokens {
        let value = |name: &str| {
            jar.get(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };

        SessionTokens {
            access_token: value(&self.access_name),
            refresh_token: value(&self.refresh_name),
        }
    }

    /// Store refreshed tokens, keeping the refresh cookie when it was not rotated
    pub fn store(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        let jar = jar.add(self.cookie(&self.access_name, tokens.access_token.clone()));
        match &tokens.refresh_token {
            Some(refresh) => jar.add(self.cookie(&self.refresh_name, refresh.clone())),
            None => jar,
        }
    }

    /// Drop both session cookies
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.cookie(&self.access_name, String::new()))
            .remove(self.cookie(&self.refresh_name, String::new()))
    }

    fn cookie(&self, name: &str, value: String) -> Cookie<'static> {
        Cookie::build((name.to_string(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}
