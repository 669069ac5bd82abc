//! Interactive login by pasting browser cookies.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use colored::Colorize;

use lcmirror_core::{SessionState, CSRF_COOKIE, SESSION_COOKIE};
use lcmirror_remote::{AuthError, InteractiveLogin};

/// Asks the user for the `LEETCODE_SESSION` and `csrftoken` cookies of a
/// logged-in browser session.
pub struct CookiePrompt {
    base_url: String,
}

impl CookiePrompt {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl InteractiveLogin for CookiePrompt {
    fn perform_interactive_login(&self) -> Result<SessionState, AuthError> {
        println!(
            "{} Log in at {}/accounts/login/ in your browser, then copy these cookies from its developer tools.",
            "→".cyan().bold(),
            self.base_url
        );
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let session = ask(&mut input, SESSION_COOKIE)?;
        let csrf = ask(&mut input, CSRF_COOKIE)?;

        let mut cookies = BTreeMap::new();
        cookies.insert(SESSION_COOKIE.to_string(), session);
        cookies.insert(CSRF_COOKIE.to_string(), csrf);
        Ok(SessionState::new(cookies))
    }
}

fn ask(input: &mut impl BufRead, name: &str) -> Result<String, AuthError> {
    print!("  {name}: ");
    io::stdout()
        .flush()
        .map_err(|e| AuthError::LoginFailed(e.to_string()))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| AuthError::LoginFailed(e.to_string()))?;
    let value = line.trim().trim_matches('"').to_string();
    if value.is_empty() {
        return Err(AuthError::LoginFailed(format!("no value entered for {name}")));
    }
    Ok(value)
}
