use std::sync::{Arc, Mutex};

use clip_helix::{AccessToken, AuthError, Credentials, TokenIssuer};

#[derive(Clone)]
pub struct MockTokenIssuer {
    pub token: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockTokenIssuer {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            token: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl TokenIssuer for MockTokenIssuer {
    async fn access_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        self.calls
            .lock()
            .unwrap()
            .push(credentials.client_id.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(AuthError::Status {
                status: 401,
                body: msg.clone(),
            });
        }
        Ok(AccessToken::new(self.token.clone()))
    }
}
