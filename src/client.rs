// src/client.rs

//! Typed HTTP client for the quiz and admin API.
//!
//! Admin calls take the `AdminCredential` returned by [`QuizClient::login`]
//! as an explicit argument; the client itself holds no session state.

use std::fmt;

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    finance::{EmiBreakdown, SipProjection, SwpSummary},
    handlers::{
        admin::{
            CreatedQuizResponse, MessageResponse, QuizListResponse, QuizResponse,
            ToggledQuizResponse,
        },
        calculator::{EmiParams, SipParams, SwpParams},
        quiz::ActiveQuizzesResponse,
    },
    models::{
        admin::{LoginRequest, LoginResponse},
        quiz_set::{QuizSet, QuizSetRequest, QuizSummary, StepView},
    },
};

/// Credential issued by a successful admin login.
#[derive(Clone)]
pub struct AdminCredential {
    token: String,
    username: String,
}

impl AdminCredential {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

// Keep the token out of logs.
impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ClientError {
    /// Transport or decoding failure.
    Http(reqwest::Error),
    /// The base URL cannot carry API paths.
    InvalidUrl(url::ParseError),
    /// The server answered with a non-success status.
    Api { status: StatusCode, message: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "request failed: {}", e),
            ClientError::InvalidUrl(e) => write!(f, "invalid base url: {}", e),
            ClientError::Api { status, message } => write!(f, "{}: {}", status, message),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err)
    }
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::InvalidUrl(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => Some(message),
            ClientError::Http(_) | ClientError::InvalidUrl(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
    };
    Err(ClientError::Api { status, message })
}

#[derive(Debug, Clone)]
pub struct QuizClient {
    base_url: String,
    http: reqwest::Client,
}

impl QuizClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// `/api/{segments..}` under the base URL, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut full = Url::parse(&self.base_url)?;
        full.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(full)
    }

    fn authed(&self, builder: RequestBuilder, credential: &AdminCredential) -> RequestBuilder {
        builder.bearer_auth(credential.token())
    }

    pub async fn fetch_step(&self, step_id: &str) -> Result<StepView, ClientError> {
        let response = self.http.get(self.url(&["quiz", step_id])?).send().await?;
        read(response).await
    }

    pub async fn list_active(&self) -> Result<Vec<QuizSummary>, ClientError> {
        let response = self.http.get(self.url(&["quiz"])?).send().await?;
        Ok(read::<ActiveQuizzesResponse>(response).await?.quizzes)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AdminCredential, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url(&["admin", "login"])?).json(&body).send().await?;
        let login: LoginResponse = read(response).await?;
        Ok(AdminCredential::new(login.token, login.username))
    }

    pub async fn list_quizzes(&self, credential: &AdminCredential) -> Result<Vec<QuizSet>, ClientError> {
        let request = self.authed(self.http.get(self.url(&["admin", "quiz"])?), credential);
        Ok(read::<QuizListResponse>(request.send().await?).await?.quizzes)
    }

    pub async fn get_quiz(&self, credential: &AdminCredential, id: i64) -> Result<QuizSet, ClientError> {
        let request = self.authed(self.http.get(self.url(&["admin", "quiz", id.to_string().as_str()])?), credential);
        Ok(read::<QuizResponse>(request.send().await?).await?.quiz)
    }

    pub async fn create_quiz(
        &self,
        credential: &AdminCredential,
        quiz: &QuizSetRequest,
    ) -> Result<CreatedQuizResponse, ClientError> {
        let request = self.authed(self.http.post(self.url(&["admin", "quiz"])?), credential);
        read(request.json(quiz).send().await?).await
    }

    pub async fn update_quiz(
        &self,
        credential: &AdminCredential,
        id: i64,
        quiz: &QuizSetRequest,
    ) -> Result<(), ClientError> {
        let request = self.authed(self.http.put(self.url(&["admin", "quiz", id.to_string().as_str()])?), credential);
        read::<MessageResponse>(request.json(quiz).send().await?).await?;
        Ok(())
    }

    pub async fn delete_quiz(&self, credential: &AdminCredential, id: i64) -> Result<(), ClientError> {
        let request = self.authed(self.http.delete(self.url(&["admin", "quiz", id.to_string().as_str()])?), credential);
        read::<MessageResponse>(request.send().await?).await?;
        Ok(())
    }

    /// Flips the publish flag and returns the new state.
    pub async fn toggle_quiz(&self, credential: &AdminCredential, id: i64) -> Result<bool, ClientError> {
        let request = self.authed(
            self.http.patch(self.url(&["admin", "quiz", id.to_string().as_str(), "toggle"])?),
            credential,
        );
        Ok(read::<ToggledQuizResponse>(request.send().await?).await?.is_active)
    }

    pub async fn emi(&self, params: &EmiParams) -> Result<EmiBreakdown, ClientError> {
        let response = self.http.get(self.url(&["calc", "emi"])?).query(params).send().await?;
        read(response).await
    }

    pub async fn sip(&self, params: &SipParams) -> Result<SipProjection, ClientError> {
        let response = self.http.get(self.url(&["calc", "sip"])?).query(params).send().await?;
        read(response).await
    }

    pub async fn swp(&self, params: &SwpParams) -> Result<SwpSummary, ClientError> {
        let response = self.http.get(self.url(&["calc", "swp"])?).query(params).send().await?;
        read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let credential = AdminCredential::new("secret.jwt.value", "admin");
        let printed = format!("{:?}", credential);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("secret.jwt.value"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = QuizClient::new("http://localhost:3000/");
        assert_eq!(
            client.url(&["quiz"]).unwrap().as_str(),
            "http://localhost:3000/api/quiz"
        );
    }

    #[test]
    fn step_ids_are_percent_encoded() {
        let client = QuizClient::new("http://localhost:3000");
        let url = client.url(&["quiz", "q1_emi/../admin?x=1#y"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/quiz/q1_emi%2F..%2Fadmin%3Fx=1%23y"
        );
        assert_eq!(url.path_segments().map(|s| s.count()), Some(3));
    }

    #[test]
    fn unusable_base_url_is_an_error() {
        let client = QuizClient::new("not a url");
        assert!(matches!(client.url(&["quiz"]), Err(ClientError::InvalidUrl(_))));
    }
}
