use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use url::form_urlencoded;

use crate::utils::cookies::{clear_cookie, read_cookie, set_cookie, MESSAGES_COOKIE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(Level::Success),
            "info" => Some(Level::Info),
            "warning" => Some(Level::Warning),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

pub fn encode(messages: &[Message]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for message in messages {
        serializer.append_pair(message.level.as_str(), &message.text);
    }
    serializer.finish()
}

pub fn decode(raw: &str) -> Vec<Message> {
    form_urlencoded::parse(raw.as_bytes())
        .filter_map(|(level, text)| {
            Level::parse(&level).map(|level| Message::new(level, text.into_owned()))
        })
        .collect()
}

#[derive(Serialize)]
struct Page<'a, T: Serialize> {
    page: &'a str,
    messages: &'a [Message],
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Clone, Default)]
pub struct Flash {
    messages: Vec<Message>,
    had_cookie: bool,
}

impl Flash {
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        match read_cookie(headers, MESSAGES_COOKIE) {
            Some(raw) => Self {
                messages: decode(&raw),
                had_cookie: true,
            },
            None => Self::default(),
        }
    }

    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        self.messages.push(Message::new(level, text));
    }

    pub fn with(mut self, level: Level, text: impl Into<String>) -> Self {
        self.push(level, text);
        self
    }

    pub fn render<T: Serialize>(self, status: StatusCode, page: &str, data: T) -> Response {
        let body = Page {
            page,
            messages: &self.messages,
            data,
        };
        let mut response = (status, Json(body)).into_response();
        if self.had_cookie {
            response
                .headers_mut()
                .append(header::SET_COOKIE, clear_cookie(MESSAGES_COOKIE));
        }
        response
    }

    pub fn redirect(self, location: &str) -> Response {
        let target = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
        let mut response = (StatusCode::SEE_OTHER, [(header::LOCATION, target)]).into_response();
        let cookie = if self.messages.is_empty() {
            self.had_cookie.then(|| clear_cookie(MESSAGES_COOKIE))
        } else {
            set_cookie(MESSAGES_COOKIE, &encode(&self.messages), None, false)
        };
        if let Some(cookie) = cookie {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
