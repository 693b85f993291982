use axum::http::{header, HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "sessionid";
pub const MESSAGES_COOKIE: &str = "messages";

pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn set_cookie(name: &str, value: &str, max_age_secs: Option<i64>, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

pub fn clear_cookie(name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name))
        .unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sessionid=abc123; messages=info=hi"),
        );
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, MESSAGES_COOKIE).as_deref(), Some("info=hi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
