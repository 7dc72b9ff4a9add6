//! Bearer credential handling.

use std::fmt;

use http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::{client::IntoClientRequest, handshake::client::Request};
use url::Url;

use crate::error::Error;

/// An opaque, pre-issued bearer credential.
///
/// The token is never inspected beyond checking that it can travel in a
/// header; issuing and validating it is the server side's business. `Debug`
/// prints the length only, so the value cannot leak through logs or error
/// chains.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    ///
    /// Rejects the empty string and values that cannot appear in an HTTP
    /// header.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }
        if HeaderValue::from_str(&token).is_err() {
            return Err(Error::InvalidToken);
        }
        Ok(BearerToken(token))
    }

    pub(crate) fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken").field("len", &self.0.len()).finish()
    }
}

/// How the credential rides the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenDelivery {
    /// `authorization: Bearer <token>` request header.
    #[default]
    Header,
    /// `access_token=<token>` appended to the URL query.
    Query,
}

/// Builds the client handshake request with the credential attached.
///
/// Exactly one delivery mechanism is used: `Header` leaves the URL alone,
/// `Query` never touches the headers.
pub(crate) fn authorize(
    url: &Url,
    token: &BearerToken,
    delivery: TokenDelivery,
) -> Result<Request, Error> {
    match delivery {
        TokenDelivery::Header => {
            let mut request = url.as_str().into_client_request()?;
            let value = HeaderValue::from_str(&format!("Bearer {}", token.reveal()))
                .map_err(|_| Error::InvalidToken)?;
            request.headers_mut().insert(AUTHORIZATION, value);
            Ok(request)
        }
        TokenDelivery::Query => {
            let mut url = url.clone();
            url.query_pairs_mut().append_pair("access_token", token.reveal());
            Ok(url.as_str().into_client_request()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(BearerToken::new(""), Err(Error::EmptyToken)));
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(matches!(BearerToken::new("abc\r\ndef"), Err(Error::InvalidToken)));
    }

    #[test]
    fn debug_shows_the_length_and_not_the_value() {
        let token = BearerToken::new("super-secret-value").expect("valid token");
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("18"));
    }

    #[test]
    fn header_delivery_sets_authorization_and_leaves_the_url_alone() {
        let url = Url::parse("ws://example.com/rtc").expect("valid url");
        let token = BearerToken::new("tok").expect("valid token");
        let request = authorize(&url, &token, TokenDelivery::Header).expect("authorized request");
        let auth = request.headers().get(AUTHORIZATION).expect("authorization header");
        assert_eq!(auth.to_str().expect("header value"), "Bearer tok");
        assert_eq!(request.uri().path_and_query().map(|pq| pq.as_str()), Some("/rtc"));
    }

    #[test]
    fn query_delivery_appends_the_token_and_skips_the_header() {
        let url = Url::parse("ws://example.com/rtc").expect("valid url");
        let token = BearerToken::new("tok").expect("valid token");
        let request = authorize(&url, &token, TokenDelivery::Query).expect("authorized request");
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            request.uri().path_and_query().map(|pq| pq.as_str()),
            Some("/rtc?access_token=tok")
        );
    }

    #[test]
    fn query_delivery_keeps_existing_parameters() {
        let url = Url::parse("ws://example.com/rtc?auto_subscribe=1").expect("valid url");
        let token = BearerToken::new("tok").expect("valid token");
        let request = authorize(&url, &token, TokenDelivery::Query).expect("authorized request");
        assert_eq!(
            request.uri().path_and_query().map(|pq| pq.as_str()),
            Some("/rtc?auto_subscribe=1&access_token=tok")
        );
    }
}
