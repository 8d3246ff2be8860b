//! Bearer token extraction from HTTP requests.

use http::header::AUTHORIZATION;
use http::Request;
use url::form_urlencoded;

/// Query parameter carrying a token when no `Authorization` header is sent.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Extracts the bearer token from a request.
///
/// Looks at `Authorization: Bearer <token>` first (the scheme is matched
/// case-insensitively), then at the `access_token` query parameter. Empty
/// values yield `None`. Query values are form-decoded.
///
/// ```
/// use http::Request;
/// use warden_oauth2::token_from_request;
///
/// let req = Request::get("/articles")
///     .header("Authorization", "bearer abc.def")
///     .body(())
///     .unwrap();
/// assert_eq!(token_from_request(&req).as_deref(), Some("abc.def"));
///
/// let req = Request::get("/articles?access_token=abc.def").body(()).unwrap();
/// assert_eq!(token_from_request(&req).as_deref(), Some("abc.def"));
/// ```
pub fn token_from_request<B>(request: &Request<B>) -> Option<String> {
    from_header(request).or_else(|| from_query(request))
}

fn from_header<B>(request: &Request<B>) -> Option<String> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn from_query<B>(request: &Request<B>) -> Option<String> {
    let query = request.uri().query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ACCESS_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> http::request::Builder {
        Request::get(uri)
    }

    #[test]
    fn test_header_wins_over_query() {
        let req = get("/?access_token=from-query")
            .header(AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap();
        assert_eq!(token_from_request(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_scheme_case_insensitive() {
        let req = get("/").header(AUTHORIZATION, "BEARER t").body(()).unwrap();
        assert_eq!(token_from_request(&req).as_deref(), Some("t"));
    }

    #[test]
    fn test_other_scheme_falls_back_to_query() {
        let req = get("/?a=1&access_token=q")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        assert_eq!(token_from_request(&req).as_deref(), Some("q"));
    }

    #[test]
    fn test_query_value_is_decoded() {
        let req = get("/?access_token=abc%2Edef%3D%3D").body(()).unwrap();
        assert_eq!(token_from_request(&req).as_deref(), Some("abc.def=="));
    }

    #[test]
    fn test_empty_values() {
        let req = get("/?access_token=")
            .header(AUTHORIZATION, "Bearer ")
            .body(())
            .unwrap();
        assert_eq!(token_from_request(&req), None);
    }

    #[test]
    fn test_no_token() {
        let req = get("/articles").body(()).unwrap();
        assert_eq!(token_from_request(&req), None);
    }
}
