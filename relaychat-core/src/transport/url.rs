use crate::error::{ChatError, ChatResult};

/// Turns the configured server URL into the websocket endpoint.
///
/// `http://host:5000` + `/socket.io` becomes
/// `ws://host:5000/socket.io/?EIO=4&transport=websocket`. The server URL
/// must not carry a path of its own; namespaces go in `server.namespace`.
pub fn endpoint_url(server_url: &str, path: &str) -> ChatResult<String> {
    let invalid = |message: &str| ChatError::InvalidUrl {
        url: server_url.to_string(),
        message: message.to_string(),
    };

    let trimmed = server_url.trim();
    let (scheme, rest) = trimmed
        .split_once("://")
        .ok_or_else(|| invalid("missing scheme"))?;

    let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("scheme must be http, https, ws or wss")),
    };

    if rest.contains('?') || rest.contains('#') {
        return Err(invalid("query strings and fragments are not supported"));
    }

    let (authority, extra_path) = match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash..]),
        None => (rest, ""),
    };

    if authority.is_empty() {
        return Err(invalid("missing host"));
    }

    if !extra_path.trim_end_matches('/').is_empty() {
        return Err(invalid(
            "URL must not contain a path; set server.namespace instead",
        ));
    }

    let path = path.trim_end_matches('/');
    Ok(format!(
        "{}://{}{}/?EIO=4&transport=websocket",
        ws_scheme, authority, path
    ))
}
