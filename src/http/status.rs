//! HTTP status code table
//!
//! The recognized status set (RFC 2616) and its reason phrases. Any code
//! outside this table is treated as a server error when a response is
//! serialized.

/// Status used when a response carries an unrecognized code
pub const FALLBACK_STATUS: u16 = 500;

/// Get the reason phrase for a recognized status code
///
/// # Examples
/// ```
/// use mnml::http::status::reason_phrase;
/// assert_eq!(reason_phrase(404), Some("Not Found"));
/// assert_eq!(reason_phrase(418), None);
/// ```
pub const fn reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        // Informational
        100 => "Continue",
        101 => "Switching Protocols",

        // Success
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",

        // Redirection
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",

        // Client errors
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Time-out",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Large",
        415 => "Unsupported Media Type",
        416 => "Requested range not satisfiable",
        417 => "Expectation Failed",

        // Server errors
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Time-out",
        505 => "HTTP Version not supported",

        _ => return None,
    };
    Some(phrase)
}

/// Check whether a status code belongs to the recognized set
pub const fn is_recognized(code: u16) -> bool {
    reason_phrase(code).is_some()
}

/// Resolve the status that will actually be sent on the wire
pub const fn effective_status(code: u16) -> u16 {
    if is_recognized(code) {
        code
    } else {
        FALLBACK_STATUS
    }
}

/// Format the `<code> <reason phrase>` status line, coercing unknown codes
pub fn status_line(code: u16) -> String {
    let code = effective_status(code);
    let phrase = reason_phrase(code).unwrap_or("Internal Server Error");
    format!("{code} {phrase}")
}
