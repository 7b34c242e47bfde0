use std::collections::HashMap;

/// Description for a standard HTTP status code, or `None` if it is not in
/// the built-in table.
fn builtin_status_message(status: u16) -> Option<&'static str> {
    let message = match status {
        200 => "OK - Request completed successfully",
        201 => "Created - Resource created successfully",
        202 => "Accepted - Request has been accepted",
        304 => "Not Modified - Resource has not changed",
        400 => "Bad Request - Invalid request body or parameters",
        401 => "Unauthorized - Credentials missing or invalid",
        403 => "Forbidden - Insufficient permissions",
        404 => "Not Found - Requested resource does not exist",
        405 => "Method Not Allowed - Unsupported HTTP method for resource",
        406 => "Not Acceptable - Requested media type cannot be served",
        409 => "Conflict - Document update conflict",
        412 => "Precondition Failed - Resource already exists or revision mismatch",
        415 => "Unsupported Media Type - Bad content type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        500 => "Internal Server Error - The request was invalid or the server crashed",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable - Server is overloaded or down for maintenance",
        _ => return None,
    };
    Some(message)
}

/// Resolve a status code to a human-readable message.
///
/// Per-call overrides win over the built-in table; codes absent from both
/// resolve to the literal `"unknown status"`. Diagnostic only, never used
/// for control flow.
pub fn resolve_status_message(status: u16, overrides: &HashMap<u16, String>) -> String {
    if let Some(message) = overrides.get(&status) {
        return message.clone();
    }
    match builtin_status_message(status) {
        Some(message) => message.to_string(),
        None => "unknown status".to_string(),
    }
}
