//! Mapping from transport status codes to business error categories.

/// Business error category for an HTTP status code.
///
/// Successful statuses map to `"none"`.
pub fn error_category(status: u16) -> &'static str {
    match status {
        100..=399 => "none",
        400 | 422 => "validation_error",
        404 => "recipe_not_found",
        408 | 504 => "timeout",
        503 => "service_unavailable",
        500 => "internal_error",
        _ => "unknown_error",
    }
}
