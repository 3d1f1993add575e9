//! Glue between module-level errors and [`AppError`].

use innkeep_shared::AppError;

/// Maps a module error's HTTP status onto the shared taxonomy.
pub(crate) fn classify(status: u16, message: String) -> AppError {
    match status {
        400 => AppError::Validation(message),
        401 => AppError::Unauthorized(message),
        403 => AppError::Forbidden(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(matches!(classify(400, String::new()), AppError::Validation(_)));
        assert!(matches!(classify(403, String::new()), AppError::Forbidden(_)));
        assert!(matches!(classify(404, String::new()), AppError::NotFound(_)));
        assert!(matches!(classify(409, String::new()), AppError::Conflict(_)));
        assert!(matches!(classify(500, String::new()), AppError::Internal(_)));
    }
}
