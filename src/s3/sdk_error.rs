// Classifies SDK failures into retryable and fatal errors
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use aws_sdk_s3::error::{
    DisplayErrorContext,
    ProvideErrorMetadata,
    SdkError,
};
use crate::common::Error;
use std::fmt;
use tracing::debug;

// Error codes meaning our identity can't be used, retrying won't help.
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "AllAccessDisabled",
    "ExpiredToken",
    "InvalidAccessKeyId",
    "InvalidToken",
    "SignatureDoesNotMatch",
];

// Error codes that go away on their own given time.
const THROTTLE_CODES: &[&str] = &[
    "InternalError",
    "RequestLimitExceeded",
    "RequestTimeout",
    "ServiceUnavailable",
    "SlowDown",
    "Throttling",
    "ThrottlingException",
];

/// Convert an `SdkError` from `operation` into an `Error`.
///
/// `bucket` is the bucket the operation targeted, if any, and is named in
/// the message. A bucket vanishing mid scan is a provider failure,
/// `Error::BucketNotFound` is kept for registry lookups.
pub fn classify<E, R>(
    operation: &'static str,
    bucket:    Option<&str>,
    error:     SdkError<E, R>,
) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: fmt::Debug,
{
    let cause   = DisplayErrorContext(&error).to_string();
    let message = match bucket {
        Some(bucket) => format!("bucket '{bucket}': {cause}"),
        None         => cause,
    };

    debug!("classify: {} failed: {}", operation, message);

    match &error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            Error::Network { operation, message }
        },
        _ => {
            let code = error.as_service_error().and_then(|e| e.code());

            from_code(operation, code, message)
        },
    }
}

/// Map a provider error `code` onto an `Error`.
pub fn from_code(
    operation: &'static str,
    code:      Option<&str>,
    message:   String,
) -> Error {
    match code {
        Some(code) if AUTH_CODES.contains(&code) => {
            Error::Auth { operation, message }
        },
        Some(code) if THROTTLE_CODES.contains(&code) => {
            Error::Throttled { operation, message }
        },
        _ => Error::Provider { operation, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_code() {
        let tests = vec![
            (Some("AccessDenied"),          "auth"),
            (Some("InvalidAccessKeyId"),    "auth"),
            (Some("SignatureDoesNotMatch"), "auth"),
            (Some("SlowDown"),              "throttled"),
            (Some("ServiceUnavailable"),    "throttled"),
            (Some("InternalError"),         "throttled"),
            (Some("NoSuchBucket"),          "provider"),
            (Some("MalformedXML"),          "provider"),
            (None,                          "provider"),
        ];

        for test in tests {
            let code     = test.0;
            let expected = test.1;

            let ret = from_code("ListObjectsV2", code, "cause".into());

            let class = match ret {
                Error::Auth { .. }         => "auth",
                Error::Throttled { .. }    => "throttled",
                Error::Provider { .. }     => "provider",
                _                          => "other",
            };

            assert_eq!(class, expected, "{code:?}");
        }
    }

    #[test]
    fn test_from_code_no_such_bucket_is_provider_failure() {
        let ret = from_code(
            "ListObjectsV2",
            Some("NoSuchBucket"),
            "bucket 'logs': NoSuchBucket".into(),
        );

        assert!(matches!(ret, Error::Provider { operation: "ListObjectsV2", .. }));
        assert_eq!(ret.exit_code(), 1);
    }

    #[test]
    fn test_from_code_keeps_cause() {
        let ret = from_code(
            "ListBuckets",
            Some("AccessDenied"),
            "AccessDenied: Access Denied".into(),
        );

        assert_eq!(
            ret.to_string(),
            "ListBuckets failed, access denied: AccessDenied: Access Denied",
        );
        assert!(!ret.is_retryable());
    }
}
