//! S3 event notification parsing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

/// Prefix shared by every object-created event name (`ObjectCreated:Put`, ...).
const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

/// A new object landed in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreated {
    /// Bucket the object was written to.
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
}

impl ObjectCreated {
    /// Create an event.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Notification parsing errors.
#[derive(Debug, Error)]
pub enum EventError {
    /// Body is not an S3 event notification.
    #[error("malformed event notification: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    event_name: String,
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

/// Extract the object-created events from an S3 event notification body.
///
/// Records for other event types are skipped. Keys arrive form-encoded
/// (`+` for space, `%xx` escapes) and are returned decoded.
///
/// # Errors
///
/// Returns `Malformed` if the body is not a notification document.
pub fn parse_s3_notification(body: &str) -> Result<Vec<ObjectCreated>, EventError> {
    let notification: Notification = serde_json::from_str(body)?;

    Ok(notification
        .records
        .into_iter()
        .filter(|record| record.event_name.starts_with(OBJECT_CREATED_PREFIX))
        .map(|record| ObjectCreated {
            bucket: record.s3.bucket.name,
            key: decode_key(&record.s3.object.key),
        })
        .collect())
}

/// Undo S3's form encoding of an object key.
fn decode_key(raw: &str) -> String {
    // S3 escapes '&' and '=' in keys, so the whole key parses as one name.
    form_urlencoded::parse(raw.as_bytes())
        .map(|(name, _)| name.into_owned())
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn notification(records: &[(&str, &str, &str)]) -> String {
        let records: Vec<serde_json::Value> = records
            .iter()
            .map(|(event, bucket, key)| {
                serde_json::json!({
                    "eventVersion": "2.1",
                    "eventSource": "aws:s3",
                    "eventName": event,
                    "s3": {
                        "bucket": { "name": bucket, "arn": format!("arn:aws:s3:::{bucket}") },
                        "object": { "key": key, "size": 1024 }
                    }
                })
            })
            .collect();
        serde_json::json!({ "Records": records }).to_string()
    }

    #[test]
    fn test_parse_object_created() {
        let body = notification(&[(
            "ObjectCreated:Put",
            "originals",
            "0190f3a2-7c1e-7a4b-9d2e-3f4a5b6c7d8e",
        )]);

        let events = parse_s3_notification(&body).unwrap();
        assert_eq!(
            events,
            vec![ObjectCreated::new(
                "originals",
                "0190f3a2-7c1e-7a4b-9d2e-3f4a5b6c7d8e"
            )]
        );
    }

    #[test]
    fn test_parse_skips_other_event_types() {
        let body = notification(&[
            ("ObjectRemoved:Delete", "originals", "gone"),
            ("ObjectCreated:CompleteMultipartUpload", "originals", "big"),
        ]);

        let events = parse_s3_notification(&body).unwrap();
        assert_eq!(events, vec![ObjectCreated::new("originals", "big")]);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("my+photo.png", "my photo.png")]
    #[case("caf%C3%A9.png", "café.png")]
    #[case("a%2Bb", "a+b")]
    #[case("dir/file%3D1.png", "dir/file=1.png")]
    fn test_key_decoding(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(decode_key(raw), expected);
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_s3_notification("{}").unwrap().is_empty());
        assert!(matches!(
            parse_s3_notification("not json"),
            Err(EventError::Malformed(_))
        ));
    }
}
