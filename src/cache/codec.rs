//! Cached response encoding.
//!
//! A stored entry is one format-version byte followed by a `bincode`-encoded
//! [`CacheRecord`]. The `Age` header is never stored; it is recomputed from
//! the record's capture time every time the entry is decoded.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::http::{Body, Headers, Response, StatusCode};

use super::clock::Clock;
use super::error::{DecodeError, EncodeError};

/// Version byte written in front of every record.
pub const FORMAT_VERSION: u8 = 1;

/// The persisted form of a cached response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub code: u16,
    /// Capture time, seconds since the Unix epoch.
    pub time: i64,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl CacheRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(1 + 32 + self.body.len());
        buf.push(FORMAT_VERSION);
        bincode::serialize_into(&mut buf, self)?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (&version, payload) = bytes.split_first().ok_or(DecodeError::Empty)?;
        if version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        Ok(bincode::deserialize(payload)?)
    }
}

/// Turns responses into stored records and back.
#[derive(Clone)]
pub struct ResponseCodec {
    headers: Vec<String>,
    clock: Arc<dyn Clock>,
}

impl ResponseCodec {
    /// `headers` is the allowlist; only these response headers are persisted,
    /// keyed by the spelling given here.
    pub fn new(headers: Vec<String>, clock: Arc<dyn Clock>) -> Self {
        Self { headers, clock }
    }

    /// Capture a response as a record stamped with the current time.
    ///
    /// Fails with [`EncodeError::UnboundedBody`] for streaming bodies.
    pub fn record(&self, response: &Response) -> Result<CacheRecord, EncodeError> {
        let body = response
            .body_ref()
            .as_bytes()
            .ok_or(EncodeError::UnboundedBody)?
            .clone();

        let headers = self
            .headers
            .iter()
            .filter_map(|name| {
                let line = response.headers().get_line(name)?;
                Some((name.clone(), line))
            })
            .collect();

        Ok(CacheRecord {
            code: response.status().as_u16(),
            time: self.clock.now(),
            headers,
            body,
        })
    }

    /// Capture and serialize a response in one step.
    pub fn encode(&self, response: &Response) -> Result<Vec<u8>, EncodeError> {
        let encoded = self.record(response)?.to_bytes()?;
        tracing::trace!(bytes = encoded.len(), "encoded cache record");
        Ok(encoded)
    }

    /// Rebuild a response from stored bytes, with `Age` set to the seconds
    /// elapsed since capture.
    ///
    /// A capture time in the future (clock skew) yields a negative `Age`; it
    /// is passed through as-is. A capture time so far off that the age does
    /// not fit in an `i64` is rejected with [`DecodeError::TimeOutOfRange`].
    pub fn decode(&self, bytes: &[u8]) -> Result<Response, DecodeError> {
        self.rebuild(CacheRecord::from_bytes(bytes)?)
    }

    /// Rebuild a response from an already-deserialized record.
    pub fn rebuild(&self, record: CacheRecord) -> Result<Response, DecodeError> {
        let status = StatusCode::from_u16(record.code).ok_or(DecodeError::UnknownStatus(record.code))?;
        let age = self
            .clock
            .now()
            .checked_sub(record.time)
            .ok_or(DecodeError::TimeOutOfRange(record.time))?;

        let mut headers = Headers::with_capacity(record.headers.len() + 1);
        for (name, value) in record.headers {
            headers.insert(name, value);
        }
        headers.set("Age", age.to_string());

        Ok(Response::from_parts(status, headers, Body::Full(record.body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FrozenClock;

    const T0: i64 = 1_538_000_000;

    fn codec(clock: &Arc<FrozenClock>) -> ResponseCodec {
        ResponseCodec::new(vec!["foo".into(), "Content-Type".into()], clock.clone())
    }

    fn response() -> Response {
        Response::new(StatusCode::Ok)
            .header("foo", "bar")
            .header("bar", "foo")
            .body("6666cd76f96956469e7be39d750cc7d9")
    }

    #[test]
    fn record_keeps_only_allowlisted_headers() {
        let clock = Arc::new(FrozenClock::new(T0));
        let record = codec(&clock).record(&response()).unwrap();
        assert_eq!(record.code, 200);
        assert_eq!(record.time, T0);
        assert_eq!(record.headers.len(), 1);
        assert_eq!(record.headers.get("foo").map(String::as_str), Some("bar"));
        assert_eq!(record.body, Bytes::from_static(b"6666cd76f96956469e7be39d750cc7d9"));
    }

    #[test]
    fn header_spelling_follows_allowlist() {
        let clock = Arc::new(FrozenClock::new(T0));
        let res = Response::new(StatusCode::Ok).header("content-type", "text/html");
        let record = codec(&clock).record(&res).unwrap();
        assert!(record.headers.contains_key("Content-Type"));
        assert!(!record.headers.contains_key("content-type"));
    }

    #[test]
    fn multi_value_header_stored_as_line() {
        let clock = Arc::new(FrozenClock::new(T0));
        let res = Response::new(StatusCode::Ok).header("foo", "a").header("FOO", "b");
        let record = codec(&clock).record(&res).unwrap();
        assert_eq!(record.headers.get("foo").map(String::as_str), Some("a, b"));
    }

    #[test]
    fn round_trip_at_same_instant_has_zero_age() {
        let clock = Arc::new(FrozenClock::new(T0));
        let codec = codec(&clock);
        let bytes = codec.encode(&response()).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded.status(), StatusCode::Ok);
        assert_eq!(decoded.headers().get("foo"), Some("bar"));
        assert_eq!(decoded.headers().get("bar"), None);
        assert_eq!(decoded.headers().get("Age"), Some("0"));
        assert_eq!(
            decoded.body_ref().as_bytes().map(|b| &b[..]),
            Some(&b"6666cd76f96956469e7be39d750cc7d9"[..])
        );
    }

    #[test]
    fn age_tracks_clock() {
        let clock = Arc::new(FrozenClock::new(T0));
        let codec = codec(&clock);
        let bytes = codec.encode(&response()).unwrap();

        clock.advance(1);
        assert_eq!(codec.decode(&bytes).unwrap().headers().get("age"), Some("1"));

        clock.advance(4);
        assert_eq!(codec.decode(&bytes).unwrap().headers().get("age"), Some("5"));
    }

    #[test]
    fn negative_age_not_clamped() {
        let clock = Arc::new(FrozenClock::new(T0));
        let codec = codec(&clock);
        let bytes = codec.encode(&response()).unwrap();
        clock.advance(-2);
        assert_eq!(codec.decode(&bytes).unwrap().headers().get("Age"), Some("-2"));
    }

    #[test]
    fn stored_age_is_overwritten() {
        let clock = Arc::new(FrozenClock::new(T0));
        let mut headers = BTreeMap::new();
        headers.insert("age".to_owned(), "999".to_owned());
        let record = CacheRecord {
            code: 200,
            time: T0 - 3,
            headers,
            body: Bytes::new(),
        };
        let res = codec(&clock).rebuild(record).unwrap();
        let ages: Vec<_> = res.headers().get_all("age").collect();
        assert_eq!(ages, vec!["3"]);
    }

    #[test]
    fn streaming_body_refused() {
        let clock = Arc::new(FrozenClock::new(T0));
        let (_tx, body) = Body::channel(1);
        let res = Response::new(StatusCode::Ok).with_body(body);
        assert!(matches!(codec(&clock).encode(&res), Err(EncodeError::UnboundedBody)));
    }

    #[test]
    fn empty_bytes_rejected() {
        let clock = Arc::new(FrozenClock::new(T0));
        assert!(matches!(codec(&clock).decode(&[]), Err(DecodeError::Empty)));
    }

    #[test]
    fn unknown_version_rejected() {
        let clock = Arc::new(FrozenClock::new(T0));
        let mut bytes = codec(&clock).encode(&response()).unwrap();
        bytes[0] = 9;
        assert!(matches!(
            codec(&clock).decode(&bytes),
            Err(DecodeError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn truncated_record_rejected() {
        let clock = Arc::new(FrozenClock::new(T0));
        let bytes = codec(&clock).encode(&response()).unwrap();
        assert!(matches!(
            codec(&clock).decode(&bytes[..bytes.len() / 2]),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_status_rejected() {
        let clock = Arc::new(FrozenClock::new(T0));
        let record = CacheRecord {
            code: 299,
            time: T0,
            headers: BTreeMap::new(),
            body: Bytes::new(),
        };
        let bytes = record.to_bytes().unwrap();
        assert!(matches!(
            codec(&clock).decode(&bytes),
            Err(DecodeError::UnknownStatus(299))
        ));
    }

    #[test]
    fn extreme_capture_time_rejected() {
        let clock = Arc::new(FrozenClock::new(T0));
        let record = CacheRecord {
            code: 200,
            time: i64::MIN,
            headers: BTreeMap::new(),
            body: Bytes::new(),
        };
        let bytes = record.to_bytes().unwrap();
        assert!(matches!(
            codec(&clock).decode(&bytes),
            Err(DecodeError::TimeOutOfRange(i64::MIN))
        ));
    }
}
