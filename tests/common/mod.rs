//! Fakes for the I/O boundary traits shared by integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use yafu::infrastructure::traits::{Clock, Transport, UploadRequest};
use yafu::infrastructure::TransportError;

pub const SERVICE_RESPONSE: &str = r#"<html><body>
<p>Your file has been uploaded.</p>
<a href="http://x/y/info/4711/a.txt">Info page</a>
<p>Delete: <a href="http://x/y/delete/Zm9vYmFy">http://x/y/delete/Zm9vYmFy</a></p>
</body></html>"#;

/// Clock frozen at a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(ts: i64) -> Self {
        Self(Utc.timestamp_opt(ts, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Transport that records every call and answers from canned data.
pub struct FakeTransport {
    pub body: String,
    /// URLs (upload endpoint or delete URL) that answer 500
    pub failing: Vec<String>,
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub deletes: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn answering(body: &str) -> Self {
        Self {
            body: body.to_string(),
            failing: Vec::new(),
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    fn check(&self, url: &str) -> Result<(), TransportError> {
        if self.failing.iter().any(|u| u == url) {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

impl Transport for FakeTransport {
    fn upload(&self, request: &UploadRequest) -> Result<String, TransportError> {
        self.check(&request.endpoint())?;
        self.uploads.lock().unwrap().push(request.clone());
        Ok(self.body.clone())
    }

    fn confirm_delete(&self, url: &str) -> Result<(), TransportError> {
        self.check(url)?;
        self.deletes.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
