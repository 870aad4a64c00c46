//! Blocking HTTP transport for the file-hosting service

use reqwest::blocking::{multipart, Client, Response};
use tracing::debug;

use crate::infrastructure::error::{InfraError, InfraResult, TransportError};
use crate::infrastructure::traits::{Transport, UploadRequest};

/// Form value the service expects before it deletes a file.
const DELETE_CONFIRMATION: &str = "do it!";

/// Talks to the service over `reqwest`'s blocking client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> InfraResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("yafu/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InfraError::HttpClient)?;
        Ok(Self { client })
    }

    fn check(url: &str, res: Response) -> Result<Response, TransportError> {
        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(res)
    }
}

impl Transport for HttpTransport {
    fn upload(&self, request: &UploadRequest) -> Result<String, TransportError> {
        let url = request.endpoint();
        let request_err = |source: reqwest::Error| TransportError::Request {
            url: url.clone(),
            source,
        };
        debug!("upload: url={} file={}", url, request.file_name);

        let part = multipart::Part::bytes(request.contents.clone())
            .file_name(request.file_name.clone());
        let form = request
            .form_fields()
            .into_iter()
            .fold(multipart::Form::new().part("upload", part), |form, (name, value)| {
                form.text(name, value)
            });

        let res = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(request_err)?;
        let res = Self::check(&url, res)?;
        res.text().map_err(request_err)
    }

    fn confirm_delete(&self, url: &str) -> Result<(), TransportError> {
        debug!("confirm_delete: url={}", url);
        let res = self
            .client
            .post(url)
            .form(&[("confirm", DELETE_CONFIRMATION)])
            .send()
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        Self::check(url, res)?;
        Ok(())
    }
}
