/// Server communication: request parameters, the data-server response
/// model, HTTP status classification, and the ureq transport.

use std::io::Read;
use std::time::Duration;

use thiserror::Error;

use crate::frequency::RelativeBandwidth;

/// Credentials forwarded to the prediction server on every request.
#[derive(Clone, Debug, Default)]
pub struct LoginCredentials {
    pub user_name: String,
    pub password: String,
}

/// Where the prediction servlet lives.
#[derive(Clone, Debug)]
pub struct ServerRequestProperties {
    pub base_url: String,
}

impl ServerRequestProperties {
    pub fn polar_response_url(&self) -> String {
        format!("{}/polarResponse", self.base_url.trim_end_matches('/'))
    }
}

/// One snapshot of everything a polar-response request needs. Taken on the
/// UI thread at request time so later toolbar edits can't bleed into an
/// in-flight fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarDataRequestParameters {
    pub acoustic_source_model: String,
    pub relative_bandwidth: RelativeBandwidth,
    pub center_frequency_hz: f64,
}

impl PolarDataRequestParameters {
    /// Apply the request headers the servlet reads.
    pub fn apply_headers(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("acousticSourceModel", &self.acoustic_source_model)
            .set("octaveDivider", &self.relative_bandwidth.octave_divider().to_string())
            .set("centerFrequency", &self.center_frequency_hz.to_string())
    }
}

/// What came back from the data server: the HTTP status, the status
/// message headers, and the raw payload bytes when any were sent.
#[derive(Clone, Debug, Default)]
pub struct DataServerResponse {
    pub http_status: u16,
    pub server_status_message: String,
    pub servlet_error_message: String,
    pub data: Option<Vec<u8>>,
}

/// Classify a server response for the UI.
///
/// Returns true when the response should be surfaced to the user: a 200
/// carries a payload, and a 500 is a prediction-side failure the user
/// needs to see even though the payload may be absent. Everything else
/// (authentication, precondition, and not-found statuses) is logged and
/// swallowed.
pub fn handle_data_server_response(response: &DataServerResponse) -> bool {
    match response.http_status {
        200 => {
            tracing::info!(
                status = response.http_status,
                message = %response.server_status_message,
                "polar response received"
            );
            true
        }
        500 => {
            tracing::warn!(
                status = response.http_status,
                message = %response.server_status_message,
                servlet_error = %response.servlet_error_message,
                "prediction failed on the server"
            );
            true
        }
        412 => {
            tracing::warn!(
                message = %response.server_status_message,
                "server rejected the request parameters"
            );
            false
        }
        401 => {
            tracing::warn!("server rejected the login credentials");
            false
        }
        204 => {
            tracing::info!("server had no polar data for the request");
            false
        }
        404 => {
            tracing::warn!("polar response servlet not found on the server");
            false
        }
        other => {
            tracing::warn!(status = other, "unexpected status from the data server");
            false
        }
    }
}

/// Failures that never produced a server response at all.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach the data server: {0}")]
    Transport(String),
    #[error("failed reading the server response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Seam between the fetch worker and the wire. The production transport
/// speaks HTTP; tests substitute controllable fakes.
pub trait PolarDataTransport: Send + 'static {
    fn fetch(&self, parameters: &PolarDataRequestParameters)
        -> Result<DataServerResponse, FetchError>;
}

/// The ureq-backed transport used by the running application.
pub struct HttpPolarDataTransport {
    properties: ServerRequestProperties,
    credentials: LoginCredentials,
    agent: ureq::Agent,
}

impl HttpPolarDataTransport {
    pub fn new(properties: ServerRequestProperties, credentials: LoginCredentials) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build();
        Self { properties, credentials, agent }
    }

    fn read_response(response: ureq::Response) -> Result<DataServerResponse, FetchError> {
        let http_status = response.status();
        let server_status_message = response
            .header("serverStatusMessage")
            .unwrap_or_default()
            .to_owned();
        let servlet_error_message = response
            .header("servletErrorMessage")
            .unwrap_or_default()
            .to_owned();
        let mut data = Vec::new();
        response.into_reader().read_to_end(&mut data)?;
        Ok(DataServerResponse {
            http_status,
            server_status_message,
            servlet_error_message,
            data: if data.is_empty() { None } else { Some(data) },
        })
    }
}

impl PolarDataTransport for HttpPolarDataTransport {
    fn fetch(
        &self,
        parameters: &PolarDataRequestParameters,
    ) -> Result<DataServerResponse, FetchError> {
        let request = self
            .agent
            .get(&self.properties.polar_response_url())
            .set("userName", &self.credentials.user_name)
            .set("password", &self.credentials.password);
        let request = parameters.apply_headers(request);

        match request.call() {
            Ok(response) => Self::read_response(response),
            // Non-2xx statuses come back as Error::Status; they still carry
            // the headers the classification needs.
            Err(ureq::Error::Status(_, response)) => Self::read_response(response),
            Err(ureq::Error::Transport(transport)) => {
                Err(FetchError::Transport(transport.to_string()))
            }
        }
    }
}
