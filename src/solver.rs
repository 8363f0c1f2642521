use log::{debug, info, warn};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/solve";

#[derive(Error, Debug)]
pub enum RequestError {
   #[error("invalid solver endpoint: {0}")]
   InvalidEndpoint(String),

   #[error("request to server failed: {0}")]
   Transport(#[from] reqwest::Error),

   #[error("no response from server")]
   NoResponse,

   #[error("malformed response from server: {0}")]
   Malformed(#[from] serde_json::Error),

   /// The solver answered but could not produce a move. The reason is the
   /// solver's own text.
   #[error("{0}")]
   SolveFailed(String),
}

/// One query to the solver. Built fresh for every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
   pub fen: String,
   pub depth: u32,
   pub max_think_time_ms: u64,
   pub disregard_think_time: bool,
}

impl SolveRequest {
   /// The GET url for this request against `endpoint`, every value
   /// percent-encoded.
   pub fn url(&self, endpoint: &Url) -> Url {
      let mut url = endpoint.clone();
      url.query_pairs_mut()
         .clear()
         .append_pair("fen", &self.fen)
         .append_pair("depth", &self.depth.to_string())
         .append_pair("max_think_time", &self.max_think_time_ms.to_string())
         .append_pair("disregard_think_time", if self.disregard_think_time { "true" } else { "false" });
      url
   }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolveResponse {
   pub success: bool,
   pub result: String,
}

/// Carries a GET to the solver and hands back whatever body came back,
/// which may be empty.
pub trait Transport: Send + Sync {
   fn get(&self, url: &Url) -> Result<String, RequestError>;
}

pub struct HttpTransport {
   client: reqwest::blocking::Client,
}

impl HttpTransport {
   pub fn new() -> Result<HttpTransport, RequestError> {
      // The solver bounds its own search through max_think_time, we never
      // cut it off from this side.
      let client = reqwest::blocking::Client::builder().timeout(None::<Duration>).build()?;
      Ok(HttpTransport { client })
   }
}

impl Transport for HttpTransport {
   fn get(&self, url: &Url) -> Result<String, RequestError> {
      // Failures come back as JSON with a 400, so the status is not checked
      let response = self.client.get(url.clone()).send()?;
      Ok(response.text()?)
   }
}

pub struct SolverClient<T> {
   endpoint: Url,
   transport: T,
}

impl<T: Transport> SolverClient<T> {
   pub fn new(endpoint: &str, transport: T) -> Result<SolverClient<T>, RequestError> {
      let endpoint = Url::parse(endpoint).map_err(|e| RequestError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
      Ok(SolverClient { endpoint, transport })
   }

   pub fn endpoint(&self) -> &Url {
      &self.endpoint
   }

   pub fn transport(&self) -> &T {
      &self.transport
   }

   /// Asks the solver for its best move. Every call is a fresh round trip
   /// and nothing is retried; a `SolveResponse` only comes back when the
   /// solver reported success.
   pub fn request_move(&self, request: &SolveRequest) -> Result<SolveResponse, RequestError> {
      let url = request.url(&self.endpoint);
      debug!(
         "querying solver: fen {} depth {} max think time {}ms",
         request.fen, request.depth, request.max_think_time_ms
      );
      let body = self.transport.get(&url)?;
      if body.trim().is_empty() {
         warn!("solver returned an empty body");
         return Err(RequestError::NoResponse);
      }
      let response: SolveResponse = serde_json::from_str(&body)?;
      if !response.success {
         warn!("solver failed: {}", response.result);
         return Err(RequestError::SolveFailed(response.result));
      }
      info!("solver returned {}", response.result);
      Ok(response)
   }
}
