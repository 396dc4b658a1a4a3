use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::{PrKitError, Result};

/// Decode a JSON response body, surfacing parse failures as
/// `MalformedResponse` with the originating URL.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().clone();
    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| PrKitError::MalformedResponse(format!("{url}: {e}")))
}
