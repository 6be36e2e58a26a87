use super::{
    models::{ErrorBody, FavoriteId, NewFavorite, NewVote, Receipt},
    ApiClient, ApiError, Breed, BreedImage, CatImage, Favorite, VoteRecord,
};
use reqwest::{
    blocking::{Client, RequestBuilder},
    Url,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// An [ApiClient] that talks to the backend over HTTP.
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Construct a client for the backend running at `base_url`.
    ///
    /// Requests never time out unless a `timeout` is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        // Make sure joining endpoints appends to any path prefix rather than replacing it.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(concat!("purrview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let body = self.execute(self.client.get(url))?;
        decode_body(&body)
    }

    fn mutate(&self, request: RequestBuilder) -> Result<Receipt, ApiError> {
        let body = self.execute(request)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Receipt::default());
        }
        decode_body(&body)
    }

    fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let request = request.build()?;
        debug!("{} {}", request.method(), request.url());
        let response = self.client.execute(request)?;
        let status = response.status();
        let body = response.bytes()?;
        debug!("response status {status}, {} bytes", body.len());
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(body.to_vec())
    }
}

impl ApiClient for HttpApiClient {
    fn random_cat(&self) -> Result<Vec<CatImage>, ApiError> {
        self.get("api/cats/random")
    }

    fn vote(&self, vote: &NewVote) -> Result<Receipt, ApiError> {
        let url = self.endpoint("api/vote")?;
        self.mutate(self.client.post(url).json(vote))
    }

    fn add_favorite(&self, favorite: &NewFavorite) -> Result<Receipt, ApiError> {
        let url = self.endpoint("api/favorites")?;
        self.mutate(self.client.post(url).json(favorite))
    }

    fn favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        self.get("api/favorites")
    }

    fn remove_favorite(&self, id: FavoriteId) -> Result<Receipt, ApiError> {
        let url = self.endpoint(&format!("api/favorites/{id}"))?;
        self.mutate(self.client.delete(url))
    }

    fn breeds(&self) -> Result<Vec<Breed>, ApiError> {
        self.get("api/breeds")
    }

    fn breed_images(&self, breed_id: &str, limit: u32) -> Result<Vec<BreedImage>, ApiError> {
        let mut url = self.endpoint("api/breed-images")?;
        url.query_pairs_mut().append_pair("breed_ids", breed_id).append_pair("limit", &limit.to_string());
        let body = self.execute(self.client.get(url))?;
        decode_body(&body)
    }

    fn vote_history(&self) -> Result<Vec<VoteRecord>, ApiError> {
        self.get("api/vote_history")
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let url = Url::parse(url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;
        self.execute(self.client.get(url))
    }
}

/// Decode a successful response body.
///
/// The backend replies with `{"error": "..."}` and a 200 status when it can't reach the image
/// provider, so that shape is checked before the expected one.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if let Ok(error) = serde_json::from_slice::<ErrorBody>(body) {
        return Err(ApiError::Backend(error.error));
    }
    Ok(serde_json::from_slice(body)?)
}
