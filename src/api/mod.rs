//! Access to the cat voting backend.

pub(crate) mod http;
pub(crate) mod models;

#[cfg(test)]
pub(crate) mod fake;

pub use self::{
    http::HttpApiClient,
    models::{Breed, BreedImage, CatImage, Favorite, FavoriteId, NewFavorite, NewVote, Receipt, VoteRecord, VoteValue},
};

/// A client for the backend's REST API.
///
/// Every call blocks until the backend replies. Nothing is retried.
pub trait ApiClient: Send + Sync {
    /// `GET /api/cats/random`
    fn random_cat(&self) -> Result<Vec<CatImage>, ApiError>;

    /// `POST /api/vote`
    fn vote(&self, vote: &NewVote) -> Result<Receipt, ApiError>;

    /// `POST /api/favorites`
    fn add_favorite(&self, favorite: &NewFavorite) -> Result<Receipt, ApiError>;

    /// `GET /api/favorites`
    fn favorites(&self) -> Result<Vec<Favorite>, ApiError>;

    /// `DELETE /api/favorites/{id}`
    fn remove_favorite(&self, id: FavoriteId) -> Result<Receipt, ApiError>;

    /// `GET /api/breeds`
    fn breeds(&self) -> Result<Vec<Breed>, ApiError>;

    /// `GET /api/breed-images?breed_ids={breed_id}&limit={limit}`
    fn breed_images(&self, breed_id: &str, limit: u32) -> Result<Vec<BreedImage>, ApiError>;

    /// `GET /api/vote_history`
    fn vote_history(&self) -> Result<Vec<VoteRecord>, ApiError>;

    /// Download the raw contents of an image returned by any of the other calls.
    fn download_image(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server replied with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("server error: {0}")]
    Backend(String),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
