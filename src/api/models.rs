use serde::{Deserialize, Serialize};
use std::fmt;

/// A cat picture.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CatImage {
    pub id: String,
    pub url: String,
}

/// A cat breed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Breed {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub temperament: String,

    #[serde(default)]
    pub wikipedia_url: Option<String>,
}

/// A picture of a specific breed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BreedImage {
    pub url: String,
}

/// A reference to an image embedded in favorites and votes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FavoriteId(pub u64);

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An image the user saved as a favorite.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,

    #[serde(default)]
    pub image: Option<ImageRef>,

    #[serde(default)]
    pub created_at: String,
}

impl Favorite {
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|image| image.url.as_deref())
    }
}

/// A vote the user cast in the past.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VoteRecord {
    pub id: u64,
    pub value: i32,

    #[serde(default)]
    pub image: Option<ImageRef>,

    #[serde(default)]
    pub created_at: String,
}

impl VoteRecord {
    pub fn is_upvote(&self) -> bool {
        self.value == 1
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|image| image.url.as_deref())
    }
}

/// The judgment in a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "i8")]
pub enum VoteValue {
    Up,
    Down,
}

impl From<VoteValue> for i8 {
    fn from(value: VoteValue) -> Self {
        match value {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewVote {
    pub image_id: String,
    pub value: VoteValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewFavorite {
    pub image_id: String,
}

/// The acknowledgement returned by the backend after a mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub message: Option<String>,
}

/// The body the backend replies with when it fails to talk to the image provider.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}
