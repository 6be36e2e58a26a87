use super::{
    models::ImageRef, ApiClient, ApiError, Breed, BreedImage, CatImage, Favorite, FavoriteId, NewFavorite, NewVote,
    Receipt, VoteRecord,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::{
    collections::{HashMap, HashSet},
    io::Cursor,
    sync::{
        mpsc::{channel, Receiver, Sender},
        Mutex,
    },
};
use strum::EnumDiscriminants;

/// A call made against a [FakeApiClient].
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(Endpoint), derive(Hash))]
pub(crate) enum Call {
    RandomCat,
    Vote(NewVote),
    AddFavorite(NewFavorite),
    Favorites,
    RemoveFavorite(FavoriteId),
    Breeds,
    BreedImages { breed_id: String, limit: u32 },
    VoteHistory,
    Download(String),
}

/// Lets a test pause a call until it decides to let it go.
pub(crate) struct Gate {
    pub(crate) started: Receiver<()>,
    pub(crate) release: Sender<()>,
}

struct GateHandle {
    started: Sender<()>,
    release: Receiver<()>,
}

/// An in-memory backend that records every call made to it.
#[derive(Default)]
pub(crate) struct FakeApiClient {
    pub(crate) cats: Mutex<Vec<CatImage>>,
    pub(crate) breeds: Vec<Breed>,
    pub(crate) breed_images: Vec<BreedImage>,
    pub(crate) favorites: Mutex<Vec<Favorite>>,
    pub(crate) history: Vec<VoteRecord>,
    pub(crate) broken_images: HashSet<String>,
    failing: Mutex<HashSet<Endpoint>>,
    unreachable: Mutex<HashSet<Endpoint>>,
    gates: Mutex<HashMap<Endpoint, GateHandle>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApiClient {
    /// A backend with a couple of everything.
    pub(crate) fn populated() -> Self {
        let image = |url: &str| Some(ImageRef { url: Some(url.into()) });
        Self {
            cats: Mutex::new(vec![cat("a"), cat("b"), cat("c")]),
            breeds: vec![
                Breed {
                    id: "abys".into(),
                    name: "Abyssinian".into(),
                    description: "Active and curious".into(),
                    origin: "Egypt".into(),
                    temperament: "Active, Energetic".into(),
                    wikipedia_url: Some("https://en.wikipedia.org/wiki/Abyssinian_cat".into()),
                },
                Breed {
                    id: "beng".into(),
                    name: "Bengal".into(),
                    description: "Spotted".into(),
                    origin: "United States".into(),
                    temperament: "Alert, Agile".into(),
                    wikipedia_url: None,
                },
            ],
            breed_images: (0..3).map(|i| BreedImage { url: format!("http://cats/breed-{i}.png") }).collect(),
            favorites: Mutex::new(vec![
                Favorite { id: FavoriteId(10), image: image("http://cats/fav-10.png"), created_at: String::new() },
                Favorite { id: FavoriteId(11), image: image("http://cats/fav-11.png"), created_at: String::new() },
            ]),
            history: vec![
                VoteRecord { id: 1, value: 1, image: image("http://cats/vote-1.png"), created_at: String::new() },
                VoteRecord { id: 2, value: -1, image: None, created_at: String::new() },
            ],
            ..Default::default()
        }
    }

    /// Make every call to an endpoint fail.
    pub(crate) fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    /// Make every call to an endpoint fail before reaching the server.
    pub(crate) fn disconnect(&self, endpoint: Endpoint) {
        self.unreachable.lock().unwrap().insert(endpoint);
    }

    pub(crate) fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().unwrap().remove(&endpoint);
        self.unreachable.lock().unwrap().remove(&endpoint);
    }

    /// Pause the next call to an endpoint until the returned gate is released.
    pub(crate) fn gate(&self, endpoint: Endpoint) -> Gate {
        let (started_sender, started) = channel();
        let (release, release_receiver) = channel();
        let handle = GateHandle { started: started_sender, release: release_receiver };
        self.gates.lock().unwrap().insert(endpoint, handle);
        Gate { started, release }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        let endpoint = Endpoint::from(&call);
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().remove(&endpoint);
        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.recv();
        }
        if self.unreachable.lock().unwrap().contains(&endpoint) {
            let error = reqwest::blocking::Client::new().get("not a url").build().expect_err("url is valid");
            return Err(ApiError::Transport(error));
        }
        if self.failing.lock().unwrap().contains(&endpoint) {
            return Err(ApiError::Status { status: 500, body: "boom".into() });
        }
        Ok(())
    }
}

impl ApiClient for FakeApiClient {
    fn random_cat(&self) -> Result<Vec<CatImage>, ApiError> {
        self.record(Call::RandomCat)?;
        let mut cats = self.cats.lock().unwrap();
        if cats.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![cats.remove(0)])
    }

    fn vote(&self, vote: &NewVote) -> Result<Receipt, ApiError> {
        self.record(Call::Vote(vote.clone()))?;
        Ok(Receipt { id: Some(1), message: Some("SUCCESS".into()) })
    }

    fn add_favorite(&self, favorite: &NewFavorite) -> Result<Receipt, ApiError> {
        self.record(Call::AddFavorite(favorite.clone()))?;
        Ok(Receipt { id: Some(2), message: Some("SUCCESS".into()) })
    }

    fn favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        self.record(Call::Favorites)?;
        Ok(self.favorites.lock().unwrap().clone())
    }

    fn remove_favorite(&self, id: FavoriteId) -> Result<Receipt, ApiError> {
        self.record(Call::RemoveFavorite(id))?;
        self.favorites.lock().unwrap().retain(|favorite| favorite.id != id);
        Ok(Receipt::default())
    }

    fn breeds(&self) -> Result<Vec<Breed>, ApiError> {
        self.record(Call::Breeds)?;
        Ok(self.breeds.clone())
    }

    fn breed_images(&self, breed_id: &str, limit: u32) -> Result<Vec<BreedImage>, ApiError> {
        self.record(Call::BreedImages { breed_id: breed_id.into(), limit })?;
        Ok(self.breed_images.iter().take(limit as usize).cloned().collect())
    }

    fn vote_history(&self) -> Result<Vec<VoteRecord>, ApiError> {
        self.record(Call::VoteHistory)?;
        Ok(self.history.clone())
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.record(Call::Download(url.into()))?;
        if self.broken_images.contains(url) {
            return Ok(b"definitely not an image".to_vec());
        }
        Ok(tiny_png())
    }
}

pub(crate) fn cat(id: &str) -> CatImage {
    CatImage { id: id.into(), url: format!("http://cats/{id}.png") }
}

fn tiny_png() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, [200, 120, 40].into()));
    let mut contents = Vec::new();
    image.write_to(&mut Cursor::new(&mut contents), ImageFormat::Png).expect("encoding failed");
    contents
}
