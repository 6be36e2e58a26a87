use super::SessionEvent;
use crate::{
    api::{ApiClient, ApiError, Breed, CatImage, Favorite, FavoriteId, NewFavorite, NewVote, VoteRecord},
    terminal::image::{printer::ImageRegistry, printer::RegisterImageError, Image},
};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread,
};
use tracing::{debug, warn};

/// Who a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    /// A load for the view that was current at the given epoch.
    ///
    /// These are dropped once the view changes.
    View(u64),

    /// A user action, these are always carried out and reported.
    Action,
}

/// A request for the backend.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Request {
    RandomCat,
    Vote(NewVote),
    AddFavorite(NewFavorite),
    Favorites,
    RemoveFavorite(FavoriteId),
    Breeds,
    BreedImages { breed_id: String, limit: u32 },
    VoteHistory,

    /// Download the image at a URL so it can be previewed.
    Preview { url: String },
}

/// The successful result of a [Request].
#[derive(Debug)]
pub(crate) enum Response {
    RandomCat { cat: CatImage, image: Image },
    Voted,
    FavoriteAdded,
    Favorites(Vec<Favorite>),
    FavoriteRemoved,
    Breeds(Vec<Breed>),
    BreedImages { breed_id: String, images: Vec<Image> },
    VoteHistory(Vec<VoteRecord>),
    Preview { url: String, image: Image },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid image: {0}")]
    Image(#[from] RegisterImageError),

    #[error("{0}")]
    Empty(&'static str),
}

#[derive(Debug)]
pub(crate) enum FetchStatus {
    Completed(Result<Response, FetchError>),

    /// The view the request belonged to went away so it was either not executed or its result
    /// was thrown away.
    Stale,
}

/// The outcome of a request submitted to a [Fetcher].
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    pub(crate) request: Request,
    pub(crate) scope: Scope,
    pub(crate) status: FetchStatus,
}

/// Executes requests one at a time on a background thread.
///
/// Every submitted request produces exactly one [FetchOutcome] on the event channel.
pub(crate) struct Fetcher {
    sender: Sender<Job>,
    epoch: Arc<AtomicU64>,
}

impl Fetcher {
    pub(crate) fn launch(client: Arc<dyn ApiClient>, registry: ImageRegistry, events: Sender<SessionEvent>) -> Self {
        let (sender, receiver) = channel();
        let epoch = Arc::new(AtomicU64::new(0));
        let worker = FetchWorker { client, registry, epoch: epoch.clone(), receiver, events };
        thread::spawn(move || {
            worker.run();
        });
        Self { sender, epoch }
    }

    pub(crate) fn submit(&self, request: Request, scope: Scope) {
        debug!("Queueing {request:?} with scope {scope:?}");
        let _ = self.sender.send(Job { request, scope });
    }

    /// The current view epoch.
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Start a new view, making every view request submitted so far stale.
    pub(crate) fn begin_view(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }
}

struct Job {
    request: Request,
    scope: Scope,
}

struct FetchWorker {
    client: Arc<dyn ApiClient>,
    registry: ImageRegistry,
    epoch: Arc<AtomicU64>,
    receiver: Receiver<Job>,
    events: Sender<SessionEvent>,
}

impl FetchWorker {
    fn run(self) {
        while let Ok(Job { request, scope }) = self.receiver.recv() {
            let status = if self.is_stale(scope) {
                debug!("Skipping stale request {request:?}");
                FetchStatus::Stale
            } else {
                let result = self.execute(&request, scope);
                if self.is_stale(scope) {
                    debug!("Discarding result of stale request {request:?}");
                    FetchStatus::Stale
                } else {
                    if let Err(e) = &result {
                        warn!("Request {request:?} failed: {e}");
                    }
                    FetchStatus::Completed(result)
                }
            };
            let outcome = FetchOutcome { request, scope, status };
            if self.events.send(SessionEvent::Fetch(outcome)).is_err() {
                break;
            }
        }
    }

    fn is_stale(&self, scope: Scope) -> bool {
        match scope {
            Scope::View(epoch) => epoch != self.epoch.load(Ordering::SeqCst),
            Scope::Action => false,
        }
    }

    fn execute(&self, request: &Request, scope: Scope) -> Result<Response, FetchError> {
        let client = &self.client;
        let response = match request {
            Request::RandomCat => {
                let cat = client.random_cat()?.into_iter().next().ok_or(FetchError::Empty("No cat returned"))?;
                let image = self.download(&cat.url)?;
                Response::RandomCat { cat, image }
            }
            Request::Vote(vote) => {
                client.vote(vote)?;
                Response::Voted
            }
            Request::AddFavorite(favorite) => {
                client.add_favorite(favorite)?;
                Response::FavoriteAdded
            }
            Request::Favorites => Response::Favorites(client.favorites()?),
            Request::RemoveFavorite(id) => {
                client.remove_favorite(*id)?;
                Response::FavoriteRemoved
            }
            Request::Breeds => Response::Breeds(client.breeds()?),
            Request::BreedImages { breed_id, limit } => {
                let images = self.breed_images(breed_id, *limit, scope)?;
                Response::BreedImages { breed_id: breed_id.clone(), images }
            }
            Request::VoteHistory => Response::VoteHistory(client.vote_history()?),
            Request::Preview { url } => Response::Preview { url: url.clone(), image: self.download(url)? },
        };
        Ok(response)
    }

    fn breed_images(&self, breed_id: &str, limit: u32, scope: Scope) -> Result<Vec<Image>, FetchError> {
        let mut images = Vec::new();
        for breed_image in self.client.breed_images(breed_id, limit)? {
            // Stop early if the user already moved on.
            if self.is_stale(scope) {
                break;
            }
            match self.download(&breed_image.url) {
                Ok(image) => images.push(image),
                Err(e) => warn!("Skipping image {} for breed {breed_id}: {e}", breed_image.url),
            }
        }
        if images.is_empty() {
            return Err(FetchError::Empty("No images found for this breed"));
        }
        debug!("Loaded {} images for breed {breed_id}", images.len());
        Ok(images)
    }

    fn download(&self, url: &str) -> Result<Image, FetchError> {
        let contents = self.client.download_image(url)?;
        Ok(self.registry.register_remote(url, contents)?)
    }
}
