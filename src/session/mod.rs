//! The state of the application and everything that changes it.

use self::{
    fetch::{FetchError, FetchOutcome, FetchStatus, Fetcher, Request, Response, Scope},
    toast::{Toast, ToastKind, Toasts},
};
use crate::{
    api::{ApiClient, ApiError, Breed, CatImage, Favorite, NewFavorite, NewVote, VoteRecord, VoteValue},
    slideshow::{SlideshowOptions, SlideshowSlot, SlideshowTick, Slideshow, TickSink},
    terminal::image::{printer::ImageRegistry, Image},
};
use std::{
    collections::{HashMap, HashSet},
    sync::{mpsc::Sender, Arc},
    time::Instant,
};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

pub(crate) mod fetch;
pub(crate) mod toast;

/// Something that happened in a background thread.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Fetch(FetchOutcome),
    Tick(SlideshowTick),
}

impl TickSink for Sender<SessionEvent> {
    fn deliver(&self, tick: SlideshowTick) -> bool {
        self.send(SessionEvent::Tick(tick)).is_ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumIter, strum::Display)]
pub(crate) enum Tab {
    #[strum(to_string = "Vote")]
    Voting,
    Breeds,
    Favorites,
    #[strum(to_string = "History")]
    VoteHistory,
}

impl Tab {
    pub(crate) fn next(self) -> Self {
        Self::following(self, Self::iter())
    }

    pub(crate) fn previous(self) -> Self {
        Self::following(self, Self::iter().rev())
    }

    fn following<I: Iterator<Item = Tab> + Clone>(self, tabs: I) -> Self {
        tabs.cycle().skip_while(|tab| *tab != self).nth(1).unwrap_or(self)
    }
}

/// A list of items with a cursor.
#[derive(Debug)]
pub(crate) struct ListState<T> {
    items: Option<Vec<T>>,
    cursor: usize,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self { items: None, cursor: 0 }
    }
}

impl<T> ListState<T> {
    pub(crate) fn set(&mut self, items: Vec<T>) {
        self.cursor = self.cursor.min(items.len().saturating_sub(1));
        self.items = Some(items);
    }

    /// The items in the list, or `None` if they haven't been loaded.
    pub(crate) fn items(&self) -> Option<&[T]> {
        self.items.as_deref()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn selected(&self) -> Option<&T> {
        self.items.as_ref().and_then(|items| items.get(self.cursor))
    }

    fn len(&self) -> usize {
        self.items.as_ref().map(Vec::len).unwrap_or_default()
    }

    fn next(&mut self) -> bool {
        self.select(self.cursor + 1)
    }

    fn previous(&mut self) -> bool {
        match self.cursor.checked_sub(1) {
            Some(index) => self.select(index),
            None => false,
        }
    }

    fn select(&mut self, index: usize) -> bool {
        if index < self.len() && index != self.cursor {
            self.cursor = index;
            true
        } else {
            false
        }
    }
}

/// The cat currently up for a vote.
#[derive(Clone, Debug)]
pub(crate) struct CurrentCat {
    pub(crate) cat: CatImage,
    pub(crate) image: Image,
}

/// Where the images of the selected breed are at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum BreedImages {
    Idle,
    Loading,
    Failed(String),
    Ready,
}

pub(crate) struct SessionOptions {
    pub(crate) image_limit: u32,
    pub(crate) slideshow: SlideshowOptions,
}

/// Owns all application state.
pub(crate) struct Session {
    fetcher: Fetcher,
    image_limit: u32,
    tab: Tab,
    cat: Option<CurrentCat>,
    breeds: ListState<Breed>,
    selected_breed: Option<Breed>,
    breed_images: BreedImages,
    slideshow: SlideshowSlot<Image, Sender<SessionEvent>>,
    favorites: ListState<Favorite>,
    history: ListState<VoteRecord>,
    previews: HashMap<String, Image>,
    requested_previews: HashSet<String>,
    toasts: Toasts,
    in_flight: usize,
}

impl Session {
    pub(crate) fn new(
        client: Arc<dyn ApiClient>,
        registry: ImageRegistry,
        events: Sender<SessionEvent>,
        options: SessionOptions,
    ) -> Self {
        let fetcher = Fetcher::launch(client, registry, events.clone());
        Self {
            fetcher,
            image_limit: options.image_limit,
            tab: Tab::Voting,
            cat: None,
            breeds: Default::default(),
            selected_breed: None,
            breed_images: BreedImages::Idle,
            slideshow: SlideshowSlot::new(events, options.slideshow),
            favorites: Default::default(),
            history: Default::default(),
            previews: Default::default(),
            requested_previews: Default::default(),
            toasts: Default::default(),
            in_flight: 0,
        }
    }

    /// Load the initial view.
    pub(crate) fn start(&mut self) {
        self.switch_tab(Tab::Voting);
    }

    pub(crate) fn tab(&self) -> Tab {
        self.tab
    }

    pub(crate) fn cat(&self) -> Option<&CurrentCat> {
        self.cat.as_ref()
    }

    pub(crate) fn breeds(&self) -> &ListState<Breed> {
        &self.breeds
    }

    pub(crate) fn selected_breed(&self) -> Option<&Breed> {
        self.selected_breed.as_ref()
    }

    pub(crate) fn breed_images(&self) -> &BreedImages {
        &self.breed_images
    }

    pub(crate) fn slideshow(&self) -> Option<&Slideshow<Image>> {
        self.slideshow.slideshow()
    }

    pub(crate) fn favorites(&self) -> &ListState<Favorite> {
        &self.favorites
    }

    pub(crate) fn history(&self) -> &ListState<VoteRecord> {
        &self.history
    }

    pub(crate) fn preview(&self, url: &str) -> Option<&Image> {
        self.previews.get(url)
    }

    pub(crate) fn toast(&self) -> Option<&Toast> {
        self.toasts.latest()
    }

    /// Whether there's any request being processed.
    pub(crate) fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Make `tab` the active one and load its contents.
    ///
    /// Anything still loading for the previous view is dropped.
    pub(crate) fn switch_tab(&mut self, tab: Tab) {
        if self.tab == Tab::Breeds {
            self.slideshow.clear();
            self.selected_breed = None;
            self.breed_images = BreedImages::Idle;
        }
        info!("Switching to tab {tab}");
        self.tab = tab;
        let epoch = self.fetcher.begin_view();
        let request = match tab {
            Tab::Voting => Request::RandomCat,
            Tab::Breeds => Request::Breeds,
            Tab::Favorites => Request::Favorites,
            Tab::VoteHistory => Request::VoteHistory,
        };
        self.submit(request, Scope::View(epoch));
    }

    pub(crate) fn next_tab(&mut self) {
        self.switch_tab(self.tab.next());
    }

    pub(crate) fn previous_tab(&mut self) {
        self.switch_tab(self.tab.previous());
    }

    /// Reload the current tab from scratch.
    pub(crate) fn refresh(&mut self) {
        self.switch_tab(self.tab);
    }

    pub(crate) fn vote(&mut self, value: VoteValue) {
        let Some(current) = &self.cat else {
            warn!("No image to vote {value} on");
            return;
        };
        let vote = NewVote { image_id: current.cat.id.clone(), value };
        info!("Voting {value} on image {}", vote.image_id);
        self.submit(Request::Vote(vote), Scope::Action);
    }

    pub(crate) fn favorite(&mut self) {
        let Some(current) = &self.cat else {
            warn!("No image to add to the favorites");
            self.toasts.push(ToastKind::Error, "Failed to add favorite");
            return;
        };
        let favorite = NewFavorite { image_id: current.cat.id.clone() };
        info!("Adding image {} to the favorites", favorite.image_id);
        self.submit(Request::AddFavorite(favorite), Scope::Action);
    }

    pub(crate) fn next_item(&mut self) {
        let moved = match self.tab {
            Tab::Voting => false,
            Tab::Breeds => self.breeds.next(),
            Tab::Favorites => self.favorites.next(),
            Tab::VoteHistory => self.history.next(),
        };
        if moved {
            self.request_selected_preview();
        }
    }

    pub(crate) fn previous_item(&mut self) {
        let moved = match self.tab {
            Tab::Voting => false,
            Tab::Breeds => self.breeds.previous(),
            Tab::Favorites => self.favorites.previous(),
            Tab::VoteHistory => self.history.previous(),
        };
        if moved {
            self.request_selected_preview();
        }
    }

    /// Move the cursor to a specific row in the current list.
    ///
    /// Picking a breed also opens it.
    pub(crate) fn select_row(&mut self, index: usize) {
        match self.tab {
            Tab::Voting => (),
            Tab::Breeds => {
                self.breeds.select(index);
                if self.breeds.cursor() == index {
                    self.confirm();
                }
            }
            Tab::Favorites => {
                if self.favorites.select(index) {
                    self.request_selected_preview();
                }
            }
            Tab::VoteHistory => {
                if self.history.select(index) {
                    self.request_selected_preview();
                }
            }
        }
    }

    /// Open the breed under the cursor: its details are shown right away and its images are
    /// loaded into a new slideshow.
    pub(crate) fn confirm(&mut self) {
        if self.tab != Tab::Breeds {
            return;
        }
        let Some(breed) = self.breeds.selected().cloned() else {
            return;
        };
        info!("Loading images for breed {}", breed.id);
        self.slideshow.clear();
        self.breed_images = BreedImages::Loading;
        let epoch = self.fetcher.begin_view();
        let request = Request::BreedImages { breed_id: breed.id.clone(), limit: self.image_limit };
        self.selected_breed = Some(breed);
        self.submit(request, Scope::View(epoch));
    }

    /// Remove the favorite under the cursor.
    pub(crate) fn remove(&mut self) {
        if self.tab != Tab::Favorites {
            return;
        }
        let Some(favorite) = self.favorites.selected() else {
            return;
        };
        info!("Removing favorite {}", favorite.id);
        self.submit(Request::RemoveFavorite(favorite.id), Scope::Action);
    }

    pub(crate) fn next_slide(&mut self) {
        if let Err(e) = self.slideshow.select_next() {
            debug!("Can't move to next slide: {e}");
        }
    }

    pub(crate) fn previous_slide(&mut self) {
        if let Err(e) = self.slideshow.select_previous() {
            debug!("Can't move to previous slide: {e}");
        }
    }

    /// Show the slide at the given 0-based index.
    pub(crate) fn select_slide(&mut self, index: usize) {
        if let Err(e) = self.slideshow.select(index) {
            debug!("Can't select slide: {e}");
        }
    }

    /// Drop expired toasts, returning whether anything changed.
    pub(crate) fn expire_toasts(&mut self, now: Instant) -> bool {
        self.toasts.expire(now)
    }

    pub(crate) fn on_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Fetch(outcome) => self.on_fetch(outcome),
            SessionEvent::Tick(tick) => {
                self.slideshow.on_tick(tick);
            }
        }
    }

    fn on_fetch(&mut self, outcome: FetchOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let FetchOutcome { request, scope, status } = outcome;
        let result = match status {
            FetchStatus::Completed(result) if !self.is_stale(scope) => result,
            _ => {
                if let Request::Preview { url } = request {
                    // Allow requesting it again next time it's needed.
                    self.requested_previews.remove(&url);
                }
                return;
            }
        };
        match result {
            Ok(response) => self.on_response(response),
            Err(e) => self.on_failure(request, e),
        }
    }

    fn on_response(&mut self, response: Response) {
        match response {
            Response::RandomCat { cat, image } => {
                debug!("Showing cat {}", cat.id);
                self.cat = Some(CurrentCat { cat, image });
            }
            Response::Voted => {
                self.toasts.push(ToastKind::Success, "Vote Recorded Successfully!");
                self.load_cat();
            }
            Response::FavoriteAdded => {
                self.toasts.push(ToastKind::Success, "Added to favorites!");
                self.load_cat();
            }
            Response::Favorites(favorites) => {
                self.favorites.set(favorites);
                self.request_selected_preview();
            }
            Response::FavoriteRemoved => {
                self.toasts.push(ToastKind::Success, "Removed from favorites");
                let epoch = self.fetcher.epoch();
                self.submit(Request::Favorites, Scope::View(epoch));
            }
            Response::Breeds(breeds) => self.breeds.set(breeds),
            Response::BreedImages { breed_id, images } => {
                if self.selected_breed.as_ref().map(|breed| &breed.id) != Some(&breed_id) {
                    debug!("Ignoring images for breed {breed_id} which is no longer selected");
                    return;
                }
                self.slideshow.replace(images);
                self.breed_images = BreedImages::Ready;
            }
            Response::VoteHistory(history) => {
                self.history.set(history);
                self.request_selected_preview();
            }
            Response::Preview { url, image } => {
                self.previews.insert(url, image);
            }
        }
    }

    fn on_failure(&mut self, request: Request, error: FetchError) {
        let message = match request {
            Request::RandomCat => "Error loading cat image",
            Request::Vote(_) => "Failed to vote",
            Request::AddFavorite(_) => match error {
                FetchError::Api(ApiError::Transport(_)) => "Error adding favorite",
                _ => "Failed to add favorite",
            },
            Request::Favorites => "Error loading favorites",
            Request::RemoveFavorite(_) => "Failed to remove from favorites",
            Request::Breeds => "Error loading breeds",
            Request::VoteHistory => "Error loading vote history",
            Request::BreedImages { .. } => {
                let reason = match &error {
                    FetchError::Api(ApiError::Status { .. }) => "Failed to fetch images from server".to_string(),
                    other => other.to_string(),
                };
                self.breed_images = BreedImages::Failed(format!("Error loading images: {reason}"));
                return;
            }
            // Nothing to show, the entry simply stays without a preview until it's requested again.
            Request::Preview { url } => {
                self.requested_previews.remove(&url);
                return;
            }
        };
        self.toasts.push(ToastKind::Error, message);
    }

    fn is_stale(&self, scope: Scope) -> bool {
        match scope {
            Scope::View(epoch) => epoch != self.fetcher.epoch(),
            Scope::Action => false,
        }
    }

    fn load_cat(&mut self) {
        let epoch = self.fetcher.epoch();
        self.submit(Request::RandomCat, Scope::View(epoch));
    }

    fn request_selected_preview(&mut self) {
        let url = match self.tab {
            Tab::Favorites => self.favorites.selected().and_then(Favorite::image_url),
            Tab::VoteHistory => self.history.selected().and_then(VoteRecord::image_url),
            Tab::Voting | Tab::Breeds => None,
        };
        let Some(url) = url.map(ToString::to_string) else {
            return;
        };
        if self.previews.contains_key(&url) || !self.requested_previews.insert(url.clone()) {
            return;
        }
        let epoch = self.fetcher.epoch();
        self.submit(Request::Preview { url }, Scope::View(epoch));
    }

    fn submit(&mut self, request: Request, scope: Scope) {
        self.in_flight += 1;
        self.fetcher.submit(request, scope);
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::api::{
        fake::{cat, Call, Endpoint, FakeApiClient},
        FavoriteId,
    };
    use std::{
        sync::mpsc::{channel, Receiver},
        time::Duration,
    };

    pub(crate) struct Harness {
        pub(crate) session: Session,
        pub(crate) client: Arc<FakeApiClient>,
        events: Receiver<SessionEvent>,
    }

    impl Harness {
        pub(crate) fn new(client: FakeApiClient) -> Self {
            let client = Arc::new(client);
            let (sender, events) = channel();
            let options = SessionOptions {
                image_limit: 8,
                slideshow: SlideshowOptions { interval: Duration::from_secs(600), restart_on_select: false },
            };
            let session = Session::new(client.clone(), ImageRegistry::default(), sender, options);
            Self { session, client, events }
        }

        pub(crate) fn started(client: FakeApiClient) -> Self {
            let mut harness = Self::new(client);
            harness.session.start();
            harness.settle();
            harness
        }

        /// Process events until there's nothing left in flight.
        pub(crate) fn settle(&mut self) {
            while self.session.is_loading() {
                let event = self.events.recv_timeout(Duration::from_secs(5)).expect("no event received");
                self.session.on_event(event);
            }
        }

        fn toasts(&self) -> Vec<&str> {
            self.session.toasts.messages()
        }
    }

    #[test]
    fn tab_cycle() {
        assert_eq!(Tab::Voting.next(), Tab::Breeds);
        assert_eq!(Tab::VoteHistory.next(), Tab::Voting);
        assert_eq!(Tab::Voting.previous(), Tab::VoteHistory);
        assert_eq!(Tab::Favorites.previous(), Tab::Breeds);
    }

    #[test]
    fn start_loads_cat() {
        let harness = Harness::started(FakeApiClient::populated());
        let current = harness.session.cat().expect("no cat");
        assert_eq!(current.cat, cat("a"));
        assert_eq!(harness.client.calls(), &[Call::RandomCat, Call::Download("http://cats/a.png".into())]);
    }

    #[test]
    fn cat_load_failure_keeps_previous() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::RandomCat);
        harness.session.refresh();
        harness.settle();

        assert_eq!(harness.session.cat().map(|c| c.cat.id.as_str()), Some("a"));
        assert_eq!(harness.toasts(), &["Error loading cat image"]);
    }

    #[test]
    fn vote_loads_new_cat() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.vote(VoteValue::Up);
        harness.settle();

        assert_eq!(harness.toasts(), &["Vote Recorded Successfully!"]);
        assert_eq!(harness.session.cat().map(|c| c.cat.id.as_str()), Some("b"));
        assert!(harness.client.calls().contains(&Call::Vote(NewVote { image_id: "a".into(), value: VoteValue::Up })));
    }

    #[test]
    fn vote_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::Vote);
        harness.session.vote(VoteValue::Down);
        harness.settle();

        assert_eq!(harness.toasts(), &["Failed to vote"]);
        assert_eq!(harness.session.cat().map(|c| c.cat.id.as_str()), Some("a"));
    }

    #[test]
    fn vote_without_cat() {
        let client = FakeApiClient::populated();
        client.cats.lock().unwrap().clear();
        let mut harness = Harness::started(client);
        assert!(harness.session.cat().is_none());
        assert_eq!(harness.toasts(), &["Error loading cat image"]);

        harness.session.vote(VoteValue::Up);
        assert!(!harness.session.is_loading());
        assert_eq!(harness.client.calls(), &[Call::RandomCat]);
    }

    #[test]
    fn favorite() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.favorite();
        harness.settle();

        assert_eq!(harness.toasts(), &["Added to favorites!"]);
        assert_eq!(harness.session.cat().map(|c| c.cat.id.as_str()), Some("b"));
        assert!(harness.client.calls().contains(&Call::AddFavorite(NewFavorite { image_id: "a".into() })));
    }

    #[test]
    fn favorite_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::AddFavorite);
        harness.session.favorite();
        harness.settle();

        assert_eq!(harness.toasts(), &["Failed to add favorite"]);
    }

    #[test]
    fn favorite_unreachable() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.disconnect(Endpoint::AddFavorite);
        harness.session.favorite();
        harness.settle();

        assert_eq!(harness.toasts(), &["Error adding favorite"]);
        assert_eq!(harness.session.cat().map(|c| c.cat.id.as_str()), Some("a"));
    }

    #[test]
    fn breeds() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();

        let breeds = harness.session.breeds().items().expect("not loaded");
        assert_eq!(breeds.len(), 2);
        assert!(harness.session.selected_breed().is_none());
        assert_eq!(harness.session.breed_images(), &BreedImages::Idle);
    }

    #[test]
    fn breeds_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::Breeds);
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();

        assert!(harness.session.breeds().items().is_none());
        assert_eq!(harness.toasts(), &["Error loading breeds"]);
    }

    #[test]
    fn breed_slideshow() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();
        harness.session.next_item();
        harness.session.confirm();

        assert_eq!(harness.session.selected_breed().map(|b| b.name.as_str()), Some("Bengal"));
        assert_eq!(harness.session.breed_images(), &BreedImages::Loading);
        harness.settle();

        assert_eq!(harness.session.breed_images(), &BreedImages::Ready);
        let slideshow = harness.session.slideshow().expect("no slideshow");
        assert_eq!(slideshow.len(), 3);
        assert_eq!(slideshow.current(), Some(0));
        assert!(harness.client.calls().contains(&Call::BreedImages { breed_id: "beng".into(), limit: 8 }));

        harness.session.select_slide(2);
        assert_eq!(harness.session.slideshow().and_then(Slideshow::current), Some(2));
        harness.session.next_slide();
        assert_eq!(harness.session.slideshow().and_then(Slideshow::current), Some(0));
        harness.session.previous_slide();
        assert_eq!(harness.session.slideshow().and_then(Slideshow::current), Some(2));
    }

    #[test]
    fn breed_images_skip_broken() {
        let mut client = FakeApiClient::populated();
        client.broken_images.insert("http://cats/breed-1.png".into());
        let mut harness = Harness::started(client);
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();
        harness.session.confirm();
        harness.settle();

        assert_eq!(harness.session.slideshow().map(Slideshow::len), Some(2));
    }

    #[test]
    fn breed_without_images() {
        let mut client = FakeApiClient::populated();
        client.breed_images.clear();
        let mut harness = Harness::started(client);
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();
        harness.session.confirm();
        harness.settle();

        let expected = BreedImages::Failed("Error loading images: No images found for this breed".into());
        assert_eq!(harness.session.breed_images(), &expected);
        assert!(harness.session.slideshow().is_none());
        assert_eq!(harness.session.selected_breed().map(|b| b.id.as_str()), Some("abys"));
    }

    #[test]
    fn breed_images_server_error() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::BreedImages);
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();
        harness.session.confirm();
        harness.settle();

        let expected = BreedImages::Failed("Error loading images: Failed to fetch images from server".into());
        assert_eq!(harness.session.breed_images(), &expected);
    }

    #[test]
    fn leaving_breeds_tears_down_slideshow() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();
        harness.session.confirm();
        harness.settle();
        assert!(harness.session.slideshow().is_some());

        harness.session.switch_tab(Tab::Favorites);
        assert!(harness.session.slideshow().is_none());
        assert!(harness.session.selected_breed().is_none());
        harness.settle();
    }

    #[test]
    fn new_breed_selection_discards_previous_images() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Breeds);
        harness.settle();

        let gate = harness.client.gate(Endpoint::BreedImages);
        harness.session.confirm();
        gate.started.recv_timeout(Duration::from_secs(5)).expect("request not started");
        harness.session.next_item();
        harness.session.confirm();
        gate.release.send(()).unwrap();
        harness.settle();

        assert_eq!(harness.session.selected_breed().map(|b| b.id.as_str()), Some("beng"));
        assert_eq!(harness.session.breed_images(), &BreedImages::Ready);
        // Only the second selection made it all the way to downloading images.
        let breed_calls: Vec<_> =
            harness.client.calls().into_iter().filter(|call| matches!(call, Call::BreedImages { .. })).collect();
        assert_eq!(breed_calls.len(), 2);
    }

    #[test]
    fn stale_view_requests_skipped() {
        let mut harness = Harness::started(FakeApiClient::populated());
        let gate = harness.client.gate(Endpoint::Breeds);
        harness.session.switch_tab(Tab::Breeds);
        gate.started.recv_timeout(Duration::from_secs(5)).expect("request not started");

        // Queued behind the breeds request and immediately superseded.
        harness.session.switch_tab(Tab::Favorites);
        harness.session.switch_tab(Tab::VoteHistory);
        gate.release.send(()).unwrap();
        harness.settle();

        assert!(harness.session.breeds().items().is_none());
        assert!(harness.session.favorites().items().is_none());
        assert!(harness.session.history().items().is_some());
        assert!(!harness.client.calls().contains(&Call::Favorites));
    }

    #[test]
    fn favorites() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Favorites);
        harness.settle();

        assert_eq!(harness.session.favorites().items().map(<[_]>::len), Some(2));
        assert!(harness.session.preview("http://cats/fav-10.png").is_some());
        assert!(harness.session.preview("http://cats/fav-11.png").is_none());

        harness.session.next_item();
        harness.settle();
        assert!(harness.session.preview("http://cats/fav-11.png").is_some());
    }

    #[test]
    fn preview_retried_after_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::Download);
        harness.session.switch_tab(Tab::Favorites);
        harness.settle();
        assert!(harness.session.preview("http://cats/fav-10.png").is_none());

        harness.client.recover(Endpoint::Download);
        harness.session.refresh();
        harness.settle();
        assert!(harness.session.preview("http://cats/fav-10.png").is_some());

        let download = Call::Download("http://cats/fav-10.png".into());
        assert_eq!(harness.client.calls().iter().filter(|call| **call == download).count(), 2);
    }

    #[test]
    fn empty_favorites() {
        let client = FakeApiClient::populated();
        client.favorites.lock().unwrap().clear();
        let mut harness = Harness::started(client);
        harness.session.switch_tab(Tab::Favorites);
        harness.settle();

        assert_eq!(harness.session.favorites().items().map(<[_]>::len), Some(0));
        assert!(harness.toasts().is_empty());
    }

    #[test]
    fn favorites_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::Favorites);
        harness.session.switch_tab(Tab::Favorites);
        harness.settle();

        assert_eq!(harness.toasts(), &["Error loading favorites"]);
    }

    #[test]
    fn remove_favorite() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Favorites);
        harness.settle();
        harness.session.remove();
        harness.settle();

        assert_eq!(harness.toasts(), &["Removed from favorites"]);
        let ids: Vec<_> = harness.session.favorites().items().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, &[FavoriteId(11)]);
    }

    #[test]
    fn remove_favorite_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::Favorites);
        harness.settle();
        harness.client.fail(Endpoint::RemoveFavorite);
        harness.session.remove();
        harness.settle();

        assert_eq!(harness.toasts(), &["Failed to remove from favorites"]);
        assert_eq!(harness.session.favorites().items().map(<[_]>::len), Some(2));
    }

    #[test]
    fn history() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.session.switch_tab(Tab::VoteHistory);
        harness.settle();

        let history = harness.session.history().items().expect("not loaded");
        assert!(history[0].is_upvote());
        assert!(!history[1].is_upvote());
        assert!(harness.session.preview("http://cats/vote-1.png").is_some());

        // The second entry has no image so nothing is requested.
        harness.session.next_item();
        assert!(!harness.session.is_loading());
    }

    #[test]
    fn history_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::VoteHistory);
        harness.session.switch_tab(Tab::VoteHistory);
        harness.settle();

        assert_eq!(harness.toasts(), &["Error loading vote history"]);
    }

    #[test]
    fn recovering_after_failure() {
        let mut harness = Harness::started(FakeApiClient::populated());
        harness.client.fail(Endpoint::VoteHistory);
        harness.session.switch_tab(Tab::VoteHistory);
        harness.settle();
        assert!(harness.session.history().items().is_none());

        harness.client.recover(Endpoint::VoteHistory);
        harness.session.refresh();
        harness.settle();
        assert!(harness.session.history().items().is_some());
    }

    #[test]
    fn list_cursor_bounds() {
        let mut list = ListState::default();
        assert!(!list.next());
        list.set(vec![1, 2, 3]);
        assert!(list.next());
        assert!(list.next());
        assert!(!list.next());
        assert_eq!(list.selected(), Some(&3));

        // Shrinking the list keeps the cursor inside it.
        list.set(vec![1]);
        assert_eq!(list.cursor(), 0);
        assert!(!list.previous());
    }
}
