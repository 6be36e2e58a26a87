//! A description of what's on screen, built from the session state.
//!
//! [Screen] holds no logic of its own: it's built from a [Session] on every redraw and handed to
//! the [render::ScreenRenderer], which is the only thing that knows about terminal positions.

use crate::{
    api::{Breed, Favorite, VoteRecord},
    config::KeyBindingsConfig,
    commands::keyboard::KeyBinding,
    session::{toast::ToastKind, BreedImages, ListState, Session, Tab},
    terminal::image::Image,
};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt;
use strum::IntoEnumIterator;

pub(crate) mod render;

const DATE_FORMAT: &str = "%-m/%-d/%y, %-I:%M %p";

/// The meaning of a piece of text, which decides how it's colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Normal,
    Accent,
    Muted,
    Upvote,
    Downvote,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) text: String,
    pub(crate) tone: Tone,
}

impl Span {
    pub(crate) fn new<S: Into<String>>(text: S, tone: Tone) -> Self {
        Self { text: text.into(), tone }
    }
}

/// A line made up of differently toned spans.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Line(pub(crate) Vec<Span>);

impl Line {
    #[cfg(test)]
    pub(crate) fn text(&self) -> String {
        self.0.iter().map(|span| span.text.as_str()).collect()
    }
}

impl From<Span> for Line {
    fn from(span: Span) -> Self {
        Self(vec![span])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TabLabel {
    pub(crate) tab: Tab,
    pub(crate) active: bool,
}

/// A selectable list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListView {
    pub(crate) rows: Vec<Line>,
    pub(crate) cursor: Option<usize>,

    /// Shown instead of the rows when there's none.
    pub(crate) placeholder: Option<&'static str>,
}

impl ListView {
    fn new<T, F>(state: &ListState<T>, loading: bool, empty: &'static str, row: F) -> Self
    where
        F: Fn(&T) -> Line,
    {
        match state.items() {
            Some([]) => Self { placeholder: Some(empty), ..Default::default() },
            Some(items) => {
                Self { rows: items.iter().map(row).collect(), cursor: Some(state.cursor()), placeholder: None }
            }
            None if loading => Self { placeholder: Some("Loading..."), ..Default::default() },
            None => Self::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BreedDetails<'a> {
    pub(crate) name: &'a str,
    pub(crate) origin: &'a str,
    pub(crate) temperament: &'a str,
    pub(crate) description: &'a str,
    pub(crate) wikipedia_url: Option<&'a str>,
}

impl<'a> From<&'a Breed> for BreedDetails<'a> {
    fn from(breed: &'a Breed) -> Self {
        Self {
            name: &breed.name,
            origin: &breed.origin,
            temperament: &breed.temperament,
            description: &breed.description,
            wikipedia_url: breed.wikipedia_url.as_deref(),
        }
    }
}

/// The slideshow area of the breeds tab.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Gallery<'a> {
    Idle,
    Loading,
    Failed(&'a str),
    Slides { image: &'a Image, dots: Vec<bool> },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Body<'a> {
    Voting { image: Option<&'a Image>, loading: bool },
    Breeds { list: ListView, details: Option<BreedDetails<'a>>, gallery: Gallery<'a> },
    Entries { list: ListView, preview: Option<&'a Image> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Hint {
    pub(crate) key: String,
    pub(crate) label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Footer<'a> {
    pub(crate) toast: Option<Span>,
    pub(crate) hints: &'a [Hint],
    pub(crate) loading: bool,
}

/// Everything that's drawn on the screen.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Screen<'a> {
    pub(crate) tabs: Vec<TabLabel>,
    pub(crate) body: Body<'a>,
    pub(crate) footer: Footer<'a>,
}

impl<'a> Screen<'a> {
    pub(crate) fn build(session: &'a Session, hints: &'a KeyHints) -> Self {
        let current = session.tab();
        let tabs = Tab::iter().map(|tab| TabLabel { tab, active: tab == current }).collect();
        let loading = session.is_loading();
        let body = match current {
            Tab::Voting => Body::Voting { image: session.cat().map(|current| &current.image), loading },
            Tab::Breeds => Self::breeds(session, loading),
            Tab::Favorites => {
                let favorites = session.favorites();
                let list = ListView::new(favorites, loading, "No favorites yet. Start adding some cats!", favorite_row);
                let preview = favorites.selected().and_then(Favorite::image_url).and_then(|url| session.preview(url));
                Body::Entries { list, preview }
            }
            Tab::VoteHistory => {
                let history = session.history();
                let list = ListView::new(history, loading, "No voting history available.", vote_row);
                let preview = history.selected().and_then(VoteRecord::image_url).and_then(|url| session.preview(url));
                Body::Entries { list, preview }
            }
        };
        let toast = session.toast().map(|toast| {
            let tone = match toast.kind {
                ToastKind::Success => Tone::Success,
                ToastKind::Error => Tone::Error,
            };
            Span::new(toast.message.clone(), tone)
        });
        let footer = Footer { toast, hints: hints.for_tab(current), loading };
        Self { tabs, body, footer }
    }

    fn breeds(session: &'a Session, loading: bool) -> Body<'a> {
        let list = ListView::new(session.breeds(), loading, "No breeds available.", |breed: &Breed| {
            Span::new(breed.name.clone(), Tone::Normal).into()
        });
        let details = session.selected_breed().map(BreedDetails::from);
        let gallery = match (session.breed_images(), session.slideshow()) {
            (BreedImages::Loading, _) => Gallery::Loading,
            (BreedImages::Failed(message), _) => Gallery::Failed(message),
            (BreedImages::Ready, Some(slideshow)) => match slideshow.slides().iter().find(|slide| slide.is_active()) {
                Some(slide) => {
                    let dots = slideshow.indicators().iter().map(|indicator| indicator.is_active()).collect();
                    Gallery::Slides { image: &slide.image, dots }
                }
                None => Gallery::Idle,
            },
            _ => Gallery::Idle,
        };
        Body::Breeds { list, details, gallery }
    }
}

fn favorite_row(favorite: &Favorite) -> Line {
    Line(vec![
        Span::new(format!("#{} ", favorite.id), Tone::Accent),
        Span::new(format_date(&favorite.created_at), Tone::Normal),
    ])
}

fn vote_row(vote: &VoteRecord) -> Line {
    let (marker, tone) = if vote.is_upvote() { ("▲", Tone::Upvote) } else { ("▼", Tone::Downvote) };
    Line(vec![
        Span::new(format!("{marker} "), tone),
        Span::new(format_date(&vote.created_at), Tone::Normal),
        Span::new(format!("  Vote ID: {}", vote.id), Tone::Muted),
    ])
}

/// The key hints shown in the footer for each tab.
#[derive(Clone, Debug, Default)]
pub(crate) struct KeyHints {
    voting: Vec<Hint>,
    breeds: Vec<Hint>,
    favorites: Vec<Hint>,
    history: Vec<Hint>,
}

impl KeyHints {
    pub(crate) fn new(bindings: &KeyBindingsConfig) -> Self {
        let common = [hint(&bindings.next_tab, "next tab"), hint(&bindings.exit, "quit")];
        let build = |specific: Vec<Option<Hint>>| -> Vec<Hint> {
            specific.into_iter().chain(common.clone()).flatten().collect()
        };
        Self {
            voting: build(vec![
                hint(&bindings.vote_up, "upvote"),
                hint(&bindings.vote_down, "downvote"),
                hint(&bindings.favorite, "favorite"),
            ]),
            breeds: build(vec![
                hint(&bindings.next_item, "next"),
                hint(&bindings.confirm, "show"),
                hint(&bindings.next_slide, "next image"),
            ]),
            favorites: build(vec![hint(&bindings.next_item, "next"), hint(&bindings.remove, "remove")]),
            history: build(vec![hint(&bindings.next_item, "next"), hint(&bindings.refresh, "refresh")]),
        }
    }

    fn for_tab(&self, tab: Tab) -> &[Hint] {
        match tab {
            Tab::Voting => &self.voting,
            Tab::Breeds => &self.breeds,
            Tab::Favorites => &self.favorites,
            Tab::VoteHistory => &self.history,
        }
    }
}

fn hint(bindings: &[KeyBinding], label: &'static str) -> Option<Hint> {
    bindings.first().map(|key| Hint { key: key.to_string(), label })
}

/// Something on screen that reacts to clicks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitTarget {
    Tab(Tab),
    Indicator(usize),
    ListRow(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct HitRegion {
    row: u16,
    column: u16,
    width: u16,
    target: HitTarget,
}

/// The clickable regions of the last rendered screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct HitMap {
    regions: Vec<HitRegion>,
}

impl HitMap {
    pub(crate) fn add(&mut self, row: u16, column: u16, width: u16, target: HitTarget) {
        self.regions.push(HitRegion { row, column, width, target });
    }

    pub(crate) fn target_at(&self, column: u16, row: u16) -> Option<HitTarget> {
        self.regions
            .iter()
            .find(|region| region.row == row && column >= region.column && column < region.column + region.width)
            .map(|region| region.target)
    }
}

/// Format a backend timestamp in the local timezone, or return it as is if it can't be parsed.
pub(crate) fn format_date(raw: &str) -> String {
    format_date_in(raw, &Local)
}

fn format_date_in<Tz>(raw: &str, timezone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return date.with_timezone(timezone).format(DATE_FORMAT).to_string();
    }
    // Timestamps without an offset are already local.
    let local = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|date| timezone.from_local_datetime(&date).single());
    match local {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}
