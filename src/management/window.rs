use std::collections::HashSet;

use crate::{config::WindowConfig, error::BrowseError, types::Track, types::TrackPage};

/// Fetch state over one query lifetime.
///
/// `Searching` and `Prefetching` are the only states with a fetch outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Idle,
    Searching,
    Ready,
    Prefetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page of a new query, replaces the window.
    Initial,
    /// Next page after the window's tail.
    Append,
}

/// A page fetch issued by the window, tagged with the query generation it
/// belongs to. Results for an older generation are discarded on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: FetchKind,
    pub query: String,
    pub offset: usize,
    pub limit: usize,
    pub market: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Loaded {
        count: usize,
        total: usize,
        has_more: bool,
    },
    NoMatches,
    Appended {
        added: usize,
        total: usize,
        has_more: bool,
    },
    /// An append page came back empty; nothing more to fetch.
    Exhausted,
    /// The request was superseded by a newer query and its result dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Play { uri: String },
    Pause,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPlan {
    pub generation: u64,
    pub track_id: String,
    pub command: PlayerCommand,
}

/// Follow-up work decided after a successful play command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Maintenance {
    pub trimmed: usize,
    pub prefetch: Option<PageRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub query: Option<String>,
    pub state: WindowState,
    pub items: Vec<Track>,
    pub offset: usize,
    pub total: Option<usize>,
    pub has_more: bool,
    pub cursor: Option<String>,
}

impl WindowSnapshot {
    /// Logical index (into the full remote result set) of a window position.
    pub fn logical_index(&self, position: usize) -> usize {
        self.offset + position
    }
}

/// Bounded, forward-scrolling view over a paginated search endpoint.
///
/// The window performs no I/O. It hands out [`PageRequest`]s and expects
/// their results back through [`ResultWindow::apply_page`] or
/// [`ResultWindow::fail_fetch`].
#[derive(Debug, Clone)]
pub struct ResultWindow {
    config: WindowConfig,
    state: WindowState,
    generation: u64,
    query: Option<String>,
    items: Vec<Track>,
    offset: usize,
    total: Option<usize>,
    has_more: bool,
    cursor: Option<String>,
    // item paused by re-selecting it; selecting it again resumes
    paused: Option<String>,
}

impl ResultWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            state: WindowState::Idle,
            generation: 0,
            query: None,
            items: Vec::new(),
            offset: 0,
            total: None,
            has_more: false,
            cursor: None,
            paused: None,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn position_of(&self, track_id: &str) -> Option<usize> {
        self.items.iter().position(|t| t.id == track_id)
    }

    pub fn current_track(&self) -> Option<&Track> {
        let cursor = self.cursor.as_deref()?;
        self.items.iter().find(|t| t.id == cursor)
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            query: self.query.clone(),
            state: self.state,
            items: self.items.clone(),
            offset: self.offset,
            total: self.total,
            has_more: self.has_more,
            cursor: self.cursor.clone(),
        }
    }

    /// Starts a new query: resets the window and returns the request for page 0.
    ///
    /// An empty or whitespace-only keyword is rejected and leaves the window
    /// untouched.
    pub fn begin_search(&mut self, keyword: &str) -> Result<PageRequest, BrowseError> {
        let query = keyword.trim();
        if query.is_empty() {
            return Err(BrowseError::EmptyKeyword);
        }

        self.generation += 1;
        self.state = WindowState::Searching;
        self.query = Some(query.to_string());
        self.items.clear();
        self.offset = 0;
        self.total = None;
        self.has_more = false;
        self.cursor = None;
        self.paused = None;

        Ok(self.request(FetchKind::Initial, 0))
    }

    /// Returns the request for the page after the window's tail, or `None`
    /// when nothing more exists or a fetch is already outstanding.
    pub fn begin_prefetch(&mut self) -> Option<PageRequest> {
        if self.state != WindowState::Ready || !self.has_more {
            return None;
        }

        self.state = WindowState::Prefetching;
        Some(self.request(FetchKind::Append, self.tail_offset()))
    }

    /// Applies a fetched page. Results of superseded requests are discarded.
    pub fn apply_page(&mut self, request: &PageRequest, page: TrackPage) -> PageOutcome {
        if !self.is_current(request) {
            return PageOutcome::Stale;
        }

        self.state = WindowState::Ready;
        self.total = Some(page.total);
        let returned = page.items.len();

        let outcome = match request.kind {
            FetchKind::Initial if returned == 0 => {
                self.items.clear();
                self.has_more = false;
                PageOutcome::NoMatches
            }
            FetchKind::Initial => {
                self.has_more = Self::more_after(request, returned, page.total);
                self.items.clear();
                self.extend_unique(page.items);
                self.clamp_to_total();
                PageOutcome::Loaded {
                    count: self.items.len(),
                    total: page.total,
                    has_more: self.has_more,
                }
            }
            FetchKind::Append if returned == 0 => {
                self.has_more = false;
                PageOutcome::Exhausted
            }
            FetchKind::Append => {
                self.has_more = Self::more_after(request, returned, page.total);
                let before = self.items.len();
                self.extend_unique(page.items);
                self.clamp_to_total();
                PageOutcome::Appended {
                    added: self.items.len().saturating_sub(before),
                    total: page.total,
                    has_more: self.has_more,
                }
            }
        };

        outcome
    }

    /// Records a failed fetch. Returns `false` when the request was stale.
    ///
    /// A failed search leaves the window empty; a failed prefetch leaves it
    /// as it was so the user can retry by selecting again.
    pub fn fail_fetch(&mut self, request: &PageRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }

        self.state = match request.kind {
            FetchKind::Initial => WindowState::Idle,
            FetchKind::Append => WindowState::Ready,
        };
        true
    }

    /// Decides which player command selecting `track_id` requires.
    ///
    /// Selecting the current item pauses it; selecting the item paused that
    /// way resumes it; anything else plays the item from the start.
    pub fn plan_select(&self, track_id: &str) -> Result<SelectPlan, BrowseError> {
        let track = self
            .items
            .iter()
            .find(|t| t.id == track_id)
            .ok_or_else(|| BrowseError::UnknownTrack(track_id.to_string()))?;

        let command = if self.cursor.as_deref() == Some(track_id) {
            PlayerCommand::Pause
        } else if self.cursor.is_none() && self.paused.as_deref() == Some(track_id) {
            PlayerCommand::Resume
        } else {
            PlayerCommand::Play {
                uri: track.uri.clone(),
            }
        };

        Ok(SelectPlan {
            generation: self.generation,
            track_id: track_id.to_string(),
            command,
        })
    }

    /// Commits a select whose player command succeeded and runs window
    /// maintenance for new plays: prefetch near the tail, trim at the head.
    pub fn commit_select(&mut self, plan: &SelectPlan) -> Maintenance {
        if plan.generation != self.generation {
            return Maintenance::default();
        }

        match plan.command {
            PlayerCommand::Pause => {
                self.cursor = None;
                self.paused = Some(plan.track_id.clone());
                Maintenance::default()
            }
            PlayerCommand::Resume => {
                self.cursor = Some(plan.track_id.clone());
                self.paused = None;
                Maintenance::default()
            }
            PlayerCommand::Play { .. } => {
                self.cursor = Some(plan.track_id.clone());
                self.paused = None;

                let Some(position) = self.position_of(&plan.track_id) else {
                    return Maintenance::default();
                };

                let near_tail =
                    position >= self.items.len().saturating_sub(self.config.prefetch_lookahead);
                let prefetch = if near_tail { self.begin_prefetch() } else { None };

                Maintenance {
                    trimmed: self.trim_before(position),
                    prefetch,
                }
            }
        }
    }

    // drops everything above `position - trim_lookback`
    fn trim_before(&mut self, position: usize) -> usize {
        if position <= self.config.trim_lookback {
            return 0;
        }

        let dropped = position - self.config.trim_lookback;
        self.items.drain(..dropped);
        self.offset += dropped;
        dropped
    }

    fn request(&self, kind: FetchKind, offset: usize) -> PageRequest {
        PageRequest {
            generation: self.generation,
            kind,
            query: self.query.clone().unwrap_or_default(),
            offset,
            limit: self.config.page_size,
            market: self.config.market.clone(),
        }
    }

    fn tail_offset(&self) -> usize {
        self.offset + self.items.len()
    }

    fn is_current(&self, request: &PageRequest) -> bool {
        if request.generation != self.generation {
            return false;
        }

        match request.kind {
            FetchKind::Initial => self.state == WindowState::Searching,
            FetchKind::Append => {
                self.state == WindowState::Prefetching && request.offset == self.tail_offset()
            }
        }
    }

    fn more_after(request: &PageRequest, returned: usize, total: usize) -> bool {
        returned == request.limit && request.offset + request.limit < total
    }

    fn extend_unique(&mut self, tracks: Vec<Track>) {
        let mut seen: HashSet<String> = self.items.iter().map(|t| t.id.clone()).collect();
        self.items
            .extend(tracks.into_iter().filter(|t| seen.insert(t.id.clone())));
    }

    fn clamp_to_total(&mut self) {
        if let Some(total) = self.total {
            let room = total.saturating_sub(self.offset);
            if self.items.len() > room {
                self.items.truncate(room);
                self.has_more = false;
            }
        }
    }
}
