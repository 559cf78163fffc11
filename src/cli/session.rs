use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    Res,
    config::{self, WindowConfig},
    info,
    management::{
        PageOutcome, PlaybackAction, PlayerEvents, PlayerReadiness, PrefetchStatus, TrackBrowser,
        WindowSnapshot,
    },
    spotify::{PlayerControl, bootstrap_player},
    success,
    types::{PlaybackState, TrackTableRow},
    utils, warning,
};

use super::auth::{LoginContext, greet, login};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    /// Row number as displayed, i.e. 1-based logical index.
    Select(usize),
    Toggle,
    Next,
    Previous,
    List,
    Help,
    Quit,
    Empty,
}

/// Maps one input line to a session command. Numbers select a row; any
/// other unrecognized text is searched for.
pub fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim();
    match line {
        "" => SessionCommand::Empty,
        "q" | "quit" | "exit" => SessionCommand::Quit,
        "t" => SessionCommand::Toggle,
        "n" => SessionCommand::Next,
        "p" => SessionCommand::Previous,
        "l" => SessionCommand::List,
        "h" | "?" | "help" => SessionCommand::Help,
        "/s" => SessionCommand::Search(String::new()),
        _ => {
            if let Some(keyword) = line.strip_prefix("/s ") {
                SessionCommand::Search(keyword.trim().to_string())
            } else if let Ok(number) = line.parse::<usize>() {
                SessionCommand::Select(number)
            } else {
                SessionCommand::Search(line.to_string())
            }
        }
    }
}

/// Interactive search and playback session.
pub async fn session(keyword: Option<String>) -> Res<()> {
    let window_config = WindowConfig::from_env()?;
    let ctx = LoginContext::from_env()?;
    let credential = login(&ctx).await?;
    greet(&ctx, &credential).await;

    let readiness = PlayerReadiness::new();
    let player: Arc<dyn PlayerControl> = ctx.client.clone();
    {
        let player = Arc::clone(&player);
        let readiness = readiness.clone();
        tokio::spawn(async move {
            match bootstrap_player(player, credential, readiness, config::device_name()).await {
                Ok(device) => success!("Ready with device {}", device.name),
                Err(e) => warning!("No Spotify Connect device available: {}", e),
            }
        });
    }

    let events = PlayerEvents::new();
    let subscription = events.on_state_change(print_state);

    let browser = TrackBrowser::new(
        window_config,
        ctx.client.clone(),
        player,
        ctx.credentials.clone(),
        readiness,
        events.clone(),
    );

    if let Some(keyword) = keyword {
        search(&browser, &keyword).await;
    }
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            SessionCommand::Quit => break,
            SessionCommand::Empty => {}
            SessionCommand::Help => print_help(),
            SessionCommand::List => render_window(&browser.snapshot().await),
            SessionCommand::Search(keyword) => search(&browser, &keyword).await,
            SessionCommand::Select(number) => select(&browser, number).await,
            SessionCommand::Toggle => report(browser.toggle_playback().await),
            SessionCommand::Next => report(browser.skip_next().await),
            SessionCommand::Previous => report(browser.skip_previous().await),
        }
    }

    events.unsubscribe(subscription);
    ctx.handshake.logout();
    Ok(())
}

async fn search(browser: &TrackBrowser, keyword: &str) {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Searching...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = browser.search(keyword).await;
    pb.finish_and_clear();

    match result {
        Ok(PageOutcome::NoMatches) => {
            warning!("No tracks found for this keyword. Try a different search term.")
        }
        Ok(PageOutcome::Stale) => {}
        Ok(_) => render_window(&browser.snapshot().await),
        Err(e) => warning!("{}", e),
    }
}

async fn select(browser: &TrackBrowser, number: usize) {
    let snapshot = browser.snapshot().await;
    let track_id = number
        .checked_sub(1 + snapshot.offset)
        .and_then(|position| snapshot.items.get(position))
        .map(|track| track.id.clone());

    let Some(track_id) = track_id else {
        warning!("No track #{} in the current list. Use `l` to list tracks.", number);
        return;
    };

    match browser.select_and_play(&track_id).await {
        Ok(outcome) => {
            match outcome.action {
                PlaybackAction::Played => {
                    if let Some(now) = browser.now_playing().await {
                        success!("Playing {} - {}", now.title, now.artist);
                    }
                }
                PlaybackAction::Paused => info!("Paused"),
                PlaybackAction::Resumed => info!("Resumed"),
            }
            if let PrefetchStatus::Completed(PageOutcome::Appended { added, total, .. }) =
                outcome.prefetch
            {
                info!("Loaded {} more tracks ({} total matches)", added, total);
            }
        }
        Err(e) => warning!("{}", e),
    }
}

fn report(result: Result<(), crate::error::BrowseError>) {
    if let Err(e) = result {
        warning!("{}", e);
    }
}

fn render_window(snapshot: &WindowSnapshot) {
    if snapshot.items.is_empty() {
        info!("No tracks loaded. Type a keyword to search.");
        return;
    }

    let rows: Vec<TrackTableRow> = snapshot
        .items
        .iter()
        .enumerate()
        .map(|(position, track)| TrackTableRow {
            number: snapshot.logical_index(position) + 1,
            playing: if snapshot.cursor.as_deref() == Some(track.id.as_str()) {
                "▶".to_string()
            } else {
                String::new()
            },
            title: track.name.clone(),
            artists: track.artist_names(),
            album: track.album.name.clone(),
            duration: utils::format_duration(track.duration_ms),
        })
        .collect();

    println!("{}", Table::new(rows));
    info!(
        "Showing {} of {} tracks for \"{}\"",
        snapshot.items.len(),
        snapshot.total.unwrap_or_default(),
        snapshot.query.as_deref().unwrap_or_default()
    );
}

fn print_state(state: &PlaybackState) {
    let Some(track) = &state.item else {
        return;
    };

    info!(
        "{} {} - {} [{} / {}]",
        if state.is_playing { "▶" } else { "⏸" },
        track.name,
        track.artist_names(),
        utils::format_duration(state.progress_ms.unwrap_or_default()),
        utils::format_duration(track.duration_ms)
    );
}

fn print_help() {
    info!(
        "Type a keyword to search, a track number to play or pause it, \
         `t` toggle, `n` next, `p` previous, `l` list, `q` quit."
    );
}
