//! texrev: review an AI-suggested rewrite of a LaTeX document.
//!
//! Entry point for the `texrev` binary. Wires together the terminal lifecycle
//! (`tui`), the event bus (`event`), rendering (`ui`), configuration, logging,
//! and the SQLite document store from `texrev-core`.
//!
//! # Startup sequence
//!
//! 1. Parse arguments and install the tracing subscriber (file for the UI,
//!    stderr for `--print`).
//! 2. Load config; read both documents and propose the suggestion.
//! 3. `--print` writes the unified diff to stdout and returns here.
//! 4. Open `.texrev/texrev.db` and record the document and suggestion.
//! 5. Panic hook, SIGTERM flag, then `init_tui()`; the event loop runs until
//!    quit, SIGTERM, or channel close, and `restore_tui()` runs after it.

mod app;
mod cli;
mod config;
mod event;
mod logging;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::SystemTime;

use clap::Parser;
use texrev_core::db::{self, Resolution};
use texrev_core::document::Document;
use texrev_core::types::Alignment;
use tokio_rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

const DATA_DIR: &str = ".texrev";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = cli::Args::parse();

    if args.print {
        logging::init_stderr()?;
    } else {
        std::fs::create_dir_all(DATA_DIR)?;
        logging::init_file(&Path::new(DATA_DIR).join("texrev.log"))?;
    }
    let config = config::load_config();

    let current = std::fs::read_to_string(&args.current)?;
    let suggested = std::fs::read_to_string(&args.suggested)?;

    let view = args.view.or(config.view).unwrap_or_default();
    let alignment = args
        .alignment
        .map(Alignment::from)
        .or(config.alignment)
        .unwrap_or_default();

    let document = Document::new(args.current.display().to_string(), current);
    let mut state = AppState::new(document, view, alignment);
    state.session.propose(suggested, args.prompt.as_str());
    if let Some(provider) = config.provider() {
        state.provider_label = format!("{} ({})", provider.name(), provider.model());
    }

    if args.print {
        let diff = state.diff().unwrap_or_default();
        print!("{}", app::plain_report(&args.prompt, &diff));
        return Ok(());
    }

    let theme = theme::Theme::from_name(config.theme_name());
    state.last_modified = modified_time(&args.current);

    let db_path = Path::new(DATA_DIR).join("texrev.db");
    let db = db::open_db(&db_path.to_string_lossy())
        .await
        .map_err(std::io::Error::other)?;
    record_review(&db, &mut state, &document_key(&args.current), &args.prompt).await;

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    info!(path = %args.current.display(), view = view.label(), alignment = alignment.label(), "review started");

    // Exits only via `break` so `restore_tui()` below always runs.
    let mut result = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let action = match maybe_event {
                    Some(event::AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            error!(error = %e, "draw failed");
                            result = Err(e);
                            break 'event_loop;
                        }
                        KeyAction::Continue
                    }
                    Some(event::AppEvent::Key(key)) => handle_key(key, &mut state),
                    Some(event::AppEvent::Mouse(mouse)) => handle_mouse(mouse, &mut state),
                    Some(event::AppEvent::Tick) => {
                        reload_if_changed(&db, &mut state, &args.current).await;
                        KeyAction::Continue
                    }
                    // ratatui picks up the new size on the next Render.
                    Some(event::AppEvent::Resize(_, _)) => KeyAction::Continue,
                    None => break 'event_loop,
                };
                match action {
                    KeyAction::Continue => {}
                    KeyAction::Accept => write_accepted(&db, &mut state, &args.current).await,
                    KeyAction::Rejected => record_rejection(&db, &mut state).await,
                    KeyAction::Quit => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    if state.session.is_pending() {
        info!("quit with suggestion still pending");
    }
    result
}

/// Stable key for the document row: the canonical path when it resolves.
fn document_key(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .into_owned()
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Stores the document and the pending suggestion. Failures are logged and
/// shown in the status bar; the review works without the store.
async fn record_review(db: &Connection, state: &mut AppState, key: &str, prompt: &str) {
    let Some(suggested_text) = state.session.pending().map(|s| s.suggested_text.clone()) else {
        return;
    };
    let stored = async {
        let doc = db::detect_or_create_document(db, key, state.document.text()).await?;
        let suggestion_id = db::record_suggestion(db, &doc.id, prompt, &suggested_text).await?;
        Ok::<_, tokio_rusqlite::Error>((doc.id, suggestion_id))
    }
    .await;
    match stored {
        Ok((document_id, suggestion_id)) => {
            debug!(document_id = %document_id, suggestion_id = %suggestion_id, "review recorded");
            state.document_id = Some(document_id);
            state.suggestion_id = Some(suggestion_id);
        }
        Err(e) => {
            warn!(error = %e, "could not record review in the database");
            state.status_message = Some(format!("Database unavailable: {e}"));
        }
    }
}

/// Writes the pending suggestion to disk, then applies it and marks it
/// accepted. A failed write leaves the document and the session untouched so
/// the user can retry or reject.
async fn write_accepted(db: &Connection, state: &mut AppState, path: &Path) {
    let Some(text) = state.session.pending().map(|s| s.suggested_text.clone()) else {
        return;
    };
    if let Err(e) = tokio::fs::write(path, &text).await {
        error!(path = %path.display(), error = %e, "could not write accepted suggestion");
        state.status_message = Some(format!("Write failed, suggestion kept: {e}"));
        return;
    }
    state.accept();
    state.last_modified = modified_time(path);
    info!(path = %path.display(), bytes = text.len(), "accepted suggestion written");

    if let Some(id) = state.suggestion_id.take() {
        if let Err(e) = db::resolve_suggestion(db, &id, Resolution::Accepted).await {
            warn!(suggestion_id = %id, error = %e, "could not mark suggestion accepted");
        }
    }
}

async fn record_rejection(db: &Connection, state: &mut AppState) {
    if let Some(id) = state.suggestion_id.take() {
        if let Err(e) = db::resolve_suggestion(db, &id, Resolution::Rejected).await {
            warn!(suggestion_id = %id, error = %e, "could not mark suggestion rejected");
        }
    }
}

/// Reloads the document when its mtime moved, e.g. after an external edit.
async fn reload_if_changed(db: &Connection, state: &mut AppState, path: &Path) {
    let modified = modified_time(path);
    if modified.is_none() || modified == state.last_modified {
        return;
    }
    state.last_modified = modified;

    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not reload document");
            return;
        }
    };
    if !state.reload(text) {
        return;
    }
    debug!(path = %path.display(), revision = state.document.revision(), "document reloaded from disk");

    if let Some(id) = state.document_id.clone() {
        if let Err(e) = db::update_document_content(db, &id, state.document.text()).await {
            warn!(document_id = %id, error = %e, "could not sync reloaded document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texrev_core::types::SuggestionStatus;

    use crate::app::View;

    async fn reviewing(dir: &Path) -> (Connection, AppState) {
        let db = db::open_db(&dir.join("texrev.db").to_string_lossy()).await.unwrap();
        let mut state = AppState::new(Document::new("main.tex", "T"), View::Split, Alignment::Positional);
        state.session.propose("S", "rewrite");
        let key = dir.join("main.tex").to_string_lossy().into_owned();
        record_review(&db, &mut state, &key, "rewrite").await;
        (db, state)
    }

    #[tokio::test]
    async fn failed_write_keeps_suggestion_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (db, mut state) = reviewing(dir.path()).await;

        // A directory cannot be written as a file.
        write_accepted(&db, &mut state, dir.path()).await;

        assert_eq!(state.document.text(), "T");
        assert_eq!(state.document.revision(), 0);
        assert!(state.session.is_pending());
        assert!(state.diff().is_some());
        assert!(state.suggestion_id.is_some());
        assert!(state.status_message.as_deref().is_some_and(|m| m.starts_with("Write failed")));
    }

    #[tokio::test]
    async fn accept_writes_file_then_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let (db, mut state) = reviewing(dir.path()).await;
        let path = dir.path().join("main.tex");
        let document_id = state.document_id.clone().unwrap();

        write_accepted(&db, &mut state, &path).await;

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "S");
        assert_eq!(state.document.text(), "S");
        assert!(!state.session.is_pending());
        assert!(state.suggestion_id.is_none());
        assert!(state.last_modified.is_some());

        let stored = db::load_suggestions(&db, &document_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, SuggestionStatus::Accepted);
    }
}
