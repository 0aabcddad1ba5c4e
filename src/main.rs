//! Terminal preview for template-rendered content blocks.
//!
//! `blockfx page.json` opens the page with every interactive behavior wired:
//! scroll reveal, accordions, tabs, the gallery lightbox, carousels and
//! parallax.  `blockfx --dump page.json` runs the ready pass headless and
//! prints the resulting markers as JSON.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    images::{self, ImageSlot, ImageUpdate},
    state::{ActiveView, AppState},
    timers::TokioScheduler,
};
use crate::core::{
    dom::Document,
    manifest,
    page::Page,
    reveal,
    snapshot::PageSnapshot,
    timer::{ManualScheduler, TimerEvent},
};
use crate::ui::{
    layout::AppLayout, lightbox::LightboxWidget, page_widget::PageWidget, popup, theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Preview interactive content blocks in the terminal")]
struct Cli {
    /// Page manifest (JSON).
    #[arg(required_unless_present = "write_config")]
    page: Option<PathBuf>,

    /// Write the current key bindings to the config file and exit.
    #[arg(long)]
    write_config: bool,

    /// Layout width in columns (defaults to the terminal width, or 80 with `--dump`).
    #[arg(long)]
    width: Option<u16>,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run the ready pass, print the markers as JSON and exit.
    #[arg(long)]
    dump: bool,

    /// With `--dump`: scroll this many rows before capturing.
    #[arg(long, default_value_t = 0.0, requires = "dump")]
    scroll: f64,

    /// With `--dump`: viewport height in rows.
    #[arg(long, default_value_t = 24, requires = "dump")]
    rows: u16,
}

/// How long `--dump` lets staggered reveals settle.  Shorter than the
/// carousel period so the captured slides are the initial ones.
const DUMP_SETTLE: Duration = Duration::from_secs(2);

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── dump mode ─────────

fn dump(cli: &Cli, doc: Document) -> Result<()> {
    let mut sched = ManualScheduler::new();
    let mut page = Page::init(doc, cli.width.unwrap_or(80), cli.rows, &mut sched);
    if cli.scroll > 0.0 {
        page.scroll_to(cli.scroll, &mut sched);
    }

    let mut elapsed = Duration::ZERO;
    while elapsed < DUMP_SETTLE {
        for event in sched.advance(reveal::STAGGER_STEP) {
            page.on_timer(event, &mut sched);
        }
        elapsed += reveal::STAGGER_STEP;
    }

    tracing::debug!(
        clock = ?sched.now(),
        pending = sched.active_count(),
        recurring = sched.recurring_count(),
        "dump: settled"
    );
    let snapshot = PageSnapshot::capture(&page);
    page.teardown();

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &snapshot)?;
    writeln!(out)?;
    Ok(())
}

// ───────────────────────────────────────── interactive ───────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());
    state.viewport = layout.viewport;

    let page = &state.page;
    let title = if page.doc.title.is_empty() {
        " untitled ".to_string()
    } else {
        format!(" {} ", page.doc.title)
    };
    let position = format!(" {:.0}/{:.0} ", page.scroll(), page.max_scroll());
    let block = Block::default()
        .title(title)
        .title_style(Theme::title_style())
        .title_top(Line::from(position).right_aligned())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());

    frame.render_widget(
        PageWidget::new(page).focus(state.focus).block(block),
        layout.page_area,
    );

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );

    let area = frame.area();
    state.lightbox_zones = LightboxWidget {
        page: &state.page,
        images: &state.images,
        focus: state.focus,
    }
    .render_and_hit(area, frame.buffer_mut());

    if state.active_view == ActiveView::Controls {
        frame.render_widget(
            popup::ControlsPopup {
                config: &state.config,
                summary: state.page.summary(),
            },
            area,
        );
    }
}

/// Start decoding the image the viewer shows, once per href.
fn request_viewer_image(state: &mut AppState, tx: &mpsc::UnboundedSender<ImageUpdate>) {
    let Some(href) = state.viewer_href().map(str::to_owned) else {
        return;
    };
    if state.images.contains_key(&href) {
        return;
    }
    if images::is_remote(&href) {
        state.images.insert(href, ImageSlot::Remote);
        return;
    }
    let path = images::resolve(&state.page_dir, &href);
    tracing::debug!(%href, path = %path.display(), "decoding image");
    state.images.insert(href.clone(), ImageSlot::Loading);
    images::spawn_image_load(tx.clone(), href, path);
}

fn apply_image_update(state: &mut AppState, update: ImageUpdate) {
    let slot = match update.result {
        Ok(img) => ImageSlot::Ready(img),
        Err(err) => {
            tracing::warn!(href = %update.href, "{err:#}");
            ImageSlot::Failed(format!("{err:#}"))
        }
    };
    state.images.insert(update.href, slot);
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
    sched: &mut TokioScheduler,
    timer_rx: &mut mpsc::UnboundedReceiver<TimerEvent>,
) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(state.config.tick_ms));
    let (image_tx, mut image_rx) = mpsc::unbounded_channel::<ImageUpdate>();

    loop {
        terminal.draw(|frame| draw(frame, state))?;
        request_viewer_image(state, &image_tx);

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k, sched),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m, sched),
                    AppEvent::Resize(cols, rows) => {
                        let (width, height) = AppLayout::viewport_size(cols, rows);
                        state.page.resize(state.fixed_width.unwrap_or(width), height, sched);
                    }
                    AppEvent::Tick => {}
                }
            }

            Some(event) = timer_rx.recv() => {
                // Batch everything already queued before redrawing.
                state.page.on_timer(event, sched);
                while let Ok(event) = timer_rx.try_recv() {
                    state.page.on_timer(event, sched);
                }
            }

            Some(update) = image_rx.recv() => apply_image_update(state, update),

            else => break,
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    if cli.write_config {
        config::AppConfig::load().save()?;
        eprintln!("wrote {}", config::config_path().display());
        return Ok(());
    }
    let Some(page_path) = cli.page.as_deref() else {
        anyhow::bail!("no page manifest given");
    };

    let doc = manifest::load(page_path)?;
    if cli.dump {
        return dump(&cli, doc);
    }

    let page_dir = page_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let (cols, rows) = crossterm::terminal::size()?;
    let (view_width, view_height) = AppLayout::viewport_size(cols, rows);
    let (mut sched, mut timer_rx) = TokioScheduler::new();
    let page = Page::init(doc, cli.width.unwrap_or(view_width), view_height, &mut sched);
    let mut state = AppState::new(page, page_dir, config::AppConfig::load());
    state.fixed_width = cli.width;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr()))?;

    let result = event_loop(&mut terminal, &mut state, &mut sched, &mut timer_rx).await;

    // ── teardown ──────────────────────────────────────────────
    state.page.teardown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}
