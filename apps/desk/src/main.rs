mod api_client;
mod autosave;
mod book;
mod config;
mod errors;
mod models;
mod present;
mod state;
mod viewer;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::{ApiError, Operation};
use crate::state::DeskState;
use crate::viewer::{CanvasViewer, Key, KeyAction, ScaleMode, Viewport, DEFAULT_CONTAINER};

#[derive(Parser, Debug)]
#[command(name = "talent-desk", version, about = "Browse talents, keep interview notes and read resumes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List talents, optionally filtered by a search query
    List {
        #[arg(long)]
        query: Option<String>,

        /// Order by average score instead of server order
        #[arg(long)]
        by_score: bool,
    },

    /// Show one talent's details and resume status
    Show { phone: String },

    /// Edit a talent's interview note from stdin; each line is appended and auto-saved
    Note {
        phone: String,

        /// Treat input as pasted text
        #[arg(long)]
        paste: bool,
    },

    /// Re-extract a talent's data from the stored resume
    Reparse { phone: String },

    /// Upload one or more PDF resumes
    Upload {
        #[arg(required = true, value_name = "PATH")]
        files: Vec<PathBuf>,
    },

    /// Recalculate every talent's scores
    Recalc,

    /// Render a talent's resume page by page
    Pages {
        phone: String,

        /// Zoom: `fit` for container width, or a number such as 1.5 or 150%
        #[arg(long, default_value = "fit")]
        scale: ScaleMode,

        /// Container width in CSS pixels
        #[arg(long, default_value_t = DEFAULT_CONTAINER.width)]
        width: f32,

        /// Container height in CSS pixels
        #[arg(long, default_value_t = DEFAULT_CONTAINER.height)]
        height: f32,

        /// Navigation keys to replay, e.g. `down,down,end`
        #[arg(long, value_delimiter = ',')]
        keys: Vec<Key>,

        /// Zoom to switch to after the keys are replayed
        #[arg(long)]
        rescale: Option<ScaleMode>,

        /// Container width to resize to after the keys are replayed
        #[arg(long)]
        resize: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut desk = DeskState::new(config).map_err(failed(Operation::LoadTalents))?;
    info!("Talent desk v{} against {}", env!("CARGO_PKG_VERSION"), desk.client.base_url());

    match cli.command {
        Command::List { query, by_score } => {
            let mut talents = desk
                .load_talents(query.as_deref())
                .await
                .map_err(failed(Operation::LoadTalents))?;
            if by_score {
                talents = desk.book.sorted_by_score().await;
            }
            if talents.is_empty() {
                println!("No talents found");
            }
            for talent in &talents {
                println!("{}\n", present::talent_card(talent));
            }
        }
        Command::Show { phone } => {
            let session = desk
                .open_talent(&phone)
                .await
                .map_err(failed(Operation::LoadTalents))?;
            println!("{}", present::talent_detail(&session.talent));
            println!("\nInterview note:\n{}", session.talent.interview_record);
            println!("\nResume: {:?}", desk.viewer.status());
            if let Some(url) = desk.viewer.current_url() {
                println!("Source: {url}");
            }
            if let Some(frame) = desk.viewer.frame() {
                println!("Frame:  {:?}", frame.state());
            }
            if let Some(canvas) = desk.viewer.canvas().filter(|c| c.is_loaded()) {
                println!("Page:   {}", canvas.nav_state().indicator());
            }
            desk.close_talent().await;
        }
        Command::Note { phone, paste } => edit_note(&mut desk, &phone, paste).await?,
        Command::Reparse { phone } => {
            desk.open_talent(&phone)
                .await
                .map_err(failed(Operation::LoadTalents))?;
            let talent = desk
                .reparse_current()
                .await
                .map_err(failed(Operation::ReparseResume))?;
            println!("Resume reparsed\n{}", present::talent_detail(&talent));
            desk.close_talent().await;
        }
        Command::Upload { files } => {
            let report = desk.upload(&files).await.map_err(failed(Operation::Upload))?;
            println!("{}", present::upload_report(&report));
            if let Some(talent) = report.focus_talent() {
                println!("\n{}", present::talent_card(talent));
            }
        }
        Command::Recalc => {
            let summary = desk
                .recalculate()
                .await
                .map_err(failed(Operation::Recalculate))?;
            println!("{}", present::recalc_report(&summary));
        }
        Command::Pages {
            phone,
            scale,
            width,
            height,
            keys,
            rescale,
            resize,
        } => {
            let container = Viewport { width, height };
            let after = Rescale {
                scale: rescale,
                width: resize,
            };
            show_pages(&desk, &phone, scale, container, &keys, after).await?;
        }
    }

    Ok(())
}

/// Converts an API failure into the message the user sees, keeping the cause.
fn failed(op: Operation) -> impl FnOnce(ApiError) -> anyhow::Error {
    move |e| {
        let message = e.user_message(op);
        anyhow::Error::new(e).context(message)
    }
}

async fn edit_note(desk: &mut DeskState, phone: &str, paste: bool) -> Result<()> {
    let session = desk
        .open_talent(phone)
        .await
        .map_err(failed(Operation::LoadTalents))?;
    let mut content = session.talent.interview_record.clone();
    let mut status = session.autosave.status();

    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            eprintln!("[{:?}] {current}", current.tone());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&line);

        let Some(session) = desk.detail() else {
            bail!("Note session ended unexpectedly");
        };
        if paste {
            session.autosave.paste(content.clone());
        } else {
            session.autosave.edit(content.clone());
        }
    }

    let status = desk.close_talent().await;
    let _ = watcher.await;
    match status {
        Some(status) if status.is_error() => bail!("Note not saved: {status}"),
        Some(status) => println!("{status}"),
        None => {}
    }
    Ok(())
}

/// Zoom or container changes applied once navigation has been replayed.
#[derive(Debug, Clone, Copy)]
struct Rescale {
    scale: Option<ScaleMode>,
    width: Option<f32>,
}

async fn show_pages(
    desk: &DeskState,
    phone: &str,
    scale: ScaleMode,
    container: Viewport,
    keys: &[Key],
    after: Rescale,
) -> Result<()> {
    desk.load_talents(None)
        .await
        .map_err(failed(Operation::LoadTalents))?;
    let Some(talent) = desk.book.get(phone).await else {
        bail!("Talent {phone} not found");
    };
    let Some(path) = talent.resume() else {
        bail!("{} has no resume file", talent.name);
    };

    let bytes = desk
        .client
        .fetch_resume(path)
        .await
        .map_err(failed(Operation::LoadResume))?;

    let mut viewer: CanvasViewer =
        CanvasViewer::new(scale, desk.config.device_pixel_ratio, container);
    viewer.open(&bytes)?;
    print_layout(&viewer);

    for key in keys {
        match viewer.handle_key(*key, true) {
            KeyAction::Handled(Some(request)) => {
                viewer.on_scroll(request.top);
                viewer.on_animation_frame();
            }
            KeyAction::Handled(None) | KeyAction::Ignored => {}
        }
        let nav = viewer.nav_state();
        println!(
            "{key:?}: page {}  prev {}  next {}",
            nav.indicator(),
            if nav.prev_enabled { "on" } else { "off" },
            if nav.next_enabled { "on" } else { "off" }
        );
    }

    let mut changed = false;
    if let Some(width) = after.width {
        let resized = viewer.resize(Viewport {
            width,
            height: container.height,
        });
        if resized.is_none() {
            println!("Resize to {width}: fixed zoom, pages unchanged");
        }
        changed = true;
    }
    if let Some(scale) = after.scale {
        viewer.set_scale(scale);
        changed = true;
    }
    if changed {
        println!();
        print_layout(&viewer);
    }

    Ok(())
}

fn print_layout(viewer: &CanvasViewer) {
    for slot in viewer.slots() {
        if let Some(canvas) = viewer.canvas(slot.page) {
            println!(
                "{}{} / {}  top {:>7.1}  css {}x{}  backing {}x{}  ops {}  text runs {}",
                if canvas.is_current { '>' } else { ' ' },
                slot.page,
                viewer.page_count(),
                slot.top,
                canvas.css_width,
                canvas.css_height,
                canvas.pixel_width,
                canvas.pixel_height,
                canvas.operation_count(),
                canvas.text_runs()
            );
        }
    }
    println!(
        "scroll {:.1} of {:.1}  visible {:?}  page {}",
        viewer.scroll_top(),
        viewer.content_height(),
        viewer.visible_pages(),
        viewer.nav_state().indicator()
    );
}
