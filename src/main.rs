mod app;
mod config;
mod constants;
mod display;
mod explorer;
mod graphics;
mod handoff;
mod html;
mod input;
mod logging;
mod theme;
mod ui;
mod youtube;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::{Duration, Instant};
use tracing::info;

use app::App;
use config::PrefsStore;
use display::CliDisplayMode;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Thumbnail display mode: 'auto', 'direct', or 'ascii' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// YouTube Data API key; saved to the preferences file for later runs
  #[arg(short = 'k', long)]
  api_key: Option<String>,

  /// Print a shell completion script and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), env!("CARGO_PKG_NAME"), &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = logging::init_tracing()?;
  info!(version = env!("CARGO_PKG_VERSION"), "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let display_mode = display::resolve_display_mode(args.display_mode);
  let mut app = App::new(display_mode, PrefsStore::load(), args.api_key);
  info!(display_mode = display_mode.label(), has_api_key = app.has_api_key(), "app ready");

  loop {
    app.check_pending();
    app.tick(Instant::now());

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key).await;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("exiting");
  Ok(())
}
