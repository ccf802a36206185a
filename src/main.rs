mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keytempo::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    paragraph::{FixedParagraphSource, HttpParagraphSource, ParagraphSource},
    runtime::{spawn_load, AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{SessionState, TestSession, Update},
    timer::TimerConfig,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::{mpsc::Sender, Arc},
    time::Instant,
};
use tracing::info;

/// typing speed test against paragraphs from a remote service
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing speed test for the terminal. Fetches a paragraph, scores every keystroke live and reports wpm, accuracy and errors when the clock runs out."
)]
pub struct Cli {
    /// paragraph endpoint answering with {"paragraph": "..."}
    #[clap(short = 'u', long)]
    url: Option<String>,

    /// test length in seconds, or unbounded to count up until stopped
    #[clap(short = 't', long, value_enum)]
    time: Option<TimerConfig>,

    /// custom paragraph to type instead of fetching one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// write the effective endpoint and duration to the config file
    #[clap(long)]
    save_config: bool,

    /// log at debug level
    #[clap(long)]
    debug: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Quit,
}

/// What the loop should do after an event
#[derive(Debug, PartialEq, Eq)]
enum LoopStep {
    Redraw,
    Skip,
    Quit,
}

pub struct App {
    pub session: TestSession,
    source: Arc<dyn ParagraphSource>,
}

impl App {
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let source: Arc<dyn ParagraphSource> = match &cli.prompt {
            Some(prompt) => Arc::new(FixedParagraphSource::new(prompt.clone())),
            None => Arc::new(HttpParagraphSource::new(config.endpoint_url.clone())),
        };

        Self {
            session: TestSession::new(config.timer),
            source,
        }
    }

    /// New paragraph, fetched off the event loop
    fn restart(&mut self, tx: Sender<AppEvent>) {
        let ticket = self.session.restart();
        spawn_load(Arc::clone(&self.source), ticket, tx);
    }

    fn on_key(&mut self, key: KeyEvent, tx: &Sender<AppEvent>) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }

        match key.code {
            KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyOutcome::Quit
            }
            KeyCode::Tab => self.restart(tx.clone()),
            KeyCode::Enter => match self.session.state() {
                SessionState::Running => {
                    self.session.stop();
                }
                SessionState::Finished => self.restart(tx.clone()),
                SessionState::Idle => {}
            },
            KeyCode::Up => {
                let next = self.session.timer_config().next();
                self.session.select_timer(next);
            }
            KeyCode::Down => {
                let prev = self.session.timer_config().prev();
                self.session.select_timer(prev);
            }
            KeyCode::Backspace => {
                self.session.backspace();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.session.type_char(c);
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    /// Advance the clock, then dispatch one event. The clock moves on every
    /// wake-up: a steady stream of keys never lets the poll time out.
    fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &Sender<AppEvent>,
        now: Instant,
    ) -> LoopStep {
        let clock = self.session.poll_timer(now);

        let changed = match event {
            AppEvent::Tick => false,
            AppEvent::Resize => true,
            AppEvent::Loaded(ticket, result) => {
                self.session.on_paragraph_loaded(ticket, result)
            }
            AppEvent::Key(key) => {
                if self.on_key(key, tx) == KeyOutcome::Quit {
                    return LoopStep::Quit;
                }
                true
            }
        };

        if changed || clock != Update::Ignored {
            LoopStep::Redraw
        } else {
            LoopStep::Skip
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = logging::setup_logging(&AppDirs::log_dir(), cli.debug)?;

    let store = FileConfigStore::new();
    let config = store.load().merged(cli.url.clone(), cli.time);
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli, &config);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let tx = runner.sender();

    app.restart(tx.clone());
    terminal.draw(|f| ui(app, f))?;

    loop {
        match app.handle_event(runner.step(), &tx, Instant::now()) {
            LoopStep::Quit => break,
            LoopStep::Redraw => {
                terminal.draw(|f| ui(app, f))?;
            }
            LoopStep::Skip => {}
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
