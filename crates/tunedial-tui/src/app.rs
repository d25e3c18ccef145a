//! App — single-threaded browse loop over the outline tree.
//!
//! Each turn draws the current rows, waits briefly for a key, and
//! dispatches it through the keymap. Activation runs synchronously; its
//! progress messages are drawn on the status line before each blocking
//! step proceeds, which is why rendering works from pre-resolved
//! [`RenderedRow`]s rather than the (then mutably borrowed) tree.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use tunedial_opml::config::Config;
use tunedial_opml::favourites::Favourites;
use tunedial_opml::fetch::HttpFetcher;
use tunedial_opml::nav::Navigator;
use tunedial_opml::tree::{PlayCommand, Row, Tree};

use crate::keymap::{Action, Keymap};
use crate::player::Player;
use crate::ui::{self, list_height, RenderedRow};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

pub struct App {
    tree: Tree,
    favourites: Favourites,
    fetcher: HttpFetcher,
    rows: Vec<Row>,
    lines: Vec<RenderedRow>,
    nav: Navigator,
    keymap: Keymap,
    player: Player,
    status: String,
}

impl App {
    pub fn new(config: &Config, tree: Tree, favourites: Favourites, fetcher: HttpFetcher) -> Self {
        Self {
            tree,
            favourites,
            fetcher,
            rows: Vec::new(),
            lines: Vec::new(),
            nav: Navigator::new(0),
            keymap: Keymap::from_config(config),
            player: Player::new(config.playback.command.clone()),
            status: String::new(),
        }
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> anyhow::Result<()> {
        let size = terminal.size()?;
        self.nav = Navigator::new(list_height(size.height));
        self.refresh();

        loop {
            terminal.draw(|f| ui::draw(f, &self.lines, &self.nav, &self.status))?;

            // Short poll so a finished player is noticed without input.
            if event::poll(Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if self.handle_key(key.code, terminal)? {
                            return Ok(());
                        }
                    }
                    Event::Resize(_, height) => {
                        self.nav.resize(&self.rows, list_height(height));
                    }
                    _ => {}
                }
            }

            if self.player.is_active() && !self.player.poll() {
                self.status.clear();
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(
        &mut self,
        code: ratatui::crossterm::event::KeyCode,
        terminal: &mut Tui,
    ) -> anyhow::Result<bool> {
        match self.keymap.lookup(code) {
            Some(Action::Up) => self.nav.move_rel(&self.rows, -1),
            Some(Action::Down) => self.nav.move_rel(&self.rows, 1),
            Some(Action::PageUp) => {
                let page = self.nav.height as isize;
                self.nav.move_rel(&self.rows, -page);
            }
            Some(Action::PageDown) => {
                let page = self.nav.height as isize;
                self.nav.move_rel(&self.rows, page);
            }
            Some(Action::Start) => self.nav.move_to_start(&self.rows),
            Some(Action::End) => self.nav.move_to_end(&self.rows),
            Some(Action::Enter) => self.activate_selected(terminal),
            Some(Action::Left) => {
                // On an expanded branch, collapse it; otherwise jump to
                // the parent row.
                match self.selected_collapsed() {
                    Some(false) => self.activate_selected(terminal),
                    _ => self.nav.move_to_parent(&self.rows),
                }
            }
            Some(Action::Right) => {
                if self.selected_collapsed() == Some(true) {
                    self.activate_selected(terminal);
                }
            }
            Some(Action::Stop) => {
                self.player.stop();
                self.status.clear();
            }
            Some(Action::Favourite) => {
                if let Some(row) = self.nav.selected(&self.rows).copied() {
                    self.favourites.toggle(&mut self.tree, row.id);
                    self.refresh();
                    self.nav.move_rel(&self.rows, 0);
                }
            }
            Some(Action::Exit) => {
                info!("exiting");
                self.player.stop();
                if let Err(e) = self.favourites.persist(&self.tree) {
                    // Non-fatal: report and exit anyway; the favourites
                    // were only in memory this session.
                    warn!("could not save favourites: {e}");
                    eprintln!("could not save favourites: {e}");
                }
                return Ok(true);
            }
            None => {}
        }
        Ok(false)
    }

    fn selected_collapsed(&self) -> Option<bool> {
        self.nav
            .selected(&self.rows)
            .and_then(|row| self.tree.node(row.id).collapsed())
    }

    /// Run the activation protocol for the highlighted row, drawing
    /// each progress message as it arrives.
    fn activate_selected(&mut self, terminal: &mut Tui) {
        let Some(row) = self.nav.selected(&self.rows).copied() else {
            return;
        };

        let lines = &self.lines;
        let nav = &self.nav;
        let result = self.tree.activate(row.id, &self.fetcher, &mut |msg| {
            let _ = terminal.draw(|f| ui::draw(f, lines, nav, msg));
        });

        match result {
            Ok(Some(PlayCommand(args))) => match self.player.play(&args) {
                Ok(()) => {
                    self.status = format!("Playing {}", self.tree.node(row.id).text);
                }
                Err(e) => {
                    warn!("player launch failed: {e:#}");
                    self.status = format!("Error: {e}");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!("activation failed: {e}");
                self.status = format!("Error: {e}");
            }
        }

        self.refresh();
        self.nav.move_rel(&self.rows, 0);
    }

    /// Re-flatten the tree and resolve row display text. Called after
    /// anything that can change the visible rows.
    fn refresh(&mut self) {
        self.rows = self.tree.flatten();
        self.lines = self
            .rows
            .iter()
            .map(|row| RenderedRow {
                depth: row.depth,
                text: self.tree.node(row.id).render(),
            })
            .collect();
    }
}
