//! Main TUI application loop, grounded on the teacher's `App::run`.

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use tokio::sync::mpsc;

use crate::api::types::{ServicesResponse, WsFrame};

use super::config::Config;
use super::state::AppState;
use super::ui;
use super::websocket::WebSocketClient;

pub struct App {
    config: Config,
    state: AppState,
    ws_rx: mpsc::UnboundedReceiver<WsFrame>,
    http_client: reqwest::Client,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        let ws_client = WebSocketClient::new(&config.api_url);
        let ws_rx = ws_client.connect();

        Ok(Self {
            state: AppState::new(),
            config,
            ws_rx,
            http_client,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.refresh_services().await;

        let result = self.run_event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        result
    }

    async fn refresh_services(&mut self) {
        let url = format!("{}/api/v1/services", self.config.api_url);
        match self.http_client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<ServicesResponse>().await {
                    Ok(parsed) => {
                        self.state.replace_services(parsed.services);
                        self.state.error_message = None;
                    }
                    Err(e) => {
                        self.state.error_message = Some(format!("failed to parse services: {e}"));
                    }
                }
            }
            Ok(response) => {
                self.state.error_message = Some(format!("API error: {}", response.status()));
            }
            Err(e) => {
                self.state.error_message = Some(format!("connection failed: {e}"));
            }
        }
    }

    async fn run_event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let mut last_refresh = std::time::Instant::now();

        loop {
            terminal.draw(|f| ui::render(f, &self.state))?;

            while let Ok(frame) = self.ws_rx.try_recv() {
                self.state.apply_frame(frame);
            }

            if event::poll(std::time::Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && self.handle_key_event(key.code).await?
            {
                break;
            }

            if last_refresh.elapsed().as_secs() >= self.config.refresh_interval_secs {
                self.refresh_services().await;
                last_refresh = std::time::Instant::now();
            }
        }

        Ok(())
    }

    async fn handle_key_event(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(true),
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.state.select_previous(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_services().await,
            _ => {}
        }
        Ok(false)
    }
}
