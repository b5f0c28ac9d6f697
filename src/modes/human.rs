use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::game::{EngineConfig, GameStatus, SnakeEngine};
use crate::input::{InputHandler, KeyAction};
use crate::render::Renderer;

/// Interactive play in the terminal.
///
/// The engine ticks on its own driver thread; this loop only forwards
/// key presses and redraws snapshots.
pub struct HumanMode {
    width: i32,
    height: i32,
    config: EngineConfig,
    engine: SnakeEngine,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    /// Build the engine and start it running
    pub fn new(width: i32, height: i32, config: EngineConfig, caption: &str) -> Result<Self> {
        let engine = Self::start_engine(width, height, &config)?;

        Ok(Self {
            width,
            height,
            config,
            engine,
            renderer: Renderer::new(caption),
            input_handler: InputHandler::new(),
            should_quit: false,
        })
    }

    fn start_engine(width: i32, height: i32, config: &EngineConfig) -> Result<SnakeEngine> {
        let engine = SnakeEngine::with_config(width, height, config.clone())
            .context("Failed to create snake engine")?;
        engine.set_status(GameStatus::Running);
        Ok(engine)
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_loop(&mut terminal).await;

        self.engine.quit_game();
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS; ticking happens on the engine's own thread
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event)?,
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                _ = render_timer.tick() => {
                    let snap = self.engine.snapshot();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snap);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            self.apply(self.input_handler.handle_key_event(key))?;
        }

        Ok(())
    }

    fn apply(&mut self, action: KeyAction) -> Result<()> {
        match action {
            KeyAction::Turn(direction) => self.engine.set_direction(direction),
            KeyAction::TogglePause => self.engine.pause_game(),
            KeyAction::Restart => self.restart()?,
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
        Ok(())
    }

    /// Replace the engine with a fresh running one
    fn restart(&mut self) -> Result<()> {
        let snap = self.engine.snapshot();
        info!(score = snap.score, tick = snap.tick, "restarting game");
        self.engine.quit_game();
        self.engine = Self::start_engine(self.width, self.height, &self.config)?;
        Ok(())
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    fn mode() -> HumanMode {
        HumanMode::new(10, 10, EngineConfig::seeded(5), "Snake").unwrap()
    }

    #[test]
    fn test_starts_running() {
        let mode = mode();
        assert_eq!(mode.engine.status(), GameStatus::Running);
        assert_eq!(mode.engine.score(), 0);
    }

    #[test]
    fn test_key_actions_reach_engine() {
        let mut mode = mode();

        mode.apply(KeyAction::Turn(Direction::Left)).unwrap();
        assert_eq!(mode.engine.direction(), Direction::Left);

        mode.apply(KeyAction::TogglePause).unwrap();
        assert_eq!(mode.engine.status(), GameStatus::Paused);

        mode.apply(KeyAction::Quit).unwrap();
        assert!(mode.should_quit);
    }

    #[test]
    fn test_restart_builds_fresh_engine() {
        let mut mode = mode();
        mode.apply(KeyAction::Turn(Direction::Right)).unwrap();
        mode.engine.set_status(GameStatus::GameOver);

        mode.apply(KeyAction::Restart).unwrap();

        assert_eq!(mode.engine.status(), GameStatus::Running);
        assert_eq!(mode.engine.direction(), Direction::Up);
        assert_eq!(mode.engine.snake_points().len(), 2);
    }

    #[test]
    fn test_rejects_tiny_board() {
        assert!(HumanMode::new(2, 2, EngineConfig::default(), "Snake").is_err());
    }
}
