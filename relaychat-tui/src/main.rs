use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use relaychat_core::{get_log_dir, init_logging, ChatConfig, LogTarget};

use relaychat_tui::app::App;

fn main() -> Result<()> {
    let config = ChatConfig::load().context("Failed to load configuration")?;
    setup_logging(&config)?;

    let mut terminal = setup_terminal(config.tui.mouse_enabled)?;
    let result = run_app(&mut terminal, &config);
    restore_terminal(&mut terminal, config.tui.mouse_enabled)?;

    if let Err(e) = result {
        eprintln!("Application error: {e:#}");
        return Err(e);
    }

    Ok(())
}

/// Logs always go to a file; anything on stderr would tear the screen.
fn setup_logging(config: &ChatConfig) -> Result<()> {
    let default_file = get_log_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("relaychat-tui.log");
    let target = LogTarget::resolve(&config.logging, LogTarget::File(default_file));

    init_logging(&config.logging, target, "relaychat_tui=info,relaychat_core=info")
        .context("Failed to open log file")
}

fn setup_terminal(mouse: bool) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mouse: bool,
) -> Result<()> {
    disable_raw_mode()?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ChatConfig,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut app = App::new(config)?;
        app.run(terminal).await
    })
}
