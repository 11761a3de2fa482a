//! Line protocol used by the standalone binary to stand in for a game server.

use faceit_scoreboard::error::AppError;
use faceit_scoreboard::service::RatingService;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::error;

/// One event read from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Connect(u64),
    Disconnect(u64),
    Toggle(u64),
    Status(u64),
    Flush,
    Quit,
    Empty,
    Invalid(String),
}

/// Parses a line like `connect 76561198000000001`.
/// Any of `toggle_commands` (e.g. `!faceit`) maps to [`HostEvent::Toggle`].
pub fn parse_line(line: &str, toggle_commands: &[String]) -> HostEvent {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return HostEvent::Empty;
    };

    match command {
        "flush" => return HostEvent::Flush,
        "quit" | "exit" => return HostEvent::Quit,
        _ => {}
    }

    let steam_id = match parts.next().map(str::parse::<u64>) {
        Some(Ok(id)) => id,
        Some(Err(_)) => return HostEvent::Invalid(format!("Invalid Steam ID in '{line}'")),
        None => return HostEvent::Invalid(format!("'{command}' needs a Steam ID")),
    };

    match command {
        "connect" => HostEvent::Connect(steam_id),
        "disconnect" => HostEvent::Disconnect(steam_id),
        "status" => HostEvent::Status(steam_id),
        c if toggle_commands.iter().any(|t| t == c) => HostEvent::Toggle(steam_id),
        _ => HostEvent::Invalid(format!("Unknown command '{command}'")),
    }
}

/// Dispatches events from `input` until end of input, `quit`, Ctrl-C or a read
/// error, then shuts the service down. Returns the number of players saved by
/// the final flush.
pub async fn run<R>(
    service: &RatingService,
    input: R,
    toggle_commands: &[String],
) -> Result<usize, AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read host input: {e}");
                    None
                }
            },
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse_line(&line, toggle_commands) {
            HostEvent::Connect(steam_id) => {
                // Fire and forget: the refresh runs in the background.
                let _ = service.on_user_active(steam_id);
            }
            HostEvent::Disconnect(steam_id) => service.on_user_inactive(steam_id),
            HostEvent::Toggle(steam_id) => {
                let status = if service.toggle_display(steam_id) {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("[FaceIT_Scoreboard] >> FaceIT level display {status}!");
            }
            HostEvent::Status(steam_id) => println!(
                "{steam_id}: level {} display {} coin {}",
                service.current_rating(steam_id),
                service.should_display(steam_id),
                service.display_coin(steam_id)
            ),
            HostEvent::Flush => match service.flush().await {
                Ok(saved) => println!("Saved {saved} players"),
                Err(e) => println!("Save failed: {e}"),
            },
            HostEvent::Quit => break,
            HostEvent::Empty => {}
            HostEvent::Invalid(message) => println!("{message}"),
        }
    }

    service.shutdown().await
}
