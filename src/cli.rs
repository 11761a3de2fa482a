use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// FACEIT level cache for game servers
///
/// Runs the rating service and reads host events from stdin, one per line:
///
/// - `connect <steamid64>` / `disconnect <steamid64>`
/// - `<toggle command> <steamid64>` (e.g. `!faceit 76561198000000001`)
/// - `status <steamid64>`
/// - `flush`
/// - `quit`
///
/// Ctrl-C or end of input shuts down after a final save.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Path to the TOML config file. Defaults to the platform config directory.
    #[arg(long = "config", short = 'c', help_heading = "Configuration")]
    pub config: Option<String>,

    /// List current configuration settings and exit
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Log at debug level and mirror logs to stdout.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}
