//! Terminal and multiplexer detection from environment variables.

use std::env;

/// The kind of terminal emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TerminalKind {
    /// iTerm2 on macOS.
    ITerm2,
    /// Kitty terminal.
    Kitty,
    /// Alacritty terminal.
    Alacritty,
    /// WezTerm terminal.
    WezTerm,
    /// macOS Terminal.app.
    TerminalApp,
    /// Windows Terminal.
    WindowsTerminal,
    /// Xterm or compatible.
    Xterm,
    /// VTE-based terminal (GNOME Terminal, Tilix, etc.).
    VTE,
    /// Unknown or undetected terminal.
    Unknown,
}

/// The kind of terminal multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MultiplexerKind {
    /// Tmux multiplexer.
    Tmux,
    /// GNU Screen multiplexer.
    Screen,
    /// Zellij multiplexer.
    Zellij,
    /// No multiplexer detected.
    None,
}

/// Combined information about the terminal environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalInfo {
    /// The detected terminal emulator.
    pub kind: TerminalKind,
    /// The detected multiplexer, if any.
    pub multiplexer: MultiplexerKind,
    /// The version string, if available.
    pub version: Option<String>,
}

/// Detect the terminal emulator from environment variables.
pub fn detect_terminal() -> TerminalKind {
    let term_program = env::var("TERM_PROGRAM").ok();
    let term = env::var("TERM").ok();
    let wt_session = env::var("WT_SESSION").ok();
    let vte_version = env::var("VTE_VERSION").ok();

    detect_terminal_from_vars(
        term_program.as_deref(),
        term.as_deref(),
        wt_session.as_deref(),
        vte_version.as_deref(),
    )
}

fn detect_terminal_from_vars(
    term_program: Option<&str>,
    term: Option<&str>,
    wt_session: Option<&str>,
    vte_version: Option<&str>,
) -> TerminalKind {
    if let Some(program) = term_program {
        match program {
            "iTerm.app" => return TerminalKind::ITerm2,
            "Apple_Terminal" => return TerminalKind::TerminalApp,
            "WezTerm" => return TerminalKind::WezTerm,
            _ => {}
        }
    }

    if wt_session.is_some() {
        return TerminalKind::WindowsTerminal;
    }

    if vte_version.is_some() {
        return TerminalKind::VTE;
    }

    if let Some(term_value) = term {
        if term_value.contains("kitty") {
            return TerminalKind::Kitty;
        }
        if term_value.contains("alacritty") {
            return TerminalKind::Alacritty;
        }
        if term_value.starts_with("xterm") {
            return TerminalKind::Xterm;
        }
    }

    TerminalKind::Unknown
}

/// Detect the terminal multiplexer from environment variables.
pub fn detect_multiplexer() -> MultiplexerKind {
    let tmux = env::var("TMUX").ok();
    let sty = env::var("STY").ok();
    let zellij = env::var("ZELLIJ").ok();

    detect_multiplexer_from_vars(tmux.as_deref(), sty.as_deref(), zellij.as_deref())
}

fn detect_multiplexer_from_vars(
    tmux: Option<&str>,
    sty: Option<&str>,
    zellij: Option<&str>,
) -> MultiplexerKind {
    if tmux.is_some() {
        return MultiplexerKind::Tmux;
    }
    if sty.is_some() {
        return MultiplexerKind::Screen;
    }
    if zellij.is_some() {
        return MultiplexerKind::Zellij;
    }
    MultiplexerKind::None
}

/// Detect terminal and multiplexer information in one call.
pub fn detect() -> TerminalInfo {
    let kind = detect_terminal();
    let multiplexer = detect_multiplexer();
    let version = env::var("TERM_PROGRAM_VERSION").ok();

    TerminalInfo {
        kind,
        multiplexer,
        version,
    }
}
