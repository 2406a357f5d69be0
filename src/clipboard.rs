/*!
 * Clipboard support for srcmerge
 *
 * Copies the generated document to the system clipboard by piping it into
 * the first available clipboard command for the current platform.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the clipboard command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Clipboard providers, in order of preference
#[derive(Debug, Clone, Copy)]
enum Provider {
    /// tmux buffer (preferred when running inside tmux)
    Tmux,
    /// Wayland clipboard
    Wayland,
    /// X11 clipboard with xsel
    Xsel,
    /// X11 clipboard with xclip
    Xclip,
    /// macOS clipboard
    MacOs,
    /// Windows clipboard (also via WSL)
    Windows,
    /// Termux clipboard
    Termux,
}

const PROVIDERS: [Provider; 7] = [
    Provider::Tmux,
    Provider::Wayland,
    Provider::Xsel,
    Provider::Xclip,
    Provider::MacOs,
    Provider::Windows,
    Provider::Termux,
];

impl Provider {
    fn command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::MacOs => ("pbcopy", &[]),
            Self::Windows => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }

    fn available(&self) -> bool {
        match self {
            Self::Tmux => env::var("TMUX").is_ok() && command_exists("tmux"),
            Self::Wayland => cfg!(target_os = "linux") && command_exists("wl-copy"),
            Self::Xsel => cfg!(target_os = "linux") && command_exists("xsel"),
            Self::Xclip => cfg!(target_os = "linux") && command_exists("xclip"),
            Self::MacOs => cfg!(target_os = "macos") && command_exists("pbcopy"),
            Self::Windows => {
                (cfg!(target_os = "windows") || env::var("WSL_DISTRO_NAME").is_ok())
                    && command_exists("clip.exe")
            }
            Self::Termux => cfg!(target_os = "android") && command_exists("termux-clipboard-set"),
        }
    }
}

/// Copy text to the system clipboard
///
/// Picks the first available provider and pipes the text into it.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let provider = PROVIDERS
        .iter()
        .find(|p| p.available())
        .ok_or(ClipboardError::NoClipboardFound)?;
    let (cmd, args) = provider.command();
    pipe_into(cmd, args, text)
}

/// Check if a command exists on the PATH
pub fn command_exists(command: &str) -> bool {
    if let Ok(paths) = env::var("PATH") {
        for path in paths.split(':') {
            if Path::new(path).join(command).exists() {
                return true;
            }
        }
    }
    false
}

/// Spawn a command and write `text` to its stdin
fn pipe_into(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to spawn {}", cmd)))?;

    let stdin = child.stdin.as_mut().ok_or_else(|| {
        ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
    })?;
    stdin.write_all(text.as_bytes())?;

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}
