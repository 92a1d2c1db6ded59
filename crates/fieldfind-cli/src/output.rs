//! Colored terminal output for command results.
//!
//! Respects `NO_COLOR` and the `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from the `--color` flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer over stdout and stderr.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn styled(stream: &mut StandardStream, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = stream.set_color(&spec);
        let _ = write!(stream, "{}", text);
        let _ = stream.reset();
    }

    /// Class header, bold.
    pub fn heading(&mut self, text: &str) {
        Self::styled(&mut self.stdout, text, None, true);
    }

    /// Member name, green bold.
    pub fn member(&mut self, text: &str) {
        Self::styled(&mut self.stdout, text, Some(Color::Green), true);
    }

    /// Secondary detail, cyan.
    pub fn detail(&mut self, text: &str) {
        Self::styled(&mut self.stdout, text, Some(Color::Cyan), false);
    }

    /// Plain text (no color).
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    /// `label: message` on stderr, label in red.
    pub fn failure(&mut self, label: &str, message: &str) {
        Self::styled(&mut self.stderr, label, Some(Color::Red), true);
        let _ = writeln!(self.stderr, ": {}", message);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
        let _ = self.stderr.flush();
    }
}
