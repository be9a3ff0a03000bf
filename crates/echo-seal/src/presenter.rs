//! Terminal rendering of the recording workflow.
//!
//! Replaces a graphical front-end: one status line for the timer and signal
//! meter, plain lines for notices, prompts and listings.

use crate::InputMode;

use std::{
    io::{self, Write},
    time::Instant,
};

use echo_seal_core::{
    RecordingPhase, SealArtifact, SignalFrame, SignalLevel, ToastKind, ToastNotification,
    format_elapsed,
};

/// Columns in the spectrum strip.
const SPECTRUM_WIDTH: usize = 16;
/// Glyphs for bar heights, lowest first.
const BAR_GLYPHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Command summary printed by `help`.
pub const HELP_TEXT: &str = "\
Commands:
  <enter>          start / stop recording, or reset after a result
  record | r       start recording
  stop | s         stop recording
  reset            return to idle after a result
  unseal <path>    decode a seal image
  history | h      list stored seals
  copy <n|id>      copy a seal image to the clipboard
  open <n|id>      open a seal in the default viewer
  delete <n|id>    delete a seal
  help | ?         this text
  quit | q         exit
At a password prompt, type :cancel to abandon.";

/// Renders UI state to a writer.
pub struct Presenter<W: Write> {
    out: W,
    elapsed: u64,
    frame: Option<SignalFrame>,
    status_visible: bool,
    toasts: Vec<ToastNotification>,
}

impl Presenter<io::Stdout> {
    /// Presenter writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Presenter<W> {
    /// Presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            elapsed: 0,
            frame: None,
            status_visible: false,
            toasts: Vec::new(),
        }
    }

    /// Consume the presenter, returning the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Notices that have not yet expired.
    pub fn active_toasts(&self) -> &[ToastNotification] {
        &self.toasts
    }

    /// Forget notices that expired by `now`.
    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    /// Announce a phase change.
    pub fn phase(&mut self, phase: RecordingPhase) -> io::Result<()> {
        match phase {
            RecordingPhase::Idle => {
                self.elapsed = 0;
                self.frame = None;
                self.line("Ready. Press Enter to record.")
            }
            RecordingPhase::Recording => {
                self.elapsed = 0;
                self.line("Recording... press Enter to stop.")
            }
            RecordingPhase::AwaitingCredential => {
                self.line("Recording finished.")?;
                self.prompt(InputMode::SealCredential)
            }
            RecordingPhase::Submitting => self.line("Creating seal..."),
            RecordingPhase::Succeeded => Ok(()),
            RecordingPhase::Failed => self.line("Press Enter to reset."),
        }
    }

    /// Update the timer.
    pub fn elapsed(&mut self, secs: u64) -> io::Result<()> {
        self.elapsed = secs;
        self.status()
    }

    /// Update the signal meter.
    pub fn signal(&mut self, frame: SignalFrame) -> io::Result<()> {
        self.frame = Some(frame);
        self.status()
    }

    /// Show a notice.
    ///
    /// Printed once as a line; while it is active it also trails the status
    /// line.
    pub fn toast(&mut self, toast: ToastNotification) -> io::Result<()> {
        let text = format!("[{}] {}", toast_tag(toast.kind), toast.message);

        self.prune_toasts(Instant::now());
        self.toasts.push(toast);
        self.line(&text)
    }

    /// Report a new seal.
    pub fn sealed(&mut self, artifact: &SealArtifact) -> io::Result<()> {
        self.line(&format!(
            "Seal saved to {}",
            artifact.image_reference().display()
        ))?;
        self.line("Press Enter to reset.")
    }

    /// Print a decoded message.
    pub fn decoded(&mut self, message: &str) -> io::Result<()> {
        self.line("Decoded message:")?;
        self.line(&format!("  {}", message))
    }

    /// Print the history listing.
    pub fn history(&mut self, entries: &[SealArtifact]) -> io::Result<()> {
        if entries.is_empty() {
            return self.line("No seals yet.");
        }

        self.line("Recent seals (newest first):")?;
        for (i, artifact) in entries.iter().enumerate() {
            let created = artifact.created_at().format("%Y-%m-%d %H:%M:%S UTC");
            self.line(&format!("  {:>2}. {}  {}", i + 1, created, artifact.id()))?;
        }
        Ok(())
    }

    /// Print the command summary.
    pub fn help(&mut self) -> io::Result<()> {
        self.line(HELP_TEXT)
    }

    /// Show the prompt for `mode`.
    pub fn prompt(&mut self, mode: InputMode) -> io::Result<()> {
        self.clear_status()?;
        let text = match mode {
            InputMode::Command => "> ",
            InputMode::SealCredential => "Password to seal (:cancel to discard): ",
            InputMode::UnsealCredential => "Password to unseal (:cancel to abort): ",
        };
        write!(self.out, "{}", text)?;
        self.out.flush()
    }

    fn status(&mut self) -> io::Result<()> {
        self.prune_toasts(Instant::now());
        let meter = self.frame.as_ref().map(render_meter).unwrap_or_default();
        write!(
            self.out,
            "\r\x1b[2K● REC {} {}",
            format_elapsed(self.elapsed),
            meter
        )?;
        if let Some(toast) = self.toasts.last() {
            write!(self.out, "  [{}] {}", toast_tag(toast.kind), toast.message)?;
        }
        self.status_visible = true;
        self.out.flush()
    }

    fn clear_status(&mut self) -> io::Result<()> {
        if self.status_visible {
            write!(self.out, "\r\x1b[2K")?;
            self.status_visible = false;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        self.clear_status()?;
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }
}

fn toast_tag(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
        ToastKind::Warning => "warn",
        ToastKind::Info => "info",
    }
}

/// Level label plus a compact spectrum for one frame.
pub fn render_meter(frame: &SignalFrame) -> String {
    let level = match frame.level() {
        SignalLevel::Low => "low ",
        SignalLevel::Medium => "med ",
        SignalLevel::High => "HIGH",
    };
    format!("[{}] {}", level, render_spectrum(&frame.bars))
}

/// Fold the bars into [`SPECTRUM_WIDTH`] columns of block glyphs.
pub fn render_spectrum(bars: &[u8]) -> String {
    if bars.is_empty() {
        return " ".repeat(SPECTRUM_WIDTH);
    }

    let per_column = bars.len().div_ceil(SPECTRUM_WIDTH);
    let mut out: String = bars
        .chunks(per_column)
        .map(|chunk| {
            let peak = chunk.iter().copied().max().unwrap_or(0);
            let idx = usize::from(peak) * (BAR_GLYPHS.len() - 1) / 255;
            BAR_GLYPHS[idx]
        })
        .collect();

    let columns = out.chars().count();
    out.extend(std::iter::repeat_n(' ', SPECTRUM_WIDTH.saturating_sub(columns)));
    out
}
