use std::io::Write;

use crate::collaborators::Renderer;
use crate::transcript::{format_clock, TranscriptSequence};

// @module: Terminal rendering of transcripts and the active line

/// Placeholder shown when a unit has no timed lines
pub const NO_TRANSCRIPT_MESSAGE: &str = "No transcript data";

/// Renderer that writes to a terminal (or any writer)
pub struct ConsoleRenderer<W: Write> {
    out: W,
    // @field: Copy of the loaded lines, needed to print activations
    transcript: TranscriptSequence,
    // @field: Print the full listing when a transcript loads
    show_listing: bool,
}

impl ConsoleRenderer<std::io::Stdout> {
    /// Renderer printing to stdout
    pub fn stdout(show_listing: bool) -> Self {
        Self::new(std::io::stdout(), show_listing)
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, show_listing: bool) -> Self {
        ConsoleRenderer {
            out,
            transcript: TranscriptSequence::empty(),
            show_listing,
        }
    }

    /// Consume the renderer and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        // A closed terminal is not worth failing playback over.
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }
}

/// Numbered listing of a transcript, translation indented under each line
pub fn render_listing(sequence: &TranscriptSequence) -> String {
    if sequence.is_empty() {
        return NO_TRANSCRIPT_MESSAGE.to_string();
    }

    let mut listing = String::new();
    for (index, line) in sequence.iter().enumerate() {
        listing.push_str(&format!(
            "{:>3}  [{}] {}\n",
            index + 1,
            format_clock(line.time),
            line.primary_text
        ));
        if let Some(secondary) = &line.secondary_text {
            listing.push_str(&format!("{:>3}  {:>6}  {}\n", "", "", secondary));
        }
    }
    listing
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn on_transcript_loaded(&mut self, sequence: &TranscriptSequence) {
        self.transcript = sequence.clone();
        if self.show_listing {
            let listing = render_listing(sequence);
            self.write_line(listing.trim_end());
        }
    }

    fn on_line_activated(&mut self, index: Option<usize>) {
        let Some(index) = index else {
            return;
        };
        let Some(line) = self.transcript.get(index).cloned() else {
            return;
        };

        let mut text = format!("▶ {:>3} [{}] {}", index + 1, format_clock(line.time), line.primary_text);
        if let Some(secondary) = &line.secondary_text {
            text.push_str(&format!("\n        {}", secondary));
        }
        self.write_line(&text);
    }

    fn on_no_transcript(&mut self) {
        self.transcript = TranscriptSequence::empty();
        self.write_line(NO_TRANSCRIPT_MESSAGE);
    }
}
