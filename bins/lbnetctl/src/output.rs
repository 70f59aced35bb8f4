//! Text/JSON output for command results.

use std::io::{self, Write};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    /// Pretty print (for JSON).
    pub pretty: bool,
}

/// Types that can be printed.
pub trait Printable {
    /// Print as plain text.
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()>;

    /// Convert to JSON value.
    fn to_json(&self) -> serde_json::Value;

    /// Print in the configured format.
    fn print<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> io::Result<()> {
        match opts.format {
            OutputFormat::Text => self.print_text(w),
            OutputFormat::Json => {
                let json = self.to_json();
                if opts.pretty {
                    serde_json::to_writer_pretty(&mut *w, &json)?;
                } else {
                    serde_json::to_writer(&mut *w, &json)?;
                }
                writeln!(w)?;
                Ok(())
            }
        }
    }
}

/// Print one result to stdout.
pub fn print<T: Printable>(item: &T, opts: &OutputOptions) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    item.print(&mut stdout, opts)
}

/// Result of an ensure/delete operation.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub target: String,
    pub state: &'static str,
    /// Whether the target was already in `state`, when the operation can tell.
    pub already: Option<bool>,
}

impl Outcome {
    pub fn new(target: impl Into<String>, state: &'static str) -> Self {
        Self {
            target: target.into(),
            state,
            already: None,
        }
    }

    pub fn already(mut self, already: bool) -> Self {
        self.already = Some(already);
        self
    }
}

impl Printable for Outcome {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self.already {
            Some(true) => writeln!(w, "{}: already {}", self.target, self.state),
            Some(false) => writeln!(w, "{}: now {}", self.target, self.state),
            None => writeln!(w, "{}: {}", self.target, self.state),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "target": self.target,
            "state": self.state,
            "already": self.already,
        })
    }
}

/// A list printed one entry per line, or as a JSON array.
pub struct Lines<T>(pub Vec<T>);

impl<T: std::fmt::Display + serde::Serialize> Printable for Lines<T> {
    fn print_text<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for item in &self.0 {
            writeln!(w, "{item}")?;
        }
        Ok(())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }
}
