//! Line-oriented interactive front end.
//!
//! [`Prompter`] asks for one operation and its arguments and returns them as
//! a [`Request`]; running the request is left to the caller. It is generic
//! over the reader and writer so the whole dialogue can be driven from a
//! byte buffer in tests.
//!
//! Numeric answers are re-asked until they parse and fall inside the allowed
//! range. End of input at any prompt is [`io::ErrorKind::UnexpectedEof`].

use crate::config::{Quality, ScalePercent};
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// The five operations offered by the menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Merge,
    CompressPdf,
    ResizePdf,
    ResizeImage,
    CompressImage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Merge,
        Action::CompressPdf,
        Action::ResizePdf,
        Action::ResizeImage,
        Action::CompressImage,
    ];

    /// Map a menu answer (`"1"`..`"5"`, surrounding whitespace ignored).
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Action::Merge),
            "2" => Some(Action::CompressPdf),
            "3" => Some(Action::ResizePdf),
            "4" => Some(Action::ResizeImage),
            "5" => Some(Action::CompressImage),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Merge => "Merge PDFs",
            Action::CompressPdf => "Compress PDF",
            Action::ResizePdf => "Resize PDF",
            Action::ResizeImage => "Resize image",
            Action::CompressImage => "Compress image",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Action::Merge => "Combines several PDF files into one, in the order given.",
            Action::CompressPdf => {
                "100 keeps every page as is; lower values shrink pages that carry images."
            }
            Action::ResizePdf => "Every page is redrawn at the given percentage of its size.",
            Action::ResizeImage => "Both sides are scaled to the given percentage.",
            Action::CompressImage => "The image is saved as JPEG at the given quality.",
        }
    }
}

/// A fully answered menu dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Merge {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    CompressPdf {
        input: PathBuf,
        output: PathBuf,
        percent: ScalePercent,
    },
    ResizePdf {
        input: PathBuf,
        output: PathBuf,
        percent: ScalePercent,
    },
    ResizeImage {
        input: PathBuf,
        output: PathBuf,
        percent: ScalePercent,
    },
    CompressImage {
        input: PathBuf,
        output: PathBuf,
        quality: Quality,
    },
}

/// Question-and-answer loop over any line source.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Print the menu and collect the arguments of the chosen operation.
    ///
    /// Returns `Ok(None)` when the menu answer is not one of the listed
    /// numbers.
    pub fn request(&mut self) -> io::Result<Option<Request>> {
        let Some(action) = self.choose_action()? else {
            writeln!(self.writer, "Invalid choice. Please enter 1, 2, 3, 4 or 5.")?;
            return Ok(None);
        };
        writeln!(self.writer, "{}", action.hint())?;

        let request = match action {
            Action::Merge => {
                let inputs = self.list("PDF files, separated by commas: ")?;
                let output = self.path("Merged output PDF: ")?;
                Request::Merge { inputs, output }
            }
            Action::CompressPdf => {
                let input = self.path("Input PDF: ")?;
                let output = self.path("Output PDF: ")?;
                let percent = self.percent("Compression level (100 = unchanged, 50 = strong): ")?;
                Request::CompressPdf {
                    input,
                    output,
                    percent,
                }
            }
            Action::ResizePdf => {
                let input = self.path("Input PDF: ")?;
                let output = self.path("Output PDF: ")?;
                let percent = self.percent("Scale percent (e.g. 50 for half size): ")?;
                Request::ResizePdf {
                    input,
                    output,
                    percent,
                }
            }
            Action::ResizeImage => {
                let input = self.path("Source image: ")?;
                let output = self.path("Destination image: ")?;
                let percent = self.percent("Scale percent (e.g. 30 for 30% of the size): ")?;
                Request::ResizeImage {
                    input,
                    output,
                    percent,
                }
            }
            Action::CompressImage => {
                let input = self.path("Source image: ")?;
                let output = self.path("Destination image: ")?;
                let value = self.number(
                    "Quality (1 = smallest file, 100 = best quality): ",
                    Quality::MIN as u32..=Quality::MAX as u32,
                )?;
                let quality = Quality::new(value).map_err(invalid_data)?;
                Request::CompressImage {
                    input,
                    output,
                    quality,
                }
            }
        };

        Ok(Some(request))
    }

    /// Print the numbered menu and read one answer.
    pub fn choose_action(&mut self) -> io::Result<Option<Action>> {
        writeln!(self.writer)?;
        writeln!(self.writer, "What would you like to do?")?;
        for (i, action) in Action::ALL.iter().enumerate() {
            writeln!(self.writer, "{}. {}", i + 1, action.label())?;
        }
        let answer = self.line("Enter 1, 2, 3, 4 or 5: ")?;
        Ok(Action::from_choice(&answer))
    }

    /// Ask once and return the trimmed answer.
    pub fn line(&mut self, label: &str) -> io::Result<String> {
        write!(self.writer, "{label}")?;
        self.writer.flush()?;

        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input ended while waiting for: {}", label.trim()),
            ));
        }
        Ok(buf.trim().to_string())
    }

    /// Comma-separated paths; blank entries are dropped.
    pub fn list(&mut self, label: &str) -> io::Result<Vec<PathBuf>> {
        let answer = self.line(label)?;
        Ok(answer
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    /// Ask until the answer is an integer inside `range`.
    pub fn number(&mut self, label: &str, range: RangeInclusive<u32>) -> io::Result<u32> {
        loop {
            let answer = self.line(label)?;
            match answer.parse::<u32>() {
                Ok(n) if range.contains(&n) => return Ok(n),
                Ok(_) => writeln!(
                    self.writer,
                    "Please enter a value between {} and {}.",
                    range.start(),
                    range.end()
                )?,
                Err(_) => writeln!(self.writer, "Please enter a valid number.")?,
            }
        }
    }

    fn path(&mut self, label: &str) -> io::Result<PathBuf> {
        Ok(PathBuf::from(self.line(label)?))
    }

    fn percent(&mut self, label: &str) -> io::Result<ScalePercent> {
        let value = self.number(label, ScalePercent::MIN as u32..=ScalePercent::MAX as u32)?;
        ScalePercent::new(value).map_err(invalid_data)
    }
}

fn invalid_data(e: crate::error::PixelPaperError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}
