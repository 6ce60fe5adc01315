// Best-effort progress reporting to an external display process
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::boxed::Box;
use std::format;
use std::io::{self, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

/// A line-oriented status display.
///
/// Every method is infallible by contract: a sink whose peer has gone away keeps accepting
/// updates and drops them.
pub trait ProgressSink {
    /// Sends one line of status text.
    fn update(&mut self, text: &str);

    /// Sends `round(100 * current / total)` as decimal text. Percentages that are not finite,
    /// e.g. because `total` is zero, are dropped.
    fn update_progress(&mut self, current: f64, total: f64) {
        let percent = (100.0 * current / total).round_ties_even();
        if !percent.is_finite() {
            log::debug!("Dropping progress update {current}/{total}");
            return;
        }
        self.update(&format!("{}", percent as i64));
    }

    /// Releases the peer. Further updates are dropped.
    fn close(&mut self);
}

/// A sink that discards everything, used when no display could be started.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&mut self, _text: &str) {}

    fn close(&mut self) {}
}

/// Writes each update as UTF-8 text followed by a newline and flushes it, swallowing I/O errors.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    writer: Option<W>,
}

impl<W: Write> LineSink<W> {
    /// Wraps `writer`. The writer is flushed and dropped by `close`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    /// Returns the writer, or `None` once the sink is closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    /// Closes the sink and hands back the writer, if it was still open.
    pub fn into_inner(mut self) -> Option<W> {
        self.writer.take()
    }

    fn write_line(writer: &mut W, text: &str) -> io::Result<()> {
        writer.write_all(text.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl<W: Write> ProgressSink for LineSink<W> {
    fn update(&mut self, text: &str) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = Self::write_line(writer, text) {
                log::debug!("Progress peer rejected update: {err}");
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // Flushing a pipe whose reader exited fails with EPIPE
            if let Err(err) = writer.flush() {
                log::debug!("Progress peer rejected final flush: {err}");
            }
        }
    }
}

/// A sink backed by a child process that reads status lines from its stdin.
///
/// Closing the sink closes the pipe, then terminates and reaps the child. Dropping it closes it.
#[derive(Debug)]
pub struct PipeSink {
    child: Option<Child>,
    lines: LineSink<ChildStdin>,
}

impl PipeSink {
    /// Starts `command` with a piped stdin.
    pub fn spawn(command: &mut Command) -> io::Result<Self> {
        let mut child = command.stdin(Stdio::piped()).spawn()?;
        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "progress peer has no stdin",
                ));
            }
        };
        Ok(Self {
            child: Some(child),
            lines: LineSink::new(stdin),
        })
    }

    /// Returns the OS process id of the peer, or `None` once closed.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

impl ProgressSink for PipeSink {
    fn update(&mut self, text: &str) {
        self.lines.update(text);
    }

    fn close(&mut self) {
        self.lines.close();
        if let Some(mut child) = self.child.take() {
            // The peer may have exited on its own already
            if let Err(err) = child.kill() {
                log::debug!("Progress peer already stopped: {err}");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for PipeSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// Starts the display process described by `command`.
///
/// Falls back to a `NullSink` if the process cannot be started, so callers never need to care
/// whether a display is attached.
pub fn spawn_sink(command: &mut Command) -> Box<dyn ProgressSink + Send> {
    match PipeSink::spawn(command) {
        Ok(sink) => {
            log::debug!("Progress peer started with pid {:?}", sink.id());
            Box::new(sink)
        }
        Err(err) => {
            log::warn!("Progress display unavailable ({err}), status updates are discarded");
            Box::new(NullSink)
        }
    }
}
