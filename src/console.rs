use crate::common::parse_value;
use crate::error::Result;
use crate::process::RemoteMemory;
use crate::session::{NarrowingSession, Phase};
use crate::writer::WriteReport;
use std::io::{BufRead, Write};

/// How an interactive run ended
#[derive(Debug)]
pub enum Outcome {
    NotFound,
    Written(WriteReport),
    /// Input ended before anything was written
    Closed,
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    pub fn run<M: RemoteMemory>(&mut self, session: &mut NarrowingSession<'_, M>) -> Result<Outcome> {
        writeln!(self.output, "Which number are you looking for?")?;
        loop {
            let value = match self.read_value()? {
                Some(value) => value,
                None => return Ok(Outcome::Closed),
            };
            let phase = session.submit_value(value)?;
            if session.failed_regions() > 0 || session.skipped_regions() > 0 {
                writeln!(
                    self.output,
                    "({} regions could not be read, {} skipped without read permission)",
                    session.failed_regions(),
                    session.skipped_regions()
                )?;
            }
            match phase {
                Phase::Empty => {
                    writeln!(
                        self.output,
                        "Could not find the value you're looking for..."
                    )?;
                    return Ok(Outcome::NotFound);
                }
                Phase::Converged => {
                    writeln!(self.output, "Converged on {} address(es)!", session.candidate_count())?;
                    break;
                }
                _ => {
                    writeln!(
                        self.output,
                        "Found {} matches! Change the number and input again:",
                        session.candidate_count()
                    )?;
                    writeln!(self.output, "(s) Set values; (c) Continue")?;
                    match self.read_line()? {
                        Some(option) if option.trim() == "s" => {
                            session.force_converge()?;
                            break;
                        }
                        Some(_) => writeln!(self.output, "Which number are you looking for?")?,
                        None => return Ok(Outcome::Closed),
                    }
                }
            }
        }

        if let Some(&first) = session.candidates().first() {
            match session.region_of(first).and_then(|region| region.pathname.as_ref()) {
                Some(path) => writeln!(self.output, "Found value at: {:#x} in {}", first, path)?,
                None => writeln!(self.output, "Found value at: {:#x}", first)?,
            }
        }
        writeln!(self.output, "What do you want to set the value as:")?;
        let value = match self.read_value()? {
            Some(value) => value,
            None => return Ok(Outcome::Closed),
        };
        let report = session.write_value(value)?;
        writeln!(
            self.output,
            "Wrote {} of {} address(es).",
            report.succeeded(),
            report.attempted()
        )?;
        for (address, err) in report.failed() {
            writeln!(self.output, "Could not write {:#x}: {}", address, err)?;
        }
        Ok(Outcome::Written(report))
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Reads lines until one holds an integer, `None` at end of input
    fn read_value(&mut self) -> Result<Option<u64>> {
        while let Some(line) = self.read_line()? {
            if line.trim().is_empty() {
                continue;
            }
            match parse_value(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => writeln!(self.output, "{}, try again:", err)?,
            }
        }
        Ok(None)
    }
}
