//! Reading observation data from comma-separated blocks.
//!
//! One block per variable:
//!
//! ```text
//! variable,observer1,observer2,...
//! @scale,ordinal,Low,Mid,High
//! unit1,A,B,...
//! unit2,,B,...
//! ```
//!
//! The `@scale` directive is optional (`nominal`, `ordinal` with its
//! labels in rank order, or `interval`) and must precede the unit rows.
//! An empty cell is a missing observation. A block ends at an empty line,
//! a line starting with `,`, or the end of input. Lines made only of commas
//! between blocks are skipped, and a unit row without any cells is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use tracing::debug;

use crate::error::{IrrError, Result};
use crate::matrix::{MatrixBuilder, ObservationMatrix};
use crate::types::{Scale, ScaleType};

/// Iterator over the variable blocks of an input stream.
///
/// A malformed block yields an error and the iterator resumes at the next
/// block. An I/O error ends iteration.
pub struct Blocks<R> {
    lines: Lines<R>,
    line: usize,
    in_block: bool,
    done: bool,
}

/// Parse every block of `reader`.
pub fn parse_blocks<R: BufRead>(reader: R) -> Blocks<R> {
    Blocks {
        lines: reader.lines(),
        line: 0,
        in_block: false,
        done: false,
    }
}

/// Open `path` and parse its blocks.
///
/// # Errors
///
/// Fails if the file cannot be opened.
pub fn read_path(path: impl AsRef<Path>) -> Result<Blocks<BufReader<File>>> {
    let file = File::open(path.as_ref())?;
    debug!(path = %path.as_ref().display(), "reading observations");
    Ok(parse_blocks(BufReader::new(file)))
}

fn parse_error(line: usize, message: impl Into<String>) -> IrrError {
    IrrError::Parse {
        line,
        message: message.into(),
    }
}

fn is_block_end(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(',')
}

fn is_separator(line: &str) -> bool {
    line.chars().all(|c| c == ',' || c.is_whitespace())
}

impl<R: BufRead> Blocks<R> {
    fn next_line(&mut self) -> Option<Result<String>> {
        let line = self.lines.next()?;
        self.line += 1;
        Some(line.map_err(IrrError::from))
    }

    /// Consume lines up to and including the end of the current block.
    fn skip_block(&mut self) -> Result<()> {
        while let Some(line) = self.next_line() {
            if is_block_end(&line?) {
                break;
            }
        }
        self.in_block = false;
        Ok(())
    }

    fn read_block(&mut self, header: &str) -> Result<ObservationMatrix> {
        let header_line = self.line;
        let mut cells = header.split(',').map(str::trim);
        let variable = cells.next().unwrap_or_default();
        if variable.is_empty() {
            return Err(parse_error(header_line, "missing variable name"));
        }

        let mut observers: Vec<&str> = cells.collect();
        while observers.last().is_some_and(|o| o.is_empty()) {
            observers.pop();
        }
        if observers.is_empty() {
            return Err(parse_error(header_line, format!("variable {}: no observers", variable)));
        }
        if let Some(i) = observers.iter().position(|o| o.is_empty()) {
            return Err(parse_error(header_line, format!("observer {} has no name", i + 1)));
        }

        let mut builder = MatrixBuilder::new(variable, observers.iter().copied());
        let mut seen_unit = false;

        while let Some(line) = self.next_line() {
            let line = line?;
            if is_block_end(&line) {
                self.in_block = false;
                break;
            }

            if let Some(directive) = line.strip_prefix('@') {
                if seen_unit {
                    return Err(parse_error(self.line, "directive after unit rows"));
                }
                let scale = parse_scale(directive).map_err(|m| parse_error(self.line, m))?;
                builder = builder
                    .scale(scale)
                    .map_err(|e| parse_error(self.line, e.to_string()))?;
                continue;
            }

            let mut cells = line.split(',').map(str::trim);
            let unit = cells.next().unwrap_or_default();
            let values: Vec<Option<&str>> = cells.map(Some).collect();
            if values.iter().flatten().all(|v| v.is_empty()) {
                continue;
            }
            builder
                .push_unit(unit, &values)
                .map_err(|e| parse_error(self.line, e.to_string()))?;
            seen_unit = true;
        }
        self.in_block = false;

        let matrix = builder.build();
        debug!(
            variable = matrix.variable(),
            line = header_line,
            units = matrix.unit_count(),
            observers = matrix.observer_count(),
            "parsed block"
        );
        Ok(matrix)
    }
}

/// Parse `scale,<kind>[,labels...]`.
fn parse_scale(directive: &str) -> std::result::Result<Scale, String> {
    let mut cells = directive.split(',').map(str::trim);
    match cells.next() {
        Some("scale") => {}
        Some(other) => return Err(format!("unknown directive @{}", other)),
        None => return Err("empty directive".to_string()),
    }
    let kind: ScaleType = cells
        .next()
        .ok_or_else(|| "@scale needs a kind".to_string())?
        .parse()?;
    let labels: Vec<String> = cells.filter(|c| !c.is_empty()).map(str::to_string).collect();

    match kind {
        ScaleType::Ordinal if labels.is_empty() => {
            Err("ordinal scale needs its values in rank order".to_string())
        }
        ScaleType::Ordinal => Ok(Scale::Ordinal(labels)),
        _ if !labels.is_empty() => Err(format!("{} scale takes no value list", kind)),
        ScaleType::Nominal => Ok(Scale::Nominal),
        ScaleType::Interval => Ok(Scale::Interval),
    }
}

impl<R: BufRead> Iterator for Blocks<R> {
    type Item = Result<ObservationMatrix>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.in_block {
            if let Err(e) = self.skip_block() {
                self.done = true;
                return Some(Err(e));
            }
        }

        let header = loop {
            match self.next_line()? {
                Ok(line) if is_separator(&line) => continue,
                Ok(line) => break line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        };

        self.in_block = true;
        let result = self.read_block(&header);
        if matches!(result, Err(IrrError::Io(_))) {
            self.done = true;
        }
        Some(result)
    }
}
