use std::io::{self, BufRead};

/// Where the next line comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Typed at the prompt.
    Fresh(String),
    /// Taken from history at this chronological offset.
    Replay(usize),
}

/// Reads one line without its line break. `None` at end of input.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();

    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
    }

    Ok(Some(line))
}
