use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Number of log lines shown while a run is in progress.
pub const TAIL_LINES: usize = 15;

/// Upper bound on how much of the end of a log is read per poll.
pub const TAIL_WINDOW_BYTES: u64 = 16 * 1024;

/// Read the last `lines` lines of a file, looking at no more than `window` bytes from its end.
///
/// A line cut by the start of the window is dropped. Invalid UTF-8 is replaced rather than
/// rejected because fio logs are for people to read.
pub fn tail_lines(path: &Path, lines: usize, window: u64) -> io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let start = len.saturating_sub(window);
    file.seek(SeekFrom::Start(start))?;

    let mut buf = Vec::with_capacity(window.min(len) as usize);
    file.take(window).read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf);

    let mut all = text.lines().collect::<Vec<_>>();
    if start > 0 && !all.is_empty() {
        all.remove(0);
    }

    let skip = all.len().saturating_sub(lines);
    Ok(all[skip..].iter().map(|line| line.to_string()).collect())
}
