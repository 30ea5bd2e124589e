use crate::job::Progress;

/// Incremental parser for ffmpeg's `-progress pipe:1` stream.
///
/// The stream is line-oriented `key=value` text, but read boundaries are not
/// guaranteed to align with line boundaries, so the trailing partial line is
/// buffered across feeds and only complete lines are parsed. Keys are handled
/// tolerantly: unknown or malformed values are ignored and the last good value
/// is retained. A `progress=` marker line emits one event built from the
/// retained values.
pub struct ProgressParser {
    total_duration: f64,
    buffer: String,
    elapsed_seconds: f64,
    fps: u32,
}

impl ProgressParser {
    /// `total_duration` comes from the duration probe; 0.0 means unknown and
    /// pins the percentage to 0.
    pub fn new(total_duration: f64) -> Self {
        ProgressParser {
            total_duration,
            buffer: String::new(),
            elapsed_seconds: 0.0,
            fps: 0,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Progress> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = vec![];
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(progress) = self.handle_line(line.trim_end()) {
                events.push(progress);
            }
        }
        events
    }

    fn handle_line(&mut self, line: &str) -> Option<Progress> {
        let parts: Vec<&str> = line.split('=').collect();
        if parts.len() != 2 {
            return None;
        }
        match parts[0] {
            // out_time_ms is microseconds despite the name; out_time_us is
            // the honest alias newer ffmpeg emits alongside it
            "out_time_ms" | "out_time_us" => {
                if let Ok(micros) = parts[1].parse::<i64>() {
                    self.elapsed_seconds = micros.max(0) as f64 / 1_000_000.0;
                }
                None
            },
            "fps" => {
                if let Ok(fps) = parts[1].parse::<f64>() {
                    if fps >= 0.0 {
                        self.fps = fps.round() as u32;
                    }
                }
                None
            },
            "progress" => Some(self.emit()),
            _ => None,
        }
    }

    fn emit(&self) -> Progress {
        let percentage = if self.total_duration > 0.0 {
            let pct = (self.elapsed_seconds / self.total_duration * 100.0).round();
            pct.clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Progress {
            percentage,
            current_time_seconds: self.elapsed_seconds,
            total_time_seconds: self.total_duration,
            fps: self.fps,
        }
    }
}
