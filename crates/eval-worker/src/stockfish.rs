//! Stockfish engine wrapper using UCI protocol (async I/O)

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::debug;

use crate::error::WorkerError;

/// Engine score from the perspective of the side to move in the searched
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns
    Cp(i32),
    /// Mate in N moves (positive = side to move mates)
    Mate(i32),
}

/// Result of a single position search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub score: Score,
    /// Best move in UCI notation; `None` for terminal positions
    pub best_move: Option<String>,
}

/// One Stockfish process, exclusively owned by a single worker.
pub struct Engine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Engine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn spawn(path: &str) -> Result<Self, WorkerError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| WorkerError::Engine(format!("Failed to spawn Stockfish: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| WorkerError::Engine("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| WorkerError::Engine("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        // Initialize UCI
        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        // Configure for analysis
        engine.send("setoption name Threads value 1").await?;
        engine.send("setoption name Hash value 128").await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), WorkerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), WorkerError> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| WorkerError::Engine(format!("Failed to read from Stockfish: {e}")))?;
            if n == 0 {
                return Err(WorkerError::Engine("Stockfish closed its pipe".into()));
            }
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    /// Evaluate a position at fixed depth; score is for the side to move.
    pub async fn evaluate(&mut self, fen: &str, depth: u32) -> Result<SearchResult, WorkerError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;
        self.collect_search().await
    }

    /// Evaluate a position with the search restricted to a single move, so
    /// the score is that of actually playing `uci_move`.
    pub async fn evaluate_move(
        &mut self,
        fen: &str,
        uci_move: &str,
        depth: u32,
    ) -> Result<SearchResult, WorkerError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth} searchmoves {uci_move}"))
            .await?;
        self.collect_search().await
    }

    /// Read info lines until `bestmove`, keeping the last reported score.
    async fn collect_search(&mut self) -> Result<SearchResult, WorkerError> {
        let mut score: Option<Score> = None;
        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| WorkerError::Engine(format!("Failed to read from Stockfish: {e}")))?;
            if n == 0 {
                return Err(WorkerError::Engine("Stockfish died mid-search".into()));
            }
            let trimmed = line.trim();

            if trimmed.starts_with("info") {
                if let Some(s) = parse_score(trimmed) {
                    score = Some(s);
                }
            } else if trimmed.starts_with("bestmove") {
                let best_move = parse_bestmove(trimmed);
                let score = score.ok_or_else(|| {
                    WorkerError::Engine("search finished without reporting a score".into())
                })?;
                return Ok(SearchResult { score, best_move });
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Parse `score cp N` / `score mate N` from an info line
fn parse_score(line: &str) -> Option<Score> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part != "score" {
            continue;
        }
        return match parts.next()? {
            "cp" => parts.next()?.parse().ok().map(Score::Cp),
            "mate" => parts.next()?.parse().ok().map(Score::Mate),
            _ => None,
        };
    }
    None
}

/// Parse the move from a `bestmove` line; `(none)` means a terminal position
fn parse_bestmove(line: &str) -> Option<String> {
    let mv = line.split_whitespace().nth(1)?;
    if mv == "(none)" {
        None
    } else {
        Some(mv.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_cp() {
        let line = "info depth 16 seldepth 22 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(parse_score(line), Some(Score::Cp(35)));
    }

    #[test]
    fn test_parse_score_mate() {
        let line = "info depth 16 score mate -3 nodes 100000 pv e2e4";
        assert_eq!(parse_score(line), Some(Score::Mate(-3)));
    }

    #[test]
    fn test_parse_score_ignores_unscored_lines() {
        assert_eq!(parse_score("info depth 5 currmove e2e4 currmovenumber 1"), None);
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(
            parse_bestmove("bestmove e2e4 ponder e7e5"),
            Some("e2e4".to_string())
        );
        assert_eq!(parse_bestmove("bestmove (none)"), None);
    }
}
