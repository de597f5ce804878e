//! Per-episode CSV log
//!
//! Every finished episode appends one `r,l,t` row (total reward, length,
//! seconds since the log was opened). The first line is a `#`-prefixed JSON
//! object with the start time. The file is flushed after every row so a
//! concurrent reader sees whole episodes as soon as they finish.

use super::environment::{EnvError, Environment, EpisodeResult};
use super::observation::Observation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRow {
    /// Total episode reward
    pub r: f32,
    /// Episode length in steps
    pub l: usize,
    /// Seconds since the log was opened
    pub t: f64,
}

/// Environment wrapper that records each episode to a CSV file
pub struct EpisodeLogger<E: Environment> {
    env: E,
    writer: csv::Writer<File>,
    started: Instant,
    episode_reward: f32,
    episode_length: usize,
    episodes: usize,
}

impl<E: Environment> EpisodeLogger<E> {
    /// Wrap `env`, truncating any existing log at `path`
    pub fn create(env: E, path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let mut file =
            File::create(path).with_context(|| format!("Failed to create episode log {:?}", path))?;
        let header = serde_json::json!({
            "t_start": chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
            "env_id": "snake",
        });
        writeln!(file, "#{}", header).context("Failed to write episode log header")?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(["r", "l", "t"])
            .context("Failed to write episode log header")?;
        writer.flush()?;

        Ok(Self {
            env,
            writer,
            started: Instant::now(),
            episode_reward: 0.0,
            episode_length: 0,
            episodes: 0,
        })
    }

    /// Number of episodes written so far
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    fn write_episode(&mut self) -> Result<()> {
        let row = EpisodeRow {
            r: self.episode_reward,
            l: self.episode_length,
            t: (self.started.elapsed().as_secs_f64() * 1e6).round() / 1e6,
        };
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.episodes += 1;
        Ok(())
    }
}

impl<E: Environment> Environment for EpisodeLogger<E> {
    fn reset(&mut self, seed: Option<u64>) -> Result<Observation, EnvError> {
        self.episode_reward = 0.0;
        self.episode_length = 0;
        self.env.reset(seed)
    }

    fn step(&mut self, action: usize) -> Result<EpisodeResult, EnvError> {
        let result = self.env.step(action)?;
        self.episode_reward += result.reward;
        self.episode_length += 1;

        if result.done() {
            self.write_episode().map_err(EnvError::EpisodeLog)?;
        }

        Ok(result)
    }

    fn render(&mut self) {
        self.env.render()
    }

    fn close(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::debug!("failed to flush episode log: {}", e);
        }
        self.env.close()
    }
}

/// Read the reward column of an episode log.
///
/// Rows that do not parse (for example a row still being written) are skipped.
/// I/O errors end the read, since the reader would report them again forever.
pub fn read_episode_rewards(path: &Path) -> Result<Vec<f32>> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open episode log {:?}", path))?;

    let mut rewards = Vec::new();
    for row in reader.deserialize::<EpisodeRow>() {
        match row {
            Ok(row) => rewards.push(row.r),
            Err(e) if e.is_io_error() => {
                return Err(e).with_context(|| format!("Failed to read episode log {:?}", path));
            }
            Err(_) => {}
        }
    }
    Ok(rewards)
}
