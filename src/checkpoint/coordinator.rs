use std::any::Any;
use std::fmt;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use crate::rl::Trainable;

/// Why a checkpoint is being written. The tag ends up in the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveReason {
    /// SIGINT/SIGTERM received
    Signal,
    /// Orderly process shutdown
    AtExit,
    /// User interrupted training
    Interrupt,
    /// Training failed
    Error,
    /// Training finished or was stopped by the monitor
    Final,
    /// Unconditional save on the way out
    FinalAttempt,
    /// Display closed by the user
    WindowClose,
}

impl SaveReason {
    pub fn tag(&self) -> &'static str {
        match self {
            SaveReason::Signal => "signal",
            SaveReason::AtExit => "atexit",
            SaveReason::Interrupt => "interrupt",
            SaveReason::Error => "error",
            SaveReason::Final => "final",
            SaveReason::FinalAttempt => "final_attempt",
            SaveReason::WindowClose => "window_close",
        }
    }
}

impl fmt::Display for SaveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Process-wide handle to the model being trained
///
/// The model is registered once at startup. Any thread may then ask for a
/// save; failures are logged and never propagated, so a save can be requested
/// from signal listeners, drop guards and error paths alike.
///
/// Checkpoints are named `<dir>/<base>_<tag>_<YYYYMMDD-HHMMSS>` and never
/// overwrite one another: a stem that is already taken gets `-1`, `-2`, ...
/// appended.
pub struct CheckpointCoordinator {
    model: OnceLock<Arc<dyn Trainable>>,
    dir: PathBuf,
    base_name: String,
    /// Serializes path selection and writing
    save_lock: Mutex<()>,
}

impl CheckpointCoordinator {
    pub fn new(dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            model: OnceLock::new(),
            dir: dir.into(),
            base_name: base_name.into(),
            save_lock: Mutex::new(()),
        }
    }

    /// Register the model. Returns `false` if one was already registered.
    pub fn register(&self, model: Arc<dyn Trainable>) -> bool {
        let registered = self.model.set(model).is_ok();
        if !registered {
            log::warn!("a model is already registered for checkpointing, ignoring");
        }
        registered
    }

    pub fn is_registered(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the registered model, tagged with `reason`
    ///
    /// Returns the checkpoint path on success, `None` if there was no model
    /// or the save failed.
    pub fn save(&self, reason: SaveReason) -> Option<PathBuf> {
        let Some(model) = self.model.get() else {
            log::info!("no model registered, skipping {} checkpoint", reason);
            return None;
        };

        let _guard = self.save_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Err(e) = fs::create_dir_all(&self.dir) {
            log::error!(
                "failed to create checkpoint directory {}: {}",
                self.dir.display(),
                e
            );
            return None;
        }

        let path = self.checkpoint_path(reason);
        log::info!("saving {} checkpoint to {}", reason, path.display());

        match catch_unwind(AssertUnwindSafe(|| model.save(&path))) {
            Ok(Ok(())) => {
                log::info!("model saved: {}", path.display());
                Some(path)
            }
            Ok(Err(e)) => {
                log::error!("failed to save {} checkpoint: {:#}", reason, e);
                None
            }
            Err(panic) => {
                log::error!(
                    "panic while saving {} checkpoint: {}",
                    reason,
                    panic_message(&*panic)
                );
                None
            }
        }
    }

    fn checkpoint_path(&self, reason: SaveReason) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let stem = format!("{}_{}_{}", self.base_name, reason.tag(), timestamp);

        let mut candidate = stem.clone();
        let mut suffix = 0;
        while self.stem_taken(&candidate) {
            suffix += 1;
            candidate = format!("{}-{}", stem, suffix);
        }
        self.dir.join(candidate)
    }

    /// True if any entry in the directory is `stem` or `stem.<ext>`
    fn stem_taken(&self, stem: &str) -> bool {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return false;
        };
        let dotted = format!("{}.", stem);
        entries.flatten().any(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name == stem || name.starts_with(&dotted)
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Saves an `atexit` checkpoint when dropped
///
/// Keep it alive for the lifetime of `main`. It does not run when the process
/// is terminated with [`std::process::exit`].
pub struct ExitGuard {
    coordinator: Arc<CheckpointCoordinator>,
}

impl ExitGuard {
    pub fn new(coordinator: Arc<CheckpointCoordinator>) -> Self {
        Self { coordinator }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.coordinator.save(SaveReason::AtExit);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    pub(crate) const BASE: &str = "snake_dqn_model";

    /// Model that writes a small `.mpk` file and counts saves
    #[derive(Default)]
    pub(crate) struct FileModel {
        pub saves: AtomicUsize,
    }

    impl Trainable for FileModel {
        fn save(&self, path: &Path) -> anyhow::Result<()> {
            fs::write(path.with_extension("mpk"), b"weights")?;
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingModel;

    impl Trainable for FailingModel {
        fn save(&self, _path: &Path) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    struct PanickingModel;

    impl Trainable for PanickingModel {
        fn save(&self, _path: &Path) -> anyhow::Result<()> {
            panic!("recorder exploded")
        }
    }

    /// Checkpoint files in `dir` whose name starts with `<BASE>_<tag>_2`
    pub(crate) fn checkpoints(dir: &Path, tag: &str) -> Vec<String> {
        let prefix = format!("{}_{}_2", BASE, tag);
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| name.starts_with(&prefix) && name.ends_with(".mpk"))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn test_save_without_model_is_noop() {
        let dir = TempDir::new().unwrap();
        let models = dir.path().join("models");
        let coordinator = CheckpointCoordinator::new(&models, BASE);

        assert!(!coordinator.is_registered());
        assert_eq!(coordinator.save(SaveReason::Final), None);
        assert!(!models.exists());
    }

    #[test]
    fn test_register_once() {
        let dir = TempDir::new().unwrap();
        let coordinator = CheckpointCoordinator::new(dir.path(), BASE);

        assert!(coordinator.register(Arc::new(FileModel::default())));
        assert!(!coordinator.register(Arc::new(FileModel::default())));
        assert!(coordinator.is_registered());
    }

    #[test]
    fn test_path_format() {
        let dir = TempDir::new().unwrap();
        let coordinator = CheckpointCoordinator::new(dir.path(), BASE);
        coordinator.register(Arc::new(FileModel::default()));

        let path = coordinator.save(SaveReason::FinalAttempt).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let timestamp = name.strip_prefix("snake_dqn_model_final_attempt_").unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y%m%d-%H%M%S").is_ok());
    }

    #[test]
    fn test_different_tags_produce_distinct_files() {
        let dir = TempDir::new().unwrap();
        let coordinator = CheckpointCoordinator::new(dir.path(), BASE);
        let model = Arc::new(FileModel::default());
        coordinator.register(model.clone());

        let final_path = coordinator.save(SaveReason::Final).unwrap();
        let attempt_path = coordinator.save(SaveReason::FinalAttempt).unwrap();

        assert_ne!(final_path, attempt_path);
        assert_eq!(checkpoints(dir.path(), "final").len(), 1);
        assert_eq!(checkpoints(dir.path(), "final_attempt").len(), 1);
        assert_eq!(model.saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_same_tag_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let coordinator = CheckpointCoordinator::new(dir.path(), BASE);
        coordinator.register(Arc::new(FileModel::default()));

        let paths: Vec<PathBuf> = (0..3)
            .map(|_| coordinator.save(SaveReason::Error).unwrap())
            .collect();

        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[1], paths[2]);
        assert_eq!(checkpoints(dir.path(), "error").len(), 3);
    }

    #[test]
    fn test_failed_save_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let coordinator = CheckpointCoordinator::new(dir.path(), BASE);
        coordinator.register(Arc::new(FailingModel));

        assert_eq!(coordinator.save(SaveReason::Error), None);
    }

    #[test]
    fn test_panicking_save_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let coordinator = CheckpointCoordinator::new(dir.path(), BASE);
        coordinator.register(Arc::new(PanickingModel));

        assert_eq!(coordinator.save(SaveReason::Signal), None);
        // The coordinator stays usable afterwards
        assert_eq!(coordinator.save(SaveReason::Final), None);
    }

    #[test]
    fn test_exit_guard_saves_on_drop() {
        let dir = TempDir::new().unwrap();
        let coordinator = Arc::new(CheckpointCoordinator::new(dir.path(), BASE));
        coordinator.register(Arc::new(FileModel::default()));

        {
            let _guard = ExitGuard::new(coordinator.clone());
            assert!(checkpoints(dir.path(), "atexit").is_empty());
        }

        assert_eq!(checkpoints(dir.path(), "atexit").len(), 1);
    }

    #[test]
    fn test_reason_tags() {
        let tags: Vec<&str> = [
            SaveReason::Signal,
            SaveReason::AtExit,
            SaveReason::Interrupt,
            SaveReason::Error,
            SaveReason::Final,
            SaveReason::FinalAttempt,
            SaveReason::WindowClose,
        ]
        .iter()
        .map(SaveReason::tag)
        .collect();

        assert_eq!(
            tags,
            vec![
                "signal",
                "atexit",
                "interrupt",
                "error",
                "final",
                "final_attempt",
                "window_close"
            ]
        );
        assert_eq!(SaveReason::WindowClose.to_string(), "window_close");
    }
}
