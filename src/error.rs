use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("unknown video codec '{0}'")]
    UnknownVideoCodec(String),
    #[error("unknown resolution '{0}'")]
    UnknownResolution(String),
    #[error("unknown frame rate '{0}'")]
    UnknownFps(String),
    #[error("unknown audio codec '{0}'")]
    UnknownAudioCodec(String),
    #[error("unknown naming pattern '{0}'")]
    UnknownNamingPattern(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueError {
    #[error("no job with id {0} in the queue")]
    UnknownJob(Uuid),
    #[error("job {0} is processing and cannot be moved or removed")]
    JobProcessing(Uuid),
    #[error("reorder does not match the current set of job ids")]
    OrderMismatch,
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("no tracked process for job {0}")]
    NotTracked(Uuid),
    #[error("failed to signal process group {pid} for job {job}")]
    Signal { job: Uuid, pid: u32 },
    #[error("failed to spawn encoder for {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Terminal failure recorded on a job. The run itself keeps going.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JobFailure {
    #[error("encoder could not be started: {0}")]
    SpawnFailure(String),
    #[error("encoder exited with code {0}")]
    NonZeroExit(i32),
    #[error("encoder was terminated by a signal")]
    Terminated,
}
