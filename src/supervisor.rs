use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use libc::{SIGCONT, SIGSTOP, SIGTERM};
use log::{debug, warn};

use crate::error::SupervisorError;
use crate::job::JobId;

/// Tracks one encoder process per job so that concurrent batch members can be
/// paused, resumed, and cancelled independently. A single shared handle would
/// only ever control the most recently started job.
///
/// Each child is placed in its own process group and signals are delivered to
/// the group, covering any helper processes the encoder forks.
pub struct ProcessSupervisor {
    registry: Mutex<HashMap<JobId, u32>>,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        ProcessSupervisor {
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// Spawns the encoder for a job and registers its process group. The
    /// caller owns the returned child (it reads stdout and waits for exit);
    /// the supervisor only keeps the pid for signalling.
    pub fn spawn(
        &self,
        job_id: JobId,
        program: &str,
        args: &[String],
        source: &Path,
    ) -> Result<Child, SupervisorError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|err| SupervisorError::Spawn {
                path: source.to_path_buf(),
                source: err,
            })?;

        let pid = child.id();
        debug!("job {} running as pid {}", job_id, pid);
        self.registry.lock().unwrap().insert(job_id, pid);
        Ok(child)
    }

    /// Drops the registry entry once the job's process has exited.
    pub fn release(&self, job_id: JobId) {
        self.registry.lock().unwrap().remove(&job_id);
    }

    pub fn tracked_count(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    pub fn pause(&self, job_id: JobId) -> Result<(), SupervisorError> {
        self.signal(job_id, SIGSTOP)
    }

    pub fn resume(&self, job_id: JobId) -> Result<(), SupervisorError> {
        self.signal(job_id, SIGCONT)
    }

    /// Sends a terminate signal and forgets the process. The owning worker
    /// still observes the exit and records the terminal status. A stopped
    /// process does not handle SIGTERM until continued, so cancel always
    /// continues the group first.
    pub fn cancel(&self, job_id: JobId) -> Result<(), SupervisorError> {
        self.signal(job_id, SIGCONT)?;
        self.signal(job_id, SIGTERM)?;
        self.release(job_id);
        Ok(())
    }

    pub fn pause_all(&self) {
        self.signal_all(SIGSTOP);
    }

    pub fn resume_all(&self) {
        self.signal_all(SIGCONT);
    }

    pub fn cancel_all(&self) {
        let mut registry = self.registry.lock().unwrap();
        for (job_id, pid) in registry.drain() {
            let _ = signal_group(pid, SIGCONT);
            if let Err(()) = signal_group(pid, SIGTERM) {
                warn!("could not terminate process group {} for job {}", pid, job_id);
            }
        }
    }

    fn signal(&self, job_id: JobId, signal: i32) -> Result<(), SupervisorError> {
        let registry = self.registry.lock().unwrap();
        match registry.get(&job_id) {
            None => Err(SupervisorError::NotTracked(job_id)),
            Some(&pid) => signal_group(pid, signal)
                .map_err(|()| SupervisorError::Signal { job: job_id, pid }),
        }
    }

    fn signal_all(&self, signal: i32) {
        let registry = self.registry.lock().unwrap();
        for (job_id, &pid) in registry.iter() {
            if let Err(()) = signal_group(pid, signal) {
                warn!("could not signal process group {} for job {}", pid, job_id);
            }
        }
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        ProcessSupervisor::new()
    }
}

fn signal_group(pid: u32, signal: i32) -> Result<(), ()> {
    // negative pid addresses the whole process group
    let rc = unsafe { libc::kill(-(pid as i32), signal) };
    if rc == 0 { Ok(()) } else { Err(()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn sleep_args() -> Vec<String> {
        vec![String::from("5")]
    }

    #[test]
    fn test_spawn_registers_and_release_forgets() {
        let supervisor = ProcessSupervisor::new();
        let job_id = Uuid::new_v4();
        let mut child = supervisor
            .spawn(job_id, "sleep", &sleep_args(), &PathBuf::from("clip.mp4"))
            .unwrap();
        assert_eq!(supervisor.tracked_count(), 1);

        supervisor.cancel(job_id).unwrap();
        assert_eq!(supervisor.tracked_count(), 0);
        let _ = child.wait();
    }

    #[test]
    fn test_pause_resume_tracked_process() {
        let supervisor = ProcessSupervisor::new();
        let job_id = Uuid::new_v4();
        let mut child = supervisor
            .spawn(job_id, "sleep", &sleep_args(), &PathBuf::from("clip.mp4"))
            .unwrap();

        supervisor.pause(job_id).unwrap();
        supervisor.resume(job_id).unwrap();
        supervisor.cancel(job_id).unwrap();
        let _ = child.wait();
    }

    #[test]
    fn test_signal_untracked_job_fails_cleanly() {
        let supervisor = ProcessSupervisor::new();
        let stranger = Uuid::new_v4();
        assert!(matches!(
            supervisor.pause(stranger),
            Err(SupervisorError::NotTracked(_))
        ));
        assert!(matches!(
            supervisor.cancel(stranger),
            Err(SupervisorError::NotTracked(_))
        ));
    }

    #[test]
    fn test_spawn_failure_reports_error() {
        let supervisor = ProcessSupervisor::new();
        let result = supervisor.spawn(
            Uuid::new_v4(),
            "/nonexistent/encoder",
            &[],
            &PathBuf::from("clip.mp4"),
        );
        assert!(matches!(result, Err(SupervisorError::Spawn { .. })));
        assert_eq!(supervisor.tracked_count(), 0);
    }

    #[test]
    fn test_cancel_all_clears_registry() {
        let supervisor = ProcessSupervisor::new();
        let mut children = vec![];
        for _ in 0..2 {
            let job_id = Uuid::new_v4();
            children.push(
                supervisor
                    .spawn(job_id, "sleep", &sleep_args(), &PathBuf::from("clip.mp4"))
                    .unwrap(),
            );
        }
        assert_eq!(supervisor.tracked_count(), 2);
        supervisor.cancel_all();
        assert_eq!(supervisor.tracked_count(), 0);
        for mut child in children {
            let _ = child.wait();
        }
    }
}
