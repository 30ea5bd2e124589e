use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, info};

use crate::command;
use crate::error::{JobFailure, SupervisorError};
use crate::job::{Job, JobId, JobQueue, JobStatus, Progress};
use crate::output_path;
use crate::post_actions;
use crate::probe;
use crate::progress::ProgressParser;
use crate::settings::Settings;
use crate::supervisor::ProcessSupervisor;

pub const MIN_PARALLEL_JOBS: usize = 2;
pub const MAX_PARALLEL_JOBS: usize = 3;

/// Default batch width. Each encoder process already runs with `-threads 0`,
/// so a handful of parallel jobs is enough to keep the machine busy without
/// thrashing I/O. Callers can override via `parallel_jobs_for`'s override or
/// the CLI `--jobs` flag.
pub fn parallel_jobs_for(cores: usize, override_jobs: Option<usize>) -> usize {
    match override_jobs {
        Some(n) => n.max(1),
        None => cores.div_ceil(4).clamp(MIN_PARALLEL_JOBS, MAX_PARALLEL_JOBS),
    }
}

pub fn default_parallel_jobs() -> usize {
    parallel_jobs_for(num_cpus::get(), None)
}

/// Partitions the queue, in order, into consecutive batches of at most
/// `parallel_jobs` ids. The last batch may be smaller.
pub fn partition_batches(jobs: &[Job], parallel_jobs: usize) -> Vec<Vec<JobId>> {
    jobs.chunks(parallel_jobs.max(1))
        .map(|chunk| chunk.iter().map(|j| j.id).collect())
        .collect()
}

#[derive(Clone, Debug)]
pub enum EngineEvent {
    JobStarted(JobId),
    JobProgress(JobId, Progress),
    JobSettled(JobId, JobStatus),
    RunFinished { cancelled: bool },
}

enum WorkerMessage {
    Progress(JobId, Progress),
    Settled(JobId, JobStatus),
}

/// Shared control surface for a running engine. Pause/resume act on encoder
/// processes directly; cancel also stops the scheduler from starting further
/// batches.
#[derive(Clone)]
pub struct EngineController {
    cancel: Arc<Mutex<bool>>,
    supervisor: Arc<ProcessSupervisor>,
}

impl EngineController {
    pub fn pause(&self) {
        self.supervisor.pause_all();
    }

    pub fn resume(&self) {
        self.supervisor.resume_all();
    }

    pub fn pause_job(&self, job_id: JobId) -> Result<(), SupervisorError> {
        self.supervisor.pause(job_id)
    }

    pub fn resume_job(&self, job_id: JobId) -> Result<(), SupervisorError> {
        self.supervisor.resume(job_id)
    }

    pub fn cancel_job(&self, job_id: JobId) -> Result<(), SupervisorError> {
        self.supervisor.cancel(job_id)
    }

    /// Stops the run: no new batch starts, and every tracked encoder process
    /// is terminated. In-flight jobs still settle to a terminal status.
    pub fn cancel(&self) {
        *self.cancel.lock().unwrap() = true;
        self.supervisor.cancel_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.lock().unwrap()
    }
}

/// Drives one run of the job queue: partitions it into batches, starts every
/// job of a batch concurrently, and only advances once the whole batch has
/// settled. The queue is the only shared mutable state; all updates are
/// applied by job id against the latest snapshot and re-broadcast to
/// subscribers.
pub struct TranscodeEngine {
    queue: Arc<Mutex<JobQueue>>,
    cancel: Arc<Mutex<bool>>,
    supervisor: Arc<ProcessSupervisor>,
    subscribers: Vec<Sender<EngineEvent>>,
    encoder: String,
}

impl TranscodeEngine {
    pub fn new(queue: JobQueue) -> Self {
        TranscodeEngine {
            queue: Arc::new(Mutex::new(queue)),
            cancel: Arc::new(Mutex::new(false)),
            supervisor: Arc::new(ProcessSupervisor::new()),
            subscribers: vec![],
            encoder: String::from(command::ENCODER),
        }
    }

    /// Overrides the encoder binary, e.g. for a vendored ffmpeg build.
    pub fn with_encoder(mut self, program: &str) -> Self {
        self.encoder = String::from(program);
        self
    }

    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn controller(&self) -> EngineController {
        EngineController {
            cancel: Arc::clone(&self.cancel),
            supervisor: Arc::clone(&self.supervisor),
        }
    }

    pub fn queue_snapshot(&self) -> Vec<Job> {
        self.queue.lock().unwrap().snapshot()
    }

    fn publish(&self, event: EngineEvent) {
        for tx in &self.subscribers {
            let _ = tx.send(event.clone());
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.lock().unwrap()
    }

    /// Runs the whole queue to completion (or cancellation). Jobs left over
    /// after a cancel stay Waiting.
    pub fn run(&self, settings: &Settings, parallel_jobs: usize) {
        let jobs = self.queue_snapshot();
        let batches = partition_batches(&jobs, parallel_jobs);
        info!(
            "starting run: {} jobs in {} batches of up to {}",
            jobs.len(),
            batches.len(),
            parallel_jobs
        );

        for batch in &batches {
            if self.is_cancelled() {
                break;
            }
            self.run_batch(batch, &jobs, settings);
        }

        let cancelled = self.is_cancelled();
        if !cancelled && settings.shutdown_on_completion {
            post_actions::request_shutdown();
        }
        self.publish(EngineEvent::RunFinished { cancelled });
    }

    fn run_batch(&self, batch: &[JobId], jobs: &[Job], settings: &Settings) {
        let (tx, rx) = mpsc::channel();
        let mut workers = vec![];

        for &job_id in batch {
            let source = match jobs.iter().find(|j| j.id == job_id) {
                Some(job) => job.source_path.clone(),
                None => continue,
            };
            {
                let mut queue = self.queue.lock().unwrap();
                let _ = queue.set_status(job_id, JobStatus::Processing);
            }
            self.publish(EngineEvent::JobStarted(job_id));

            let worker_tx: Sender<WorkerMessage> = tx.clone();
            let supervisor = Arc::clone(&self.supervisor);
            let settings = settings.clone();
            let encoder = self.encoder.clone();
            workers.push(thread::spawn(move || {
                run_job(job_id, &source, &settings, &encoder, &supervisor, &worker_tx);
            }));
        }
        drop(tx);

        // apply every update by id against the live queue; batch-mates settle
        // in any order
        for msg in rx {
            match msg {
                WorkerMessage::Progress(job_id, progress) => {
                    let _ = self.queue.lock().unwrap().set_progress(job_id, progress);
                    self.publish(EngineEvent::JobProgress(job_id, progress));
                },
                WorkerMessage::Settled(job_id, status) => {
                    let _ = self.queue.lock().unwrap().set_status(job_id, status.clone());
                    self.publish(EngineEvent::JobSettled(job_id, status));
                },
            }
        }

        for worker in workers {
            let _ = worker.join();
        }
    }
}

/// One job, start to finish: probe duration, resolve the destination, spawn
/// the encoder under supervision, stream progress, record the terminal state.
/// Every failure stays contained to this job.
fn run_job(
    job_id: JobId,
    source: &Path,
    settings: &Settings,
    encoder: &str,
    supervisor: &ProcessSupervisor,
    tx: &Sender<WorkerMessage>,
) {
    let total_duration = probe::probe_duration(source);
    if total_duration == 0.0 {
        debug!("no duration for {:?}; progress will have no percentage", source);
    }

    let output_dir = source.parent().unwrap_or(Path::new(".")).to_path_buf();
    let destination = match output_path::resolve(
        source,
        &output_dir,
        settings.relocate_output,
        settings.naming_pattern,
    ) {
        Ok(destination) => destination,
        Err(err) => {
            let failure = JobFailure::SpawnFailure(format!("output path: {}", err));
            let _ = tx.send(WorkerMessage::Settled(job_id, JobStatus::Error(failure)));
            return;
        },
    };

    let args = command::build_args(source, &destination, settings);
    let mut child = match supervisor.spawn(job_id, encoder, &args, source) {
        Ok(child) => child,
        Err(err) => {
            let failure = JobFailure::SpawnFailure(err.to_string());
            let _ = tx.send(WorkerMessage::Settled(job_id, JobStatus::Error(failure)));
            return;
        },
    };

    let mut parser = ProgressParser::new(total_duration);
    if let Some(mut stdout) = child.stdout.take() {
        let mut buf = [0u8; 4096];
        loop {
            match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    for progress in parser.feed(&buf[..n]) {
                        let _ = tx.send(WorkerMessage::Progress(job_id, progress));
                    }
                },
                Err(_) => break,
            }
        }
    }

    let status = match child.wait() {
        Ok(exit) if exit.success() => JobStatus::Completed,
        Ok(exit) => match exit.code() {
            Some(code) => JobStatus::Error(JobFailure::NonZeroExit(code)),
            None => JobStatus::Error(JobFailure::Terminated),
        },
        Err(err) => JobStatus::Error(JobFailure::SpawnFailure(err.to_string())),
    };
    supervisor.release(job_id);

    if status == JobStatus::Completed {
        post_actions::delete_source(source, settings);
    }
    let _ = tx.send(WorkerMessage::Settled(job_id, status));
}
