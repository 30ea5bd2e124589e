use std::collections::HashSet;
use std::fmt::Display;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{JobFailure, QueueError};

pub type JobId = Uuid;

/// Normalized progress snapshot for one running job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub percentage: u8,
    pub current_time_seconds: f64,
    pub total_time_seconds: f64,
    pub fps: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    Waiting,
    Processing,
    Completed,
    Error(JobFailure),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error(_))
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Waiting => write!(f, "waiting"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Error(failure) => write!(f, "error: {}", failure),
        }
    }
}

/// One source file's pending/ongoing/finished conversion request. Identity is
/// the id; positions shift while batches settle concurrently.
#[derive(Clone, Debug)]
pub struct Job {
    pub id: JobId,
    pub source_path: PathBuf,
    pub status: JobStatus,
    pub progress: Option<Progress>,
}

impl Job {
    pub fn new(source_path: PathBuf) -> Self {
        Job {
            id: Uuid::new_v4(),
            source_path,
            status: JobStatus::Waiting,
            progress: None,
        }
    }
}

/// Ordered, mutable job collection. Insertion order is the scheduling order.
/// All mutation is keyed by job id.
#[derive(Clone, Debug, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        JobQueue { jobs: vec![] }
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        JobQueue {
            jobs: paths.into_iter().map(Job::new).collect(),
        }
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs.clone()
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn processing_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.status == JobStatus::Processing).count()
    }

    pub fn set_status(&mut self, id: JobId, status: JobStatus) -> Result<(), QueueError> {
        match self.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.status = status;
                Ok(())
            },
            None => Err(QueueError::UnknownJob(id)),
        }
    }

    pub fn set_progress(&mut self, id: JobId, progress: Progress) -> Result<(), QueueError> {
        match self.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.progress = Some(progress);
                Ok(())
            },
            None => Err(QueueError::UnknownJob(id)),
        }
    }

    /// Removal is rejected while the job is processing; its encoder still owns
    /// the destination file.
    pub fn remove(&mut self, id: JobId) -> Result<Job, QueueError> {
        match self.jobs.iter().position(|j| j.id == id) {
            None => Err(QueueError::UnknownJob(id)),
            Some(index) => {
                if self.jobs[index].status == JobStatus::Processing {
                    Err(QueueError::JobProcessing(id))
                } else {
                    Ok(self.jobs.remove(index))
                }
            },
        }
    }

    /// Clears every job that is not currently processing.
    pub fn clear(&mut self) {
        self.jobs.retain(|j| j.status == JobStatus::Processing);
    }

    /// Reorders the queue to match `order`. Fails if any job is processing or
    /// if `order` is not a permutation of the current ids.
    pub fn reorder(&mut self, order: &[JobId]) -> Result<(), QueueError> {
        if let Some(job) = self.jobs.iter().find(|j| j.status == JobStatus::Processing) {
            return Err(QueueError::JobProcessing(job.id));
        }
        if order.len() != self.jobs.len() {
            return Err(QueueError::OrderMismatch);
        }
        let mut reordered = Vec::with_capacity(self.jobs.len());
        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            // a repeated id would pass the length check while dropping a job
            if !seen.insert(*id) {
                return Err(QueueError::OrderMismatch);
            }
            match self.jobs.iter().find(|j| j.id == *id) {
                Some(job) => reordered.push(job.clone()),
                None => return Err(QueueError::OrderMismatch),
            }
        }
        self.jobs = reordered;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(n: usize) -> JobQueue {
        JobQueue::from_paths((0..n).map(|i| PathBuf::from(format!("clip{}.mp4", i))).collect())
    }

    #[test]
    fn test_update_by_id() {
        let mut queue = queue_of(3);
        let id = queue.jobs()[1].id;
        queue.set_status(id, JobStatus::Processing).unwrap();
        assert_eq!(queue.get(id).unwrap().status, JobStatus::Processing);
        assert_eq!(queue.processing_count(), 1);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut queue = queue_of(1);
        let stranger = Uuid::new_v4();
        assert_eq!(
            queue.set_status(stranger, JobStatus::Completed),
            Err(QueueError::UnknownJob(stranger))
        );
    }

    #[test]
    fn test_reorder_preserves_ids() {
        let mut queue = queue_of(3);
        let mut order: Vec<JobId> = queue.jobs().iter().map(|j| j.id).collect();
        order.reverse();
        queue.reorder(&order).unwrap();
        let ids: Vec<JobId> = queue.jobs().iter().map(|j| j.id).collect();
        assert_eq!(ids, order);
    }

    #[test]
    fn test_reorder_rejected_while_processing() {
        let mut queue = queue_of(2);
        let id = queue.jobs()[0].id;
        queue.set_status(id, JobStatus::Processing).unwrap();
        let order: Vec<JobId> = queue.jobs().iter().rev().map(|j| j.id).collect();
        assert_eq!(queue.reorder(&order), Err(QueueError::JobProcessing(id)));
    }

    #[test]
    fn test_reorder_rejects_duplicate_ids() {
        let mut queue = queue_of(2);
        let before: Vec<JobId> = queue.jobs().iter().map(|j| j.id).collect();
        let order = vec![before[0], before[0]];
        assert_eq!(queue.reorder(&order), Err(QueueError::OrderMismatch));
        let after: Vec<JobId> = queue.jobs().iter().map(|j| j.id).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_reorder_rejects_foreign_ids() {
        let mut queue = queue_of(2);
        let order = vec![Uuid::new_v4(), Uuid::new_v4()];
        assert_eq!(queue.reorder(&order), Err(QueueError::OrderMismatch));
    }

    #[test]
    fn test_remove_rejected_while_processing() {
        let mut queue = queue_of(2);
        let id = queue.jobs()[1].id;
        queue.set_status(id, JobStatus::Processing).unwrap();
        assert_eq!(queue.remove(id).unwrap_err(), QueueError::JobProcessing(id));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_clear_keeps_processing() {
        let mut queue = queue_of(3);
        let id = queue.jobs()[2].id;
        queue.set_status(id, JobStatus::Processing).unwrap();
        queue.clear();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.jobs()[0].id, id);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error(JobFailure::NonZeroExit(1)).is_terminal());
        assert!(!JobStatus::Waiting.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }
}
