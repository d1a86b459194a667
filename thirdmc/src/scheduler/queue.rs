//! Ordered job queue.
//!
//! Jobs run strictly head first. Follow-ups are appended; prerequisites go
//! in front of the job that declared them, in declared order.

use std::collections::VecDeque;

use super::job::{Continuation, Job, JobSpec};

#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: JobSpec) {
        self.jobs.push_back(Job::new(spec));
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn head(&self) -> Option<&Job> {
        self.jobs.front()
    }

    /// Queued job specs, head first.
    pub fn specs(&self) -> impl Iterator<Item = &JobSpec> {
        self.jobs.iter().map(|job| &job.spec)
    }

    /// Mark the head active and return it.
    ///
    /// Returns `None` when the queue is empty or the head is already
    /// running.
    pub fn activate_head(&mut self) -> Option<&mut Job> {
        let head = self.jobs.front_mut()?;
        if head.active {
            return None;
        }
        head.active = true;
        Some(head)
    }

    /// Remove the finished head job and append its follow-ups.
    pub fn complete_head(&mut self, follow_ups: Vec<JobSpec>) -> Option<Job> {
        let finished = self.jobs.pop_front();
        for spec in follow_ups {
            self.push(spec);
        }
        finished
    }

    /// Park the head behind `prerequisites`.
    pub fn defer_head(&mut self, prerequisites: Vec<JobSpec>, continuation: Continuation) {
        if let Some(head) = self.jobs.front_mut() {
            head.active = false;
            head.continuation = Some(continuation);
        }
        for spec in prerequisites.into_iter().rev() {
            self.jobs.push_front(Job::new(spec));
        }
    }

    /// Drop every job; returns how many were queued.
    pub fn clear(&mut self) -> usize {
        let dropped = self.jobs.len();
        self.jobs.clear();
        dropped
    }
}
