//! Cron-driven synchronization runs.
//!
//! Collections without their own `schedule` share the global one and run
//! one after another; a collection with its own schedule runs on it alone.

use anyhow::{Context, Result};
use chrono::Local;
use cron::Schedule;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{error, info};

use crate::config::CollectionEntry;
use crate::library::Materializer;

/// Parse a cron expression. Classic 5-field expressions get a leading seconds field.
pub fn parse_schedule(expression: &str) -> Result<Schedule> {
    let expression = expression.trim();
    let normalized = if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    };

    Schedule::from_str(&normalized)
        .with_context(|| format!("Invalid cron schedule: {:?}", expression))
}

/// Collections that run together on one schedule.
pub struct Job {
    pub expression: String,
    pub schedule: Schedule,
    pub members: Vec<usize>,
}

impl Job {
    fn new(expression: &str) -> Result<Self> {
        Ok(Self {
            expression: expression.to_string(),
            schedule: parse_schedule(expression)?,
            members: Vec::new(),
        })
    }
}

pub struct Scheduler {
    materializer: Materializer,
    collections: Vec<CollectionEntry>,
    // One per collection; runs of the same collection never overlap.
    running: Vec<Mutex<()>>,
    shows_dir: PathBuf,
}

impl Scheduler {
    pub fn new(materializer: Materializer, collections: Vec<CollectionEntry>, shows_dir: PathBuf) -> Self {
        Self {
            materializer,
            running: collections.iter().map(|_| Mutex::new(())).collect(),
            collections,
            shows_dir,
        }
    }

    /// Group collections into jobs: one for the global schedule, one per own schedule.
    pub fn jobs(&self, global: &str) -> Result<Vec<Job>> {
        let mut jobs = vec![Job::new(global)?];
        for (i, entry) in self.collections.iter().enumerate() {
            match &entry.schedule {
                Some(expression) => {
                    let mut job = Job::new(expression)?;
                    job.members.push(i);
                    jobs.push(job);
                }
                None => jobs[0].members.push(i),
            }
        }
        jobs.retain(|job| !job.members.is_empty());
        Ok(jobs)
    }

    pub async fn run_collection(&self, i: usize) {
        let entry = &self.collections[i];
        let _running = self.running[i].lock().await;
        info!("running sync for {}", entry.url);
        let target_dir = self.shows_dir.join(&entry.dir);

        match self
            .materializer
            .materialize_new(&entry.url, &target_dir, &entry.options)
            .await
        {
            Ok(count) => info!("sync for {} finished, {} new videos", entry.url, count),
            Err(e) => error!("sync for {} failed: {}", entry.url, e),
        }
    }

    pub async fn run_all(&self) {
        for i in 0..self.collections.len() {
            self.run_collection(i).await;
        }
    }

    async fn run_job(self: Arc<Self>, job: Job) {
        loop {
            let Some(next) = job.schedule.upcoming(Local).next() else {
                break;
            };
            let wait = (next - Local::now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            for &i in &job.members {
                self.run_collection(i).await;
            }
        }
    }

    /// Run until `shutdown_signal` fires.
    pub async fn run(
        self: Arc<Self>,
        global_schedule: &str,
        run_at_start: bool,
        shutdown_signal: Arc<Notify>,
    ) -> Result<()> {
        let jobs = self.jobs(global_schedule)?;
        let mut handles = Vec::with_capacity(jobs.len() + 1);

        if run_at_start {
            info!("executing sync at start");
            let this = self.clone();
            handles.push(tokio::spawn(async move { this.run_all().await }));
        }

        for job in jobs {
            info!(
                "scheduling {} collection(s) on {:?}",
                job.members.len(),
                job.expression
            );
            handles.push(tokio::spawn(self.clone().run_job(job)));
        }

        shutdown_signal.notified().await;
        info!("Shutdown signal received, stopping scheduler");
        for handle in handles {
            handle.abort();
        }
        Ok(())
    }
}
