use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::engine::Engine;
use crate::engine::llm_client::ModelClient;
use crate::error::ServiceError;
use crate::model::job::{Job, JobOutcome};

/// Minimum-interval limiter between consecutive jobs.
///
/// The interval runs from the last `mark`, which the driver sets when a job
/// finishes. Before the first `mark`, `wait` returns immediately.
pub struct Pacer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// How long the next `wait` would block.
    pub fn remaining(&self) -> Duration {
        match self.last {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    pub fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            info!(secs = remaining.as_secs_f32(), "pacing before next request");
            thread::sleep(remaining);
        }
    }

    /// Records that a request-making job just finished.
    pub fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}

/// Runs every job in order, pacing between them.
/// Stops at the first model failure.
pub fn run_all<C: ModelClient>(
    engine: &Engine<'_, C>,
    jobs: &[Job],
    pacer: &mut Pacer,
) -> Result<Vec<JobOutcome>, ServiceError> {
    let mut outcomes = Vec::with_capacity(jobs.len());

    for job in jobs {
        pacer.wait();
        info!(image = %job.image, output = %job.output, "starting job");

        let outcome = engine.run(job)?;
        pacer.mark();
        if let JobOutcome::Aborted { reason } = &outcome {
            warn!(image = %job.image, "job skipped: {reason}");
        }
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::engine::engine::tests::{workspace, RecordingClient};
    use crate::model::diagram::DiagramImage;
    use crate::model::job::Dataset;

    /// Takes `delay` per call and records when each stage started and ended.
    struct SlowClient {
        delay: Duration,
        structure_starts: RefCell<Vec<Instant>>,
        rate_ends: RefCell<Vec<Instant>>,
    }

    impl SlowClient {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                structure_starts: RefCell::new(Vec::new()),
                rate_ends: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModelClient for SlowClient {
        fn generate_structure(
            &self,
            _image: &DiagramImage,
            _prompt: &str,
        ) -> Result<String, ServiceError> {
            self.structure_starts.borrow_mut().push(Instant::now());
            thread::sleep(self.delay);
            Ok("<A/>".into())
        }

        fn generate_rates(&self, _prompt: &str) -> Result<String, ServiceError> {
            thread::sleep(self.delay);
            self.rate_ends.borrow_mut().push(Instant::now());
            Ok("<B/>".into())
        }
    }

    #[test]
    fn first_wait_is_free() {
        let pacer = Pacer::new(Duration::from_secs(10));
        assert_eq!(pacer.remaining(), Duration::ZERO);
    }

    #[test]
    fn later_waits_respect_interval() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        pacer.wait();
        assert_eq!(pacer.remaining(), Duration::ZERO);
        pacer.mark();
        assert!(pacer.remaining() > Duration::ZERO);

        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn interval_counts_from_end_of_previous_job() {
        let dir = tempfile::tempdir().unwrap();
        let client = SlowClient::new(Duration::from_millis(150));
        let engine = Engine::new(&client, workspace(dir.path()));
        let jobs = vec![
            Job::new("seir.png", Dataset::Simple, "a.txt"),
            Job::new("seir.png", Dataset::Simple, "b.txt"),
        ];
        let interval = Duration::from_millis(200);

        run_all(&engine, &jobs, &mut Pacer::new(interval)).unwrap();

        let first_end = client.rate_ends.borrow()[0];
        let second_start = client.structure_starts.borrow()[1];
        assert!(second_start.duration_since(first_end) >= interval);
    }

    #[test]
    fn first_job_starts_without_delay() {
        let dir = tempfile::tempdir().unwrap();
        let client = SlowClient::new(Duration::ZERO);
        let engine = Engine::new(&client, workspace(dir.path()));
        let jobs = vec![Job::new("seir.png", Dataset::Simple, "a.txt")];

        let start = Instant::now();
        run_all(&engine, &jobs, &mut Pacer::new(Duration::from_secs(5))).unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn runs_jobs_in_order_and_continues_past_soft_failures() {
        let dir = tempfile::tempdir().unwrap();
        let client = RecordingClient::default();
        let engine = Engine::new(&client, workspace(dir.path()));
        let jobs = vec![
            Job::new("absent.png", Dataset::Simple, "first.txt"),
            Job::new("seir.png", Dataset::Simple, "second.txt"),
        ];

        let outcomes = run_all(&engine, &jobs, &mut Pacer::new(Duration::ZERO)).unwrap();

        assert!(matches!(outcomes[0], JobOutcome::Aborted { .. }));
        assert!(matches!(outcomes[1], JobOutcome::Written { .. }));
        assert_eq!(client.structure_calls.get(), 1);
    }

    #[test]
    fn service_failure_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let client = RecordingClient {
            fail_structure: true,
            ..Default::default()
        };
        let engine = Engine::new(&client, workspace(dir.path()));
        let jobs = vec![
            Job::new("seir.png", Dataset::Simple, "a.txt"),
            Job::new("seir.png", Dataset::Simple, "b.txt"),
        ];

        let result = run_all(&engine, &jobs, &mut Pacer::new(Duration::ZERO));

        assert!(result.is_err());
        assert_eq!(client.structure_calls.get(), 1);
    }
}
