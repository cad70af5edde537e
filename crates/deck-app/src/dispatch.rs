//! Per-device command lanes on top of a blocking [`CommandRunner`]
//!
//! Each target identifier gets its own FIFO lane (an mpsc queue drained by one
//! worker task); unscoped commands share a separate lane. Jobs on one lane run
//! strictly in submission order on tokio's blocking pool, while different
//! devices proceed independently.
//!
//! A lane only exists while it has queued or running work. When its queue
//! drains the worker removes it from the lane table and exits, so the table
//! never holds more entries than there are targets with work in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use deck_bridge::{CommandOutput, CommandRunner};
use deck_core::prelude::*;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Lane key: `None` is the unscoped lane
type LaneKey = Option<String>;

/// Senders of the live lanes, shared with their workers
type LaneTable = Arc<Mutex<HashMap<LaneKey, mpsc::UnboundedSender<Job>>>>;

/// Moves bridge invocations off the caller's task, one lane per device
pub struct CommandDispatcher {
    runner: Arc<dyn CommandRunner>,
    lanes: LaneTable,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("lanes", &self.lane_count())
            .finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            lanes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run one bridge command on the lane for `target`
    pub async fn run(&self, args: Vec<String>, target: Option<&str>) -> Result<CommandOutput> {
        let runner = Arc::clone(&self.runner);
        let owned_target = target.map(str::to_string);
        self.submit(target, move || runner.run(&args, owned_target.as_deref()))
            .await
    }

    /// Run arbitrary blocking work on the lane for `lane`
    ///
    /// An empty lane name is the unscoped lane, matching how the runner
    /// treats an empty target.
    pub async fn submit<T, F>(&self, lane: Option<&str>, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let job: Job = Box::new(move || {
            // Receiver may have been dropped by a cancelled caller
            let _ = tx.send(work());
        });

        let key = lane.filter(|l| !l.is_empty()).map(str::to_string);
        self.enqueue(key, job)?;

        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Number of lanes with queued or running work
    pub fn lane_count(&self) -> usize {
        self.lanes.lock().map(|lanes| lanes.len()).unwrap_or(0)
    }

    /// Queue `job` on its lane, starting a worker if the lane is idle
    ///
    /// Sends while holding the table lock; workers retire under the same lock.
    fn enqueue(&self, key: LaneKey, job: Job) -> Result<()> {
        let mut lanes = self
            .lanes
            .lock()
            .map_err(|_| Error::channel_send("lane table poisoned"))?;

        let job = match lanes.get(&key) {
            Some(sender) => match sender.send(job) {
                Ok(()) => return Ok(()),
                // Worker died without retiring (runtime shutting down)
                Err(mpsc::error::SendError(job)) => job,
            },
            None => job,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(job)
            .map_err(|e| Error::channel_send(e.to_string()))?;
        spawn_lane_worker(key.clone(), rx, Arc::clone(&self.lanes));
        lanes.insert(key, tx);
        Ok(())
    }
}

fn spawn_lane_worker(key: LaneKey, mut rx: mpsc::UnboundedReceiver<Job>, lanes: LaneTable) {
    tokio::spawn(async move {
        let lane = key.as_deref().unwrap_or("<unscoped>").to_string();
        debug!("Command lane started: {}", lane);

        while let Some(job) = next_job(&key, &mut rx, &lanes) {
            if let Err(e) = tokio::task::spawn_blocking(job).await {
                error!("Command on lane {} panicked: {}", lane, e);
            }
        }

        debug!("Command lane retired: {}", lane);
    });
}

/// Next queued job, or `None` after removing the drained lane from the table
fn next_job(
    key: &LaneKey,
    rx: &mut mpsc::UnboundedReceiver<Job>,
    lanes: &LaneTable,
) -> Option<Job> {
    let mut lanes = lanes
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    match rx.try_recv() {
        Ok(job) => Some(job),
        Err(_) => {
            lanes.remove(key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_bridge::test_utils::ScriptedRunner;
    use std::time::Duration;

    /// Runner that sleeps per call and records completion order
    struct SlowRunner {
        delay: Duration,
        finished: Mutex<Vec<String>>,
    }

    impl CommandRunner for SlowRunner {
        fn run(&self, args: &[String], target: Option<&str>) -> CommandOutput {
            std::thread::sleep(self.delay);
            let label = format!("{}:{}", target.unwrap_or("-"), args.join(" "));
            self.finished.lock().unwrap().push(label.clone());
            CommandOutput::success(label)
        }
    }

    #[tokio::test]
    async fn test_run_passes_target_through() {
        let runner = Arc::new(ScriptedRunner::new().respond(CommandOutput::success("ok")));
        let dispatcher = CommandDispatcher::new(runner.clone());

        let output = dispatcher
            .run(vec!["reboot".to_string()], Some("ABC"))
            .await
            .unwrap();

        assert_eq!(output.output, "ok");
        assert_eq!(runner.calls()[0].argv(), vec!["-s", "ABC", "reboot"]);
    }

    #[tokio::test]
    async fn test_same_lane_is_fifo() {
        let runner = Arc::new(SlowRunner {
            delay: Duration::from_millis(20),
            finished: Mutex::new(Vec::new()),
        });
        let dispatcher = Arc::new(CommandDispatcher::new(runner.clone()));

        let first = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.run(vec!["one".into()], Some("A")).await })
        };
        // Give the first job a head start onto the lane
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = dispatcher.run(vec!["two".into()], Some("A")).await.unwrap();
        let first = first.await.unwrap().unwrap();

        assert_eq!(first.output, "A:one");
        assert_eq!(second.output, "A:two");
        assert_eq!(
            *runner.finished.lock().unwrap(),
            vec!["A:one".to_string(), "A:two".to_string()]
        );
    }

    /// Wait for idle workers to remove their lanes
    async fn wait_for_lanes(dispatcher: &CommandDispatcher, expected: usize) {
        for _ in 0..200 {
            if dispatcher.lane_count() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "expected {} lanes, found {}",
            expected,
            dispatcher.lane_count()
        );
    }

    #[tokio::test]
    async fn test_busy_lanes_per_target() {
        let runner = Arc::new(SlowRunner {
            delay: Duration::from_millis(50),
            finished: Mutex::new(Vec::new()),
        });
        let dispatcher = Arc::new(CommandDispatcher::new(runner.clone()));

        let mut pending = Vec::new();
        for target in [None, Some("A"), Some("B"), Some("")] {
            let dispatcher = Arc::clone(&dispatcher);
            pending.push(tokio::spawn(async move {
                dispatcher.run(vec!["x".into()], target).await
            }));
        }
        // Unscoped and empty share a lane
        wait_for_lanes(&dispatcher, 3).await;

        for task in pending {
            task.await.unwrap().unwrap();
        }
        assert_eq!(runner.finished.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_idle_lanes_are_retired() {
        let runner = Arc::new(ScriptedRunner::new());
        let dispatcher = CommandDispatcher::new(runner.clone());

        for id in 0..20 {
            let target = format!("10.0.0.{}:5555", id);
            dispatcher.run(vec!["x".into()], Some(&target)).await.unwrap();
        }
        wait_for_lanes(&dispatcher, 0).await;

        // A retired lane starts again on demand
        let output = dispatcher.run(vec!["y".into()], Some("10.0.0.1:5555")).await.unwrap();
        assert!(output.success);
        assert_eq!(runner.call_count(), 21);
        wait_for_lanes(&dispatcher, 0).await;
    }

    #[tokio::test]
    async fn test_submit_returns_closure_result() {
        let runner = Arc::new(ScriptedRunner::new().respond(CommandOutput::success("42")));
        let dispatcher = CommandDispatcher::new(runner.clone());

        let parsed = dispatcher
            .submit(Some("A"), move || {
                runner
                    .run(&["shell".to_string()], Some("A"))
                    .output
                    .parse::<u32>()
                    .ok()
            })
            .await
            .unwrap();

        assert_eq!(parsed, Some(42));
    }

    #[tokio::test]
    async fn test_panicking_job_reports_closed_and_lane_survives() {
        let runner = Arc::new(ScriptedRunner::new());
        let dispatcher = CommandDispatcher::new(runner);

        let result: Result<()> = dispatcher
            .submit(Some("A"), || panic!("job blew up"))
            .await;
        assert!(matches!(result, Err(Error::ChannelClosed)));

        let output = dispatcher.run(vec!["after".into()], Some("A")).await.unwrap();
        assert!(output.success);
    }
}
