use std::future::pending;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use rowdelta_diff::{diff_sections, DiffResult, SectionDiff};
use rowdelta_types::ComparableSection;

use crate::config::ContentConfig;
use crate::error::{ContentError, Result};
use crate::event::ContentEvent;
use crate::state::{ContentPhase, ContentState, Decision, Snapshot};

/// Receiver for delivered cycles.
///
/// Unbounded and lossless: every event of every delivered cycle arrives, in
/// order.
pub type ContentStream<S> = mpsc::UnboundedReceiver<ContentEvent<S>>;

enum Command<S> {
    Submit { old: Vec<S>, new: Vec<S> },
    Phase(oneshot::Sender<ContentPhase>),
}

/// Handle to a running diff coordinator.
///
/// Snapshot pairs are submitted from any thread; diffing runs on the blocking
/// pool and results are delivered through the [`ContentStream`] returned by
/// [`DeltaContent::spawn`]. Dropping the handle stops the coordinator.
pub struct DeltaContent<S: ComparableSection> {
    commands: mpsc::UnboundedSender<Command<S>>,
    config: ContentConfig,
}

impl<S: ComparableSection> DeltaContent<S> {
    /// Start a coordinator on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: ContentConfig) -> (Self, ContentStream<S>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        info!(
            min_update_interval_ms = config.min_update_interval.as_millis() as u64,
            find_duplicates = config.find_duplicates,
            "delta content started"
        );

        let delivery = Delivery {
            config: config.clone(),
            state: ContentState::new(),
            commands: command_rx,
            events: event_tx,
            worker: None,
            deadline: None,
        };
        tokio::spawn(delivery.run());

        (
            Self {
                commands: command_tx,
                config,
            },
            event_rx,
        )
    }

    /// Queue a comparison of `old` against `new`. Never blocks.
    ///
    /// `old` is only used if no cycle is pending; otherwise the pending
    /// baseline is kept and `new` replaces the pending target.
    pub fn submit(&self, old: Vec<S>, new: Vec<S>) -> Result<()> {
        self.commands
            .send(Command::Submit { old, new })
            .map_err(|_| ContentError::Shutdown)
    }

    /// The coordinator's current phase.
    pub async fn phase(&self) -> Result<ContentPhase> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Phase(reply))
            .map_err(|_| ContentError::Shutdown)?;
        response.await.map_err(|_| ContentError::Shutdown)
    }

    /// Returns `true` once the delivery task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }
}

type WorkerOutput<S> = DiffResult<SectionDiff<S>>;

enum Wake<S: ComparableSection> {
    Command(Option<Command<S>>),
    Worker(std::result::Result<WorkerOutput<S>, JoinError>),
    Timer,
}

/// The delivery context: sole owner of the coordinator state.
struct Delivery<S: ComparableSection> {
    config: ContentConfig,
    state: ContentState<S>,
    commands: mpsc::UnboundedReceiver<Command<S>>,
    events: mpsc::UnboundedSender<ContentEvent<S>>,
    worker: Option<JoinHandle<WorkerOutput<S>>>,
    deadline: Option<Instant>,
}

impl<S: ComparableSection> Delivery<S> {
    async fn run(mut self) {
        loop {
            // Commands first so requests queued behind a finished diff mark
            // it stale before its result is looked at.
            let wake = tokio::select! {
                biased;
                command = self.commands.recv() => Wake::Command(command),
                joined = join_worker(&mut self.worker) => Wake::Worker(joined),
                () = wait_deadline(self.deadline) => Wake::Timer,
            };

            match wake {
                Wake::Command(None) => break,
                Wake::Command(Some(Command::Submit { old, new })) => {
                    if self.state.submit(old, new) {
                        self.start_run();
                    } else {
                        debug!(phase = %self.state.phase(), "request coalesced");
                    }
                }
                Wake::Command(Some(Command::Phase(reply))) => {
                    let _ = reply.send(self.state.phase());
                }
                Wake::Worker(joined) => {
                    self.worker = None;
                    match flatten(joined) {
                        Ok(diff) => self.on_diff(diff),
                        Err(err) => {
                            error!(%err, "diff failed, stopping delta content");
                            break;
                        }
                    }
                }
                Wake::Timer => {
                    self.deadline = None;
                    self.state.throttle_elapsed();
                    debug!("throttle elapsed, re-diffing");
                    self.start_run();
                }
            }
        }
        info!("delta content stopped");
    }

    fn start_run(&mut self) {
        let Some((old, new)) = self.state.begin_run() else {
            return;
        };
        debug!(old_sections = old.len(), new_sections = new.len(), "diff started");
        let find_duplicates = self.config.find_duplicates;
        self.worker = Some(tokio::task::spawn_blocking(move || {
            compute(old, new, find_duplicates)
        }));
    }

    fn on_diff(&mut self, diff: SectionDiff<S>) {
        match self
            .state
            .decide(Instant::now(), self.config.min_update_interval)
        {
            Decision::Restart => {
                debug!("result superseded, re-diffing");
                self.start_run();
            }
            Decision::Drop => {
                debug!("deferred delivery already scheduled, result dropped");
            }
            Decision::Defer(delay) => {
                debug!(delay_ms = delay.as_millis() as u64, "delivery throttled");
                self.deadline = Some(Instant::now() + delay);
            }
            Decision::Deliver => {
                self.deliver(diff);
                self.state.finish(Instant::now());
            }
        }
    }

    fn deliver(&self, diff: SectionDiff<S>) {
        let SectionDiff {
            item_diffs,
            sections,
        } = diff;
        let section_count = item_diffs.len();

        self.emit(ContentEvent::Start);

        // Old section order: sections have not moved yet.
        for (section, items) in item_diffs {
            self.emit(ContentEvent::ItemUpdate {
                items: items.unmoved_items,
                section,
                insertions: items.insertion_indexes,
                reloads: items.reload_index_map,
                deletions: items.deletion_indexes,
            });
            self.emit(ContentEvent::ItemReorder {
                items: items.new_items,
                section,
                moves: items.move_index_map,
            });
        }

        self.emit(ContentEvent::SectionUpdate {
            sections: sections.unmoved_items,
            insertions: sections.insertion_indexes,
            reloads: sections.reload_index_map,
            deletions: sections.deletion_indexes,
        });
        self.emit(ContentEvent::SectionReorder {
            sections: sections.new_items,
            moves: sections.move_index_map,
        });
        self.emit(ContentEvent::Completion);

        debug!(sections = section_count, "cycle delivered");
    }

    fn emit(&self, event: ContentEvent<S>) {
        let kind = event.kind();
        if self.events.send(event).is_err() {
            debug!(%kind, "event stream closed, event discarded");
        }
    }
}

/// Worker body: diff the snapshots and report duplicates.
fn compute<S: ComparableSection>(
    old: Snapshot<S>,
    new: Snapshot<S>,
    find_duplicates: bool,
) -> WorkerOutput<S> {
    let diff = diff_sections(&old, &new, find_duplicates)?;
    if find_duplicates {
        report_duplicates(&diff);
    }
    Ok(diff)
}

fn report_duplicates<S: ComparableSection>(diff: &SectionDiff<S>) {
    for (section, items) in &diff.item_diffs {
        if let Some(indexes) = items.duplicated_indexes.as_ref().filter(|i| !i.is_empty()) {
            let duplicated: Vec<&S::Item> = indexes
                .iter()
                .filter_map(|index| items.new_items.get(*index))
                .collect();
            warn!(section, ?indexes, ?duplicated, "duplicated items detected");
        }
    }
    if let Some(indexes) = diff
        .sections
        .duplicated_indexes
        .as_ref()
        .filter(|i| !i.is_empty())
    {
        let duplicated: Vec<&S> = indexes
            .iter()
            .filter_map(|index| diff.sections.new_items.get(*index))
            .collect();
        warn!(?indexes, ?duplicated, "duplicated sections detected");
    }
}

fn flatten<S: ComparableSection>(
    joined: std::result::Result<WorkerOutput<S>, JoinError>,
) -> Result<SectionDiff<S>> {
    joined
        .map_err(|e| ContentError::Worker(e.to_string()))?
        .map_err(|e| ContentError::Worker(e.to_string()))
}

async fn join_worker<T>(
    worker: &mut Option<JoinHandle<T>>,
) -> std::result::Result<T, JoinError> {
    match worker {
        Some(handle) => handle.await,
        None => pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
