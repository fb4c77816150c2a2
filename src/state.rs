use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::charts::{render_view, ChartBundle};
use crate::data::filter::{filter, FilterSelection};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Render state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPhase {
    Idle,
    Rendering,
}

/// One complete render, published as a unit.
#[derive(Debug, Clone, Serialize)]
pub struct Published {
    /// Generation of the submission this render answered.
    pub generation: u64,
    /// Total renders performed so far, this one included.
    pub renders: u64,
    pub selection: FilterSelection,
    /// Records that passed the filter.
    pub matched: usize,
    pub charts: ChartBundle,
}

#[derive(Debug, Clone)]
struct Submission {
    generation: u64,
    selection: FilterSelection,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("render loop has stopped")]
    Stopped,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the dataset and the render loop.
///
/// Submissions go through a `watch` channel, which keeps only the newest
/// value: anything submitted while a render is in flight replaces whatever
/// was pending, and the loop renders once more with the latest selection.
pub struct Controller {
    dataset: Arc<Dataset>,
    submissions: watch::Sender<Submission>,
    published: watch::Receiver<Arc<Published>>,
    phase: watch::Receiver<RenderPhase>,
    task: JoinHandle<()>,
}

impl Controller {
    /// Render the default selection synchronously, then start the loop.
    /// Must be called inside a tokio runtime.
    pub fn start(dataset: Arc<Dataset>) -> Self {
        let initial = FilterSelection::everything(dataset.options());
        let view = filter(&dataset, &initial);
        let first = Published {
            generation: 0,
            renders: 1,
            matched: view.len(),
            charts: render_view(&view),
            selection: initial.clone(),
        };

        let (submissions, submission_rx) = watch::channel(Submission {
            generation: 0,
            selection: initial,
        });
        let (published_tx, published) = watch::channel(Arc::new(first));
        let (phase_tx, phase) = watch::channel(RenderPhase::Idle);

        let task = tokio::spawn(render_loop(
            Arc::clone(&dataset),
            submission_rx,
            published_tx,
            phase_tx,
        ));

        Controller {
            dataset,
            submissions,
            published,
            phase,
            task,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Queue a selection; returns the generation assigned to it.
    pub fn submit(&self, selection: FilterSelection) -> u64 {
        let mut generation = 0;
        self.submissions.send_modify(|pending| {
            pending.generation += 1;
            pending.selection = selection;
            generation = pending.generation;
        });
        generation
    }

    /// Wait until a render at or past `generation` is published.
    pub async fn published_after(&self, generation: u64) -> Result<Arc<Published>, ControllerError> {
        let mut rx = self.published.clone();
        let published = rx
            .wait_for(|p| p.generation >= generation)
            .await
            .map_err(|_| ControllerError::Stopped)?;
        Ok(Arc::clone(&published))
    }

    /// Submit and wait for the answering render.  With overlapping
    /// submissions the answer may come from a newer selection.
    pub async fn render(&self, selection: FilterSelection) -> Result<Arc<Published>, ControllerError> {
        let generation = self.submit(selection);
        self.published_after(generation).await
    }

    /// The most recently published render.
    pub fn latest(&self) -> Arc<Published> {
        Arc::clone(&self.published.borrow())
    }

    pub fn phase(&self) -> RenderPhase {
        *self.phase.borrow()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn render_loop(
    dataset: Arc<Dataset>,
    mut submissions: watch::Receiver<Submission>,
    published: watch::Sender<Arc<Published>>,
    phase: watch::Sender<RenderPhase>,
) {
    let mut renders = 1;
    while submissions.changed().await.is_ok() {
        phase.send_replace(RenderPhase::Rendering);
        let Submission {
            generation,
            selection,
        } = submissions.borrow_and_update().clone();

        let view = filter(&dataset, &selection);
        let charts = render_view(&view);
        renders += 1;
        log::debug!(
            "Render #{renders} (generation {generation}): {} records matched",
            view.len()
        );

        published.send_replace(Arc::new(Published {
            generation,
            renders,
            matched: view.len(),
            selection,
            charts,
        }));
        phase.send_replace(RenderPhase::Idle);
    }
}
