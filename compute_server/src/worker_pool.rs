// THEORY:
// A fixed set of worker tasks fed by a single dispatcher.
//
//   submit ──► job channel ──► dispatcher ──round robin──► worker 0..N
//                                                            │
//   caller ◄──────────────── oneshot reply ◄─────────────────┘
//
// Engines are CPU-bound and synchronous, so a worker never runs one on the async
// executor: it hands the operation to `spawn_blocking` and awaits the result.
// N workers therefore means at most N computations in flight, however many
// requests are queued.
//
// A caller that stops waiting (timeout, dropped connection) drops its reply
// receiver. A job that is still queued at that point is skipped; a job that has
// already started runs to completion and its result is discarded.

use crate::error::ApiError;
use compute_engine::{ComputeResult, Operation, Outcome, execute};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub struct Job {
    pub operation: Operation,
    pub reply: oneshot::Sender<ComputeResult<Outcome>>,
}

pub struct WorkerPool {
    job_sender: mpsc::UnboundedSender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `size` workers. Must be called inside a tokio
    /// runtime. A `size` of zero is treated as one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (job_sender, mut job_receiver) = mpsc::unbounded_channel::<Job>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::unbounded_channel::<Job>()).unzip();

        tokio::spawn(async move {
            let mut worker_index = 0;
            while let Some(job) = job_receiver.recv().await {
                // A dead worker drops the job, and with it the caller's reply.
                let _ = worker_senders[worker_index].send(job);
                worker_index = (worker_index + 1) % size;
            }
        });

        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(id, mut worker_receiver)| {
                tokio::spawn(async move {
                    while let Some(Job { operation, reply }) = worker_receiver.recv().await {
                        if reply.is_closed() {
                            continue;
                        }
                        match tokio::task::spawn_blocking(move || execute(operation)).await {
                            Ok(result) => {
                                let _ = reply.send(result);
                            }
                            Err(join_error) => {
                                eprintln!("[compute] worker {} lost a job: {}", id, join_error);
                            }
                        }
                    }
                })
            })
            .collect();

        Self { job_sender, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues `operation` and waits for its result.
    pub async fn submit(&self, operation: Operation) -> Result<Outcome, ApiError> {
        let (reply, result_receiver) = oneshot::channel();
        self.job_sender
            .send(Job { operation, reply })
            .map_err(|_| ApiError::WorkerUnavailable)?;

        let result = result_receiver.await.map_err(|_| ApiError::WorkerUnavailable)?;
        Ok(result?)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}
