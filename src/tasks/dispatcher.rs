use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::DocmineError;
use crate::tasks::task::{Task, TaskContext, TaskReport};

/// Fixed pool of worker threads draining one FIFO task queue.
pub struct Dispatcher {
    workers: usize,
    ctx: TaskContext,
}

impl Dispatcher {
    /// A dispatcher with `workers` threads (at least one).
    #[must_use]
    pub fn new(workers: usize, ctx: TaskContext) -> Self {
        Self {
            workers: workers.max(1),
            ctx,
        }
    }

    /// Run every task and block until the queue is drained.
    ///
    /// Tasks start in submission order but may finish in any order. Every
    /// task yields a report, including tasks that failed or panicked, and the
    /// reports come back in submission order.
    #[must_use]
    pub fn run(&self, tasks: Vec<Task>) -> Vec<TaskReport> {
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }
        let workers = self.workers.min(total);
        tracing::info!("dispatching {total} task(s) across {workers} worker(s)");

        let (task_tx, task_rx) = unbounded::<(usize, Task)>();
        let (result_tx, result_rx) = unbounded::<(usize, TaskReport)>();
        for entry in tasks.into_iter().enumerate() {
            if task_tx.send(entry).is_err() {
                break;
            }
        }
        drop(task_tx);

        thread::scope(|scope| {
            for worker_id in 0..workers {
                let rx = task_rx.clone();
                let tx = result_tx.clone();
                let ctx = &self.ctx;
                scope.spawn(move || worker_loop(worker_id, &rx, &tx, ctx));
            }
        });
        drop(result_tx);

        let mut reports: Vec<(usize, TaskReport)> = result_rx.iter().collect();
        reports.sort_by_key(|(seq, _)| *seq);
        reports.into_iter().map(|(_, report)| report).collect()
    }
}

fn worker_loop(
    worker_id: usize,
    rx: &Receiver<(usize, Task)>,
    tx: &Sender<(usize, TaskReport)>,
    ctx: &TaskContext,
) {
    for (seq, task) in rx {
        tracing::info!(worker = worker_id, "running {task}");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.execute(ctx)))
            .unwrap_or_else(|_| {
                Err(DocmineError::TaskPanicked {
                    task: task.to_string(),
                })
            });
        match &outcome {
            Ok(_) => tracing::info!(worker = worker_id, "finished {task}"),
            Err(e) => tracing::error!(worker = worker_id, "{task} failed: {e}"),
        }
        if tx.send((seq, TaskReport::new(&task, outcome))).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Store;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn dispatcher(tmp: &TempDir, workers: usize) -> Dispatcher {
        Dispatcher::new(workers, TaskContext::new(Config::new(tmp.path())))
    }

    #[test]
    fn empty_queue_returns_no_reports() {
        let tmp = TempDir::new().unwrap();
        assert!(dispatcher(&tmp, 2).run(Vec::new()).is_empty());
    }

    #[test]
    fn reports_follow_submission_order() {
        let tmp = TempDir::new().unwrap();
        let tasks = vec![
            Task::InitDb,
            Task::ApplyNlp("a.pdf".into()),
            Task::GenerateTopics("a.pdf".into()),
            Task::GenerateEmbeddings("a.pdf".into()),
            Task::ClusterEmbeddings("a.pdf".into()),
        ];
        let reports = dispatcher(&tmp, 2).run(tasks.clone());
        assert_eq!(reports.len(), tasks.len());
        for (report, task) in reports.iter().zip(&tasks) {
            assert_eq!(report.task, task.name());
            assert!(report.ok, "{report:?}");
        }
    }

    #[test]
    fn failures_are_reported_not_swallowed() {
        let tmp = TempDir::new().unwrap();
        let reports = dispatcher(&tmp, 2).run(vec![
            Task::ProcessPdf(PathBuf::from("/no/such/file.pdf")),
            Task::InitDb,
        ]);
        assert!(!reports[0].ok);
        assert!(reports[0].error.as_deref().unwrap().contains("io error"));
        assert!(reports[1].ok);
    }

    #[test]
    fn workers_share_one_store() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join("text_data.db"));
        {
            let mut db = store.open().unwrap();
            for name in ["a.pdf", "b.pdf", "c.pdf"] {
                db.store_file_with_chunks(name, &["the cats are running".to_string()])
                    .unwrap();
            }
        }
        let tasks = ["a.pdf", "b.pdf", "c.pdf"]
            .iter()
            .map(|n| Task::ApplyNlp((*n).to_string()))
            .collect();
        let reports = dispatcher(&tmp, 3).run(tasks);
        assert!(reports.iter().all(|r| r.ok));

        let db = store.open().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            assert_eq!(db.get_processed_texts(name).unwrap().len(), 1);
        }
    }
}
