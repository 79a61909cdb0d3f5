use crate::frame::FrameId;
use crate::store::{AmbientRecord, DeckStore, FrameRecord, SETTINGS_KEY};
use log::{info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum StoreJob {
    PutFrame {
        record: FrameRecord,
        payload: Option<Arc<[u8]>>,
    },
    DeleteFrame(FrameId),
    DeleteMedia(String),
    PutSettings {
        record: AmbientRecord,
        payloads: Vec<(String, Arc<[u8]>)>,
    },
    Flush(Sender<()>),
    Stop,
}

/// Hands store writes to a background thread so deck mutations never wait
/// on the filesystem. Jobs are applied in submission order; failures are
/// logged and dropped, leaving the in-memory deck authoritative.
pub struct StoreSync {
    tx: Sender<StoreJob>,
    worker: Option<JoinHandle<()>>,
}

impl StoreSync {
    pub fn spawn(store: DeckStore) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("deck-store".into())
            .spawn(move || worker_loop(store, rx));
        match worker {
            Ok(handle) => Self { tx, worker: Some(handle) },
            Err(err) => {
                warn!("[store] could not start persistence worker: {err}; keeping in-memory state only");
                Self { tx, worker: None }
            }
        }
    }

    pub fn queue_put_frame(&self, record: FrameRecord, payload: Option<Arc<[u8]>>) {
        self.send(StoreJob::PutFrame { record, payload });
    }

    pub fn queue_delete_frame(&self, id: FrameId) {
        self.send(StoreJob::DeleteFrame(id));
    }

    pub fn queue_delete_media(&self, key: String) {
        self.send(StoreJob::DeleteMedia(key));
    }

    pub fn queue_put_settings(&self, record: AmbientRecord, payloads: Vec<(String, Arc<[u8]>)>) {
        self.send(StoreJob::PutSettings { record, payloads });
    }

    /// Blocks until every job queued so far has been applied.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.send(StoreJob::Flush(ack_tx));
        let _ = ack_rx.recv();
    }

    fn send(&self, job: StoreJob) {
        if self.worker.is_none() {
            return;
        }
        if self.tx.send(job).is_err() {
            warn!("[store] persistence worker is gone; keeping in-memory state only");
        }
    }
}

impl Drop for StoreSync {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.tx.send(StoreJob::Stop);
            if worker.join().is_err() {
                warn!("[store] persistence worker panicked during shutdown");
            }
        }
    }
}

fn worker_loop(store: DeckStore, rx: Receiver<StoreJob>) {
    let mut applied = 0u64;
    let mut failed = 0u64;
    loop {
        match rx.recv() {
            Ok(StoreJob::PutFrame { record, payload }) => {
                let id = record.id;
                if let Some(bytes) = payload {
                    if let Err(err) = store.put_media(&record.content.locator, &bytes) {
                        failed += 1;
                        warn!("[store] media write for frame {id} failed: {err:#}");
                    }
                }
                match store.put_frame(&record) {
                    Ok(()) => applied += 1,
                    Err(err) => {
                        failed += 1;
                        warn!("[store] frame record {id} write failed: {err:#}");
                    }
                }
            }
            Ok(StoreJob::DeleteFrame(id)) => match store.delete_frame(id) {
                Ok(()) => applied += 1,
                Err(err) => {
                    failed += 1;
                    warn!("[store] frame record {id} delete failed: {err:#}");
                }
            },
            Ok(StoreJob::DeleteMedia(key)) => match store.delete_media(&key) {
                Ok(()) => applied += 1,
                Err(err) => {
                    failed += 1;
                    warn!("[store] media delete '{key}' failed: {err:#}");
                }
            },
            Ok(StoreJob::PutSettings { record, payloads }) => {
                for (key, bytes) in payloads {
                    if let Err(err) = store.put_media(&key, &bytes) {
                        failed += 1;
                        warn!("[store] media write '{key}' failed: {err:#}");
                    }
                }
                match store.put_settings(SETTINGS_KEY, &record) {
                    Ok(()) => applied += 1,
                    Err(err) => {
                        failed += 1;
                        warn!("[store] settings write failed: {err:#}");
                    }
                }
            }
            Ok(StoreJob::Flush(ack)) => {
                let _ = ack.send(());
            }
            Ok(StoreJob::Stop) | Err(_) => break,
        }
    }
    info!("[store] persistence worker stopped: {applied} writes applied, {failed} failed");
}
