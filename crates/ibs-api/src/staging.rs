//! Server-side holding area for imports waiting on a duplicate decision.
//!
//! A batch is parked under a random token when an append-mode import finds
//! rows whose key already exists. The follow-up resolve request names the
//! token and an action; the batch is taken out exactly once. Expired batches
//! are pruned whenever a new one is staged.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use ibs_core::import::{ImportKind, ImportRecords};
use tokio::sync::Mutex;
use uuid::Uuid;

struct Batch {
  records:   ImportRecords,
  staged_at: Instant,
}

pub struct Staging {
  ttl:     Duration,
  batches: Mutex<HashMap<Uuid, Batch>>,
}

impl Staging {
  pub fn new(ttl: Duration) -> Self { Self { ttl, batches: Mutex::new(HashMap::new()) } }

  /// Park `records` and return the token that claims them.
  pub async fn stage(&self, records: ImportRecords) -> Uuid {
    let mut batches = self.batches.lock().await;
    let ttl = self.ttl;
    batches.retain(|_, b| b.staged_at.elapsed() < ttl);

    let token = Uuid::new_v4();
    batches.insert(token, Batch { records, staged_at: Instant::now() });
    token
  }

  /// Take the batch for `token` if it is still fresh and belongs to `kind`.
  /// A token of another resource is left in place.
  pub async fn take(&self, token: Uuid, kind: ImportKind) -> Option<ImportRecords> {
    let mut batches = self.batches.lock().await;
    let batch = batches.get(&token)?;
    if batch.staged_at.elapsed() >= self.ttl {
      batches.remove(&token);
      return None;
    }
    if batch.records.kind() != kind {
      return None;
    }
    batches.remove(&token).map(|b| b.records)
  }

  #[cfg(test)]
  async fn len(&self) -> usize { self.batches.lock().await.len() }
}

#[cfg(test)]
mod tests {
  use ibs_core::{
    field_worker::{FieldWorkerStatus, NewFieldWorker},
    import::Numbered,
  };

  use super::*;

  fn batch() -> ImportRecords {
    ImportRecords::FieldWorkers(vec![Numbered {
      row:    2,
      record: NewFieldWorker {
        nama_pcl:   "Budi".into(),
        status_pcl: FieldWorkerStatus::Mitra,
        telp_pcl:   None,
      },
    }])
  }

  #[tokio::test]
  async fn tokens_are_single_use() {
    let staging = Staging::new(Duration::from_secs(60));
    let token = staging.stage(batch()).await;
    assert!(staging.take(token, ImportKind::FieldWorkers).await.is_some());
    assert!(staging.take(token, ImportKind::FieldWorkers).await.is_none());
  }

  #[tokio::test]
  async fn token_is_bound_to_its_resource() {
    let staging = Staging::new(Duration::from_secs(60));
    let token = staging.stage(batch()).await;
    assert!(staging.take(token, ImportKind::Surveys).await.is_none());
    assert!(staging.take(token, ImportKind::FieldWorkers).await.is_some());
  }

  #[tokio::test]
  async fn expired_batches_are_dropped() {
    let staging = Staging::new(Duration::ZERO);
    let token = staging.stage(batch()).await;
    assert!(staging.take(token, ImportKind::FieldWorkers).await.is_none());

    staging.stage(batch()).await;
    staging.stage(batch()).await;
    assert_eq!(staging.len().await, 1);
  }
}
