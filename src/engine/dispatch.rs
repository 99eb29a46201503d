//! Keeps result handling honest when submissions overlap.
//!
//! Submitting never blocks the draft, so a user can fire a new query while an
//! older one is still in flight. Only the newest submission's result may
//! reach the display; anything slower comes back as [SubmissionOutcome::Superseded]
//! and gets dropped.
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::engine::gateway::ExecutionGateway;
use crate::engine::normalize::QueryRequest;
use crate::engine::rows::Row;
use crate::Error;

#[derive(Debug)]
pub enum SubmissionOutcome {
    Rows(Vec<Row>),
    /// A newer submission was issued before this one's response arrived.
    Superseded,
    Failed(Error),
}

pub struct Dispatcher {
    gateway: Arc<dyn ExecutionGateway>,
    newest_ticket: Arc<AtomicU64>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn ExecutionGateway>) -> Self {
        Dispatcher {
            gateway,
            newest_ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Issues a submission. The returned handle resolves once the gateway
    /// answers; by then a newer submission may have taken over, in which case
    /// the outcome is `Superseded` no matter what the gateway said.
    pub fn submit(&self, request: QueryRequest) -> JoinHandle<SubmissionOutcome> {
        let ticket = self.newest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let gateway = Arc::clone(&self.gateway);
        let newest_ticket = Arc::clone(&self.newest_ticket);

        tokio::spawn(async move {
            let result = gateway.execute(request).await;

            if newest_ticket.load(Ordering::SeqCst) != ticket {
                debug!("Discarding response for superseded submission {ticket}");
                return SubmissionOutcome::Superseded;
            }

            match result {
                Ok(rows) => SubmissionOutcome::Rows(rows),
                Err(error) => SubmissionOutcome::Failed(error),
            }
        })
    }
}

impl SubmissionOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, SubmissionOutcome::Superseded)
    }
}
