//! Connection liveness monitor.
//!
//! Polls the transport while a link is managed. Timer fires and transport
//! events can both go quiet on a dead link, so an explicit poll is the
//! loss signal of last resort.

use std::cell::RefCell;
use std::rc::Rc;

use relink_core::{Providers, TimeProvider, Transport};
use tokio::sync::mpsc;

use crate::link::LinkShared;
use crate::scheduler::LinkCommand;

/// Poll the transport until shutdown or a detected loss.
///
/// On loss the monitor notifies the schedule loop and exits; it never
/// restarts the cycle itself. Arming a new link spawns a fresh monitor.
pub(crate) async fn monitor_loop<P: Providers>(
    shared: Rc<RefCell<LinkShared<P>>>,
    cmd_tx: mpsc::UnboundedSender<LinkCommand>,
    mut shutdown_rx: mpsc::UnboundedReceiver<()>,
) {
    let (time, transport, address, poll_interval) = {
        let s = shared.borrow();
        let address = match s.address {
            Some(address) => address,
            None => return,
        };
        (
            s.time.clone(),
            s.transport.clone(),
            address,
            s.config.poll_interval,
        )
    };

    loop {
        // Wait one poll period, exiting early on shutdown.
        if time.timeout(poll_interval, shutdown_rx.recv()).await.is_ok() {
            tracing::debug!("liveness monitor shutting down");
            return;
        }

        let alive = transport.is_connected(&address).await;
        shared.borrow_mut().metrics.record_poll();
        if !alive {
            tracing::warn!("liveness poll found {} disconnected", address);
            shared.borrow_mut().metrics.record_loss();
            let _ = cmd_tx.send(LinkCommand::ConnectionLost);
            return;
        }
    }
}
