use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

/// Exit status used when a second interrupt forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Let the running cycle finish and save, then stop.
    FinishCycle,
    /// Leave immediately; the running cycle's updates are lost.
    Exit,
}

/// Reacts to the `count`-th interrupt. The first one cancels `cancel`.
pub fn handle_interrupt(count: u32, cancel: &CancellationToken) -> InterruptAction {
    if count <= 1 {
        engine_info!("Stop requested; finishing the current cycle (Ctrl-C again to quit now)");
        cancel.cancel();
        InterruptAction::FinishCycle
    } else {
        engine_warn!("Second stop request; exiting without saving the current cycle");
        InterruptAction::Exit
    }
}

/// Listens for Ctrl-C for the life of the process.
pub async fn listen(cancel: CancellationToken) {
    let mut count = 0;
    loop {
        if let Err(err) = tokio::signal::ctrl_c().await {
            engine_warn!("Could not listen for Ctrl-C: {}", err);
            return;
        }
        count += 1;
        if handle_interrupt(count, &cancel) == InterruptAction::Exit {
            std::process::exit(FORCED_EXIT_CODE);
        }
    }
}
