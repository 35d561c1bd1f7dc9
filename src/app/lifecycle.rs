use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::Logger;
use crate::{
    display::{screen::Screen, TextDisplay},
    lights::LightEffect,
    Error, Result,
};

/// Install a ctrl-c handler that flips the shared running flag instead of
/// exiting immediately; the loops notice on their next tick.
pub(super) fn create_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_handle = running.clone();

    ctrlc::set_handler(move || {
        running_handle.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(running)
}

/// Return the hardware to a known state on the way out: lights off,
/// display blank.
pub(super) fn teardown<D: TextDisplay>(
    screen: &mut Screen<D>,
    lights: &mut LightEffect,
    logger: &Logger,
) {
    lights.stop(logger);
    screen.clear();
}
