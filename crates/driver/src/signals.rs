use etch_library::session::ExitRequest;

/// Routes SIGINT, SIGTERM and SIGHUP into `exit`, so the main loop leaves
/// normally and the shutdown sequence (lift, home, release) still runs.
pub(crate) fn install(exit: &ExitRequest) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(on_signal(exit.clone()))
}

fn on_signal(exit: ExitRequest) -> impl FnMut() + Send + 'static {
    move || {
        log::info!("Exit requested by signal");
        exit.request();
    }
}
