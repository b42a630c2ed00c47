use tracing::{error, info, info_span, warn};

use tracing_pretty_log::init::init_pretty_logging;
use tracing_pretty_log::{Attr, HandlerOptions, Logger, PrettyHandler, Severity};

fn main() {
    // Direct use of the handler through a `Logger`.
    let logger = Logger::new(PrettyHandler::stdout(
        HandlerOptions::default().with_min_severity(Severity::DEBUG),
    ));
    let _ = logger.debug("connecting", &[Attr::new("host", "db.internal")]);

    let request = logger.with(&[Attr::new("request_id", "7f3a")]);
    let _ = request.info("request served", &[Attr::new("status", 200), Attr::new("ms", 12.5)]);
    let _ = request.log(Severity::new(2), "custom level", &[]);

    // The same handler behind `tracing` macros.
    if let Err(e) = init_pretty_logging(HandlerOptions::default()) {
        eprintln!("{}", e);
        return;
    }

    info!("service starting");
    let span = info_span!("job", name = "reindex");
    let _guard = span.enter();
    warn!(remaining = 42, "queue is backing up");
    error!(error = "timeout", "job failed");
}
