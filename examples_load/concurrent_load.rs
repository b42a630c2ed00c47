use std::sync::Arc;
use std::time::Instant;

use tracing_pretty_log::memory_sink::MemorySink;
use tracing_pretty_log::{Attr, Handler, HandlerOptions, LogRecord, PrettyHandler, Severity, SharedSink};

#[tokio::main]
async fn main() {
    let memory = MemorySink::new();
    let handler = Arc::new(
        PrettyHandler::new(SharedSink::new(memory.clone()), HandlerOptions::default())
            .with_attrs(&[Attr::new("service", "load")]),
    );

    let tasks: u64 = 8;
    let per_task: u64 = 10_000;
    let start = Instant::now();

    let mut handles = Vec::new();
    for t in 0..tasks {
        let h = Arc::clone(&handler);
        handles.push(tokio::spawn(async move {
            for i in 0..per_task {
                let record = LogRecord::new(Severity::INFO, "load test").with_attr("iteration", i);
                if let Err(e) = h.handle(&record) {
                    eprintln!("task {} failed: {}", t, e);
                }
            }
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }

    let n = tasks * per_task;
    let elapsed = start.elapsed();
    println!(
        "rendered {} records ({} bytes) in {:?} (~{:.0} rec/s)",
        n,
        memory.contents().len(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
