use std::sync::Arc;
use std::thread;

use tracing_pretty_log::memory_sink::MemorySink;
use tracing_pretty_log::{
    Attr, Handler, HandlerOptions, LogRecord, PrettyHandler, Severity, SharedSink,
};

fn handler(memory: &MemorySink) -> PrettyHandler {
    PrettyHandler::new(SharedSink::new(memory.clone()), HandlerOptions::default())
}

fn assert_complete_lines(memory: &MemorySink, expected: usize) {
    let lines = memory.lines();
    assert_eq!(lines.len(), expected);
    for line in &lines {
        assert!(line.starts_with('['), "mixed line: {:?}", line);
        assert_eq!(line.matches("\x1b[34mINFO\x1b[0m").count(), 1, "mixed line: {:?}", line);
        assert!(line.ends_with("\x1b[0m"), "truncated line: {:?}", line);
    }
}

#[test]
fn threads_sharing_one_handler_never_interleave() {
    let memory = MemorySink::new();
    let shared = Arc::new(handler(&memory));

    let workers: Vec<_> = (0..100)
        .map(|i| {
            let h = Arc::clone(&shared);
            thread::spawn(move || {
                h.handle(&LogRecord::new(Severity::INFO, format!("worker {} reporting in", i)))
                    .unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_complete_lines(&memory, 100);
    for i in 0..100 {
        let needle = format!("worker {} reporting in", i);
        assert!(memory.contents().contains(&needle));
    }
}

#[test]
fn derived_handlers_share_the_sink() {
    let memory = MemorySink::new();
    let root = handler(&memory);

    let workers: Vec<_> = (0..50)
        .map(|i| {
            let child = root.with_attrs(&[Attr::new("worker", i)]);
            thread::spawn(move || {
                child.handle(&LogRecord::new(Severity::INFO, "tick")).unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let out = memory.contents();
    for i in 0..50 {
        assert!(out.contains(&format!("\"worker\": {}", i)));
    }
    assert!(root.context_attrs().is_empty());
    assert_eq!(out.matches("\x1b[34mINFO\x1b[0m").count(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_sharing_one_handler_never_interleave() {
    let memory = MemorySink::new();
    let shared = Arc::new(handler(&memory));

    let mut tasks = Vec::new();
    for i in 0..100 {
        let h = Arc::clone(&shared);
        tasks.push(tokio::spawn(async move {
            h.handle(&LogRecord::new(Severity::INFO, format!("task {}", i)))
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_complete_lines(&memory, 100);
}
