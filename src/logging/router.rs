use std::fmt::{self, Write as _};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use chrono::Local;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Destination of one thread's log lines.
struct Route {
    thread: ThreadId,
    filter: LevelFilter,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Route {
    fn write_line(&self, line: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        // A broken sink must not take the emitting job down with it.
        let _ = sink.write_all(line.as_bytes()).and_then(|_| sink.flush());
    }
}

/// Routes log records to per-thread sinks.
///
/// Every record is tagged with the identity of the thread emitting it and
/// written only to the route installed for that exact thread, so workers
/// running side by side each get a clean file of their own. Records from a
/// thread without a route are dropped.
///
/// The route table lock covers only installation and lookup; the write
/// itself happens under the matched route's own lock.
#[derive(Default)]
pub struct LogRouter {
    routes: RwLock<Vec<Arc<Route>>>,
}

impl LogRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send records emitted by `thread` at or above `filter` to `sink`,
    /// replacing any route that thread already had.
    pub fn install_route<W>(&self, thread: ThreadId, sink: W, filter: LevelFilter)
    where
        W: Write + Send + 'static,
    {
        let route = Arc::new(Route {
            thread,
            filter,
            sink: Mutex::new(Box::new(sink)),
        });

        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        routes.retain(|existing| existing.thread != thread);
        routes.push(route);
    }

    /// Like [`install_route`](Self::install_route), appending to the file at
    /// `path` and creating it and its parent directories as needed.
    pub fn install_file_route(
        &self,
        thread: ThreadId,
        path: &Path,
        filter: LevelFilter,
    ) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        self.install_route(thread, file, filter);
        Ok(())
    }

    /// Route the calling thread to `path` until the returned guard drops.
    pub fn enter(&self, path: &Path, filter: LevelFilter) -> io::Result<RouteGuard<'_>> {
        let thread = thread::current().id();
        self.install_file_route(thread, path, filter)?;
        Ok(RouteGuard {
            router: self,
            thread,
        })
    }

    /// Remove the route of `thread`, if any, closing its sink.
    pub fn remove_route(&self, thread: ThreadId) {
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|route| route.thread != thread);
    }

    /// Whether `thread` currently has a route.
    pub fn has_route(&self, thread: ThreadId) -> bool {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|route| route.thread == thread)
    }

    /// Write `message` to every route of the calling thread that accepts `level`.
    ///
    /// The message is only rendered when some route takes it, so callers can
    /// pass `format_args!` directly.
    pub fn emit(&self, level: Level, message: impl fmt::Display) {
        let thread = thread::current().id();
        let matched: Vec<Arc<Route>> = {
            let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
            routes
                .iter()
                .filter(|route| route.thread == thread && level <= route.filter)
                .cloned()
                .collect()
        };
        if matched.is_empty() {
            return;
        }

        let line = format_line(level, message);
        for route in matched {
            route.write_line(&line);
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::INFO, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::WARN, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::ERROR, message);
    }
}

/// Removes the calling thread's route when dropped.
pub struct RouteGuard<'a> {
    router: &'a LogRouter,
    thread: ThreadId,
}

impl Drop for RouteGuard<'_> {
    fn drop(&mut self) {
        self.router.remove_route(self.thread);
    }
}

fn format_line(level: Level, message: impl fmt::Display) -> String {
    let mut line = String::with_capacity(128);
    let _ = writeln!(
        line,
        "{} | {:<5} | {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level.as_str(),
        message
    );
    line
}
