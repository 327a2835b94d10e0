use std::cell::RefCell;
use std::collections::VecDeque;

use web_time::{Duration, Instant};

use reprise_core::{ErrorInfo, ErrorReporter, Frame};

/// How many captured failures the inspector keeps.
pub const REPORT_CAPACITY: usize = 32;

#[derive(Clone, Debug)]
pub struct Report {
    pub at: Instant,
    pub message: String,
    pub component: String,
    pub thrown: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub build_ms: f32,
    pub passes: u32,
    pub view_nodes: usize,
}

/// Records failures captured by error boundaries and per-frame metrics.
///
/// Install it as the error reporter for a subtree with
/// `with_error_reporter(inspector.clone(), ...)`.
pub struct Inspector {
    reports: RefCell<VecDeque<Report>>,
    total_reports: RefCell<u64>,
    frame_count: RefCell<u64>,
    last_frame: RefCell<Option<Instant>>,
    fps_smooth: RefCell<f32>,
    pub metrics: RefCell<Option<Metrics>>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            reports: RefCell::new(VecDeque::with_capacity(REPORT_CAPACITY)),
            total_reports: RefCell::new(0),
            frame_count: RefCell::new(0),
            last_frame: RefCell::new(None),
            fps_smooth: RefCell::new(0.0),
            metrics: RefCell::new(None),
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().iter().cloned().collect()
    }

    pub fn total_reports(&self) -> u64 {
        *self.total_reports.borrow()
    }

    pub fn frame(&self, frame: &Frame) {
        *self.frame_count.borrow_mut() += 1;
        let now = Instant::now();
        if let Some(prev) = self.last_frame.borrow_mut().replace(now) {
            let dt = (now - prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // simple EMA
                let a = 0.2;
                let mut smooth = self.fps_smooth.borrow_mut();
                *smooth = if *smooth == 0.0 {
                    fps
                } else {
                    (1.0 - a) * *smooth + a * fps
                };
            }
        }
        let mut nodes = 0;
        frame.root.walk(&mut |_| nodes += 1);
        *self.metrics.borrow_mut() = Some(Metrics {
            build_ms: duration_ms(frame.build_time),
            passes: frame.passes,
            view_nodes: nodes,
        });
    }

    /// One-line HUD summary.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("frame: {}", self.frame_count.borrow()),
            format!("fps: {:.1}", self.fps_smooth.borrow()),
        ];
        if let Some(m) = self.metrics.borrow().as_ref() {
            parts.push(format!("build: {:.2} ms", m.build_ms));
            parts.push(format!("passes: {}", m.passes));
            parts.push(format!("nodes: {}", m.view_nodes));
        }
        parts.push(format!("errors: {}", self.total_reports()));
        if let Some(last) = self.reports.borrow().back() {
            parts.push(format!("last: {} @ '{}'", last.message, last.component));
        }
        parts.join("  |  ")
    }
}

impl ErrorReporter for Inspector {
    fn report(&self, info: &ErrorInfo) {
        log::error!("boundary captured in '{}': {}", info.component, info.message);
        let mut reports = self.reports.borrow_mut();
        if reports.len() == REPORT_CAPACITY {
            reports.pop_front();
        }
        reports.push_back(Report {
            at: Instant::now(),
            message: info.message.clone(),
            component: info.component.clone(),
            thrown: info.is_thrown(),
        });
        *self.total_reports.borrow_mut() += 1;
    }
}

fn duration_ms(d: Duration) -> f32 {
    d.as_secs_f32() * 1000.0
}
