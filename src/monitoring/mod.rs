/*!
 * Process Monitoring
 * Per-tick resource sampling, report rendering and trace setup
 */

mod report;
mod sampler;
mod tracer;

pub use report::{render, NullSink, Report, ReportRow, ReportSink, StdoutSink};
pub use sampler::{clock_ticks_per_sec, Monitor, ProcSampler, Sample, Sampler};
pub use tracer::init_tracing;
