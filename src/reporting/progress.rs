//! Fixed-scale progress reporting for report runs

use crate::core::constants::progress::TARGET;

/// Receives progress values on the `0..=100` scale
pub trait ProgressCallback: Send {
    fn report(&mut self, value: u32);
}

impl<F> ProgressCallback for F
where
    F: FnMut(u32) + Send,
{
    fn report(&mut self, value: u32) {
        self(value)
    }
}

/// Splits the progress scale evenly across the phases of a run.
///
/// Reports 0 when started, one step per completed phase and always ends on
/// the target, even when there are no phases. Values never decrease.
pub struct ProgressSchedule<'a> {
    callback: &'a mut dyn ProgressCallback,
    step: f64,
    completed: u32,
    last: u32,
}

impl<'a> ProgressSchedule<'a> {
    pub fn start(callback: &'a mut dyn ProgressCallback, phases: usize) -> Self {
        let step = if phases == 0 {
            f64::from(TARGET)
        } else {
            f64::from(TARGET) / phases as f64
        };
        callback.report(0);
        Self {
            callback,
            step,
            completed: 0,
            last: 0,
        }
    }

    /// Mark one phase complete and report the new value
    pub fn advance(&mut self) -> u32 {
        self.completed += 1;
        let value = (f64::from(self.completed) * self.step).round();
        let value = (value as u32).min(TARGET).max(self.last);
        self.emit(value)
    }

    /// Report the target value
    pub fn finish(mut self) {
        self.emit(TARGET);
    }

    fn emit(&mut self, value: u32) -> u32 {
        self.last = value;
        self.callback.report(value);
        value
    }
}
