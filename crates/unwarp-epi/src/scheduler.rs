//! Data-parallel driver over (volume, slice) units.
//!
//! The output buffer of a `[V, Z, Y, X]` series is split into disjoint
//! `nx * ny` slices. Each slice is one unit of work and is handed to exactly
//! one task call, so tasks need no synchronisation of their own.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, UnwarpError};
use crate::progress::ProgressTracker;

/// Splits a volume series into slice units and runs them on the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceVolumeScheduler {
    dims: [usize; 3],
    volumes: usize,
}

impl SliceVolumeScheduler {
    /// Scheduler for `volumes` volumes of `dims = [nx, ny, nz]` voxels.
    pub fn new(dims: [usize; 3], volumes: usize) -> Self {
        Self { dims, volumes }
    }

    /// Number of voxels in one slice.
    pub fn slice_len(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    /// Total number of units.
    pub fn units(&self) -> usize {
        self.volumes * self.dims[2]
    }

    /// `(volume, slice)` of unit `index`.
    pub fn unit(&self, index: usize) -> (usize, usize) {
        let nz = self.dims[2];
        (index / nz, index % nz)
    }

    /// Run `task(v, z, slice)` once for every unit.
    ///
    /// Returns after all units finish. The first failing unit stops the
    /// remaining ones from being scheduled and its error is returned.
    pub fn run<F>(&self, output: &mut [f32], progress: &ProgressTracker, task: F) -> Result<()>
    where
        F: Fn(usize, usize, &mut [f32]) -> Result<()> + Sync,
    {
        let expected = self.units() * self.slice_len();
        if output.len() != expected {
            return Err(UnwarpError::ShapeMismatch {
                expected: vec![self.volumes, self.dims[2], self.dims[1], self.dims[0]],
                actual: vec![output.len()],
            });
        }

        progress.start(self.units());
        if expected == 0 {
            progress.complete();
            return Ok(());
        }

        debug!(units = self.units(), slice_len = self.slice_len(), "scheduling slices");
        let result: Result<()> = output
            .par_chunks_mut(self.slice_len())
            .enumerate()
            .try_for_each(|(index, slice)| {
                let (v, z) = self.unit(index);
                task(v, z, slice)?;
                progress.advance();
                Ok(())
            });

        match &result {
            Ok(()) => progress.complete(),
            Err(e) => progress.error(&e.to_string()),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::HistoryCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unit_mapping() {
        let scheduler = SliceVolumeScheduler::new([4, 3, 5], 2);
        assert_eq!(scheduler.units(), 10);
        assert_eq!(scheduler.unit(0), (0, 0));
        assert_eq!(scheduler.unit(4), (0, 4));
        assert_eq!(scheduler.unit(7), (1, 2));
    }

    #[test]
    fn test_every_unit_runs_once() {
        let scheduler = SliceVolumeScheduler::new([4, 3, 5], 3);
        let mut output = vec![0.0f32; 4 * 3 * 5 * 3];
        let calls = AtomicUsize::new(0);
        let history = Arc::new(HistoryCallback::new());
        let tracker = ProgressTracker::new().with_callback(history.clone());

        scheduler
            .run(&mut output, &tracker, |v, z, slice| {
                calls.fetch_add(1, Ordering::Relaxed);
                slice.iter_mut().for_each(|x| *x += (v * 100 + z) as f32);
                Ok(())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 15);
        assert_eq!(tracker.completed(), 15);
        assert_eq!(history.get_history().len(), 15);
        for (index, slice) in output.chunks(12).enumerate() {
            let (v, z) = scheduler.unit(index);
            assert!(slice.iter().all(|&x| x == (v * 100 + z) as f32));
        }
    }

    #[test]
    fn test_failing_unit_aborts_run() {
        let scheduler = SliceVolumeScheduler::new([2, 2, 4], 2);
        let mut output = vec![0.0f32; 2 * 2 * 4 * 2];
        let tracker = ProgressTracker::new();

        let err = scheduler
            .run(&mut output, &tracker, |v, z, _| {
                if v == 1 && z == 2 {
                    Err(UnwarpError::transform("singular slice"))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Transform error: singular slice");
        assert!(tracker.completed() < 8);
    }

    #[test]
    fn test_rejects_wrong_buffer() {
        let scheduler = SliceVolumeScheduler::new([2, 2, 2], 1);
        let mut output = vec![0.0f32; 7];
        let tracker = ProgressTracker::new();
        assert!(scheduler.run(&mut output, &tracker, |_, _, _| Ok(())).is_err());
    }
}
