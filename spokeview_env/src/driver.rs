//! Fixed-rate frame loop.

use crate::context::VizContext;
use crate::types::{FrameRate, FrameTick};
use std::ops::ControlFlow;
use tracing::trace;

/// Runs `on_frame` at `rate` for up to `frames` frames.
///
/// Each iteration sleeps one frame interval on the context clock and then
/// hands the callback a [`FrameTick`]. The callback can stop the loop early
/// by returning `ControlFlow::Break`. Returns the number of frames delivered.
pub async fn drive_frames<Ctx, F>(ctx: &Ctx, rate: FrameRate, frames: u64, mut on_frame: F) -> u64
where
    Ctx: VizContext + ?Sized,
    F: FnMut(FrameTick) -> ControlFlow<()>,
{
    let step = rate.frame_duration();
    let dt = rate.dt_secs();

    for index in 0..frames {
        ctx.sleep(step).await;
        let tick = FrameTick {
            index,
            dt,
            elapsed: ctx.now(),
        };
        if on_frame(tick).is_break() {
            trace!(frame = index, "frame loop stopped by callback");
            return index + 1;
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokioContext;
    use std::time::Duration;

    #[tokio::test]
    async fn test_drive_frames_runs_all_frames() {
        let ctx = TokioContext::new();
        let rate = FrameRate::new(200).unwrap();
        let mut seen = Vec::new();

        let delivered = drive_frames(&ctx, rate, 5, |tick| {
            seen.push(tick.index);
            ControlFlow::Continue(())
        })
        .await;

        assert_eq!(delivered, 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(ctx.now() >= Duration::from_millis(25));
    }

    #[tokio::test]
    async fn test_drive_frames_early_break() {
        let ctx = TokioContext::new();
        let rate = FrameRate::new(500).unwrap();

        let delivered = drive_frames(&ctx, rate, 100, |tick| {
            if tick.index == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;

        assert_eq!(delivered, 3);
    }
}
