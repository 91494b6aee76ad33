//! Frame-gated capture scheduling.
//!
//! The engine needs several frames for its internal state (shadow maps, IBL
//! rotation, transforms) to settle before the visible frame is worth
//! keeping. The controller counts rendered frames, requests exactly one
//! framebuffer readback once the settle window has passed, and reports when
//! the application can close.
//!
//! # Examples
//! ```
//! use modelshot::capture::{CaptureController, Phase, FRAME_TO_SKIP};
//!
//! let mut controller = CaptureController::new(FRAME_TO_SKIP);
//! let captures: Vec<bool> = (0..20).map(|_| controller.end_frame()).collect();
//! assert_eq!(captures.iter().filter(|&&c| c).count(), 1);
//! assert_eq!(controller.phase(), Phase::Capturing);
//! ```

/// Number of frames rendered and discarded before the capture frame.
pub const FRAME_TO_SKIP: u32 = 10;

/// Where the controller is in its one-shot life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still letting frames pass so engine state can settle.
    Waiting,
    /// The readback has been issued; its completion has not arrived yet.
    Capturing,
    /// The readback completed; the loop should close.
    Done,
}

/// Counts frames and gates the single framebuffer readback of a run.
///
/// Transitions are driven purely by the per-frame counter; nothing cancels
/// or resets the controller.
///
/// # Examples
/// ```
/// use modelshot::capture::CaptureController;
///
/// let mut controller = CaptureController::new(2);
/// assert!(!controller.end_frame()); // frame 0
/// assert!(!controller.end_frame()); // frame 1
/// assert!(!controller.end_frame()); // frame 2
/// assert!(controller.end_frame()); // frame 3 == skip + 1
/// ```
#[derive(Debug)]
pub struct CaptureController {
    frame: u32,
    skip: u32,
    issued: bool,
    completed: bool,
}

impl CaptureController {
    /// Creates a controller that waits out `skip` frames before capturing.
    pub fn new(skip: u32) -> Self {
        Self {
            frame: 0,
            skip,
            issued: false,
            completed: false,
        }
    }

    /// Advances the frame counter at the end of a rendered frame.
    ///
    /// Returns `true` exactly once per run, on the frame whose counter
    /// equals `skip + 1` (one past the settle window, to account for the
    /// double-buffered back buffer). The caller issues the readback then.
    pub fn end_frame(&mut self) -> bool {
        let capture = !self.issued && self.frame == self.skip + 1;
        if capture {
            self.issued = true;
        }
        self.frame += 1;
        capture
    }

    /// Records that the readback completion signal arrived.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Returns `true` once the capture has completed and the application
    /// should close.
    pub fn should_close(&self) -> bool {
        self.completed
    }

    /// Returns the current life-cycle phase.
    pub fn phase(&self) -> Phase {
        if self.completed {
            Phase::Done
        } else if self.issued {
            Phase::Capturing
        } else {
            Phase::Waiting
        }
    }

    /// Returns the number of frames counted so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_fires_at_skip_plus_one() {
        let mut controller = CaptureController::new(FRAME_TO_SKIP);
        for frame in 0..100 {
            let captured = controller.end_frame();
            assert_eq!(captured, frame == FRAME_TO_SKIP + 1, "frame {frame}");
        }
    }

    #[test]
    fn test_exactly_one_capture_per_run() {
        let mut controller = CaptureController::new(FRAME_TO_SKIP);
        let count = (0..1000).filter(|_| controller.end_frame()).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_phases_progress_in_order() {
        let mut controller = CaptureController::new(1);
        assert_eq!(controller.phase(), Phase::Waiting);

        controller.end_frame(); // 0
        controller.end_frame(); // 1
        assert_eq!(controller.phase(), Phase::Waiting);

        assert!(controller.end_frame()); // 2 == skip + 1
        assert_eq!(controller.phase(), Phase::Capturing);
        assert!(!controller.should_close());

        controller.complete();
        assert_eq!(controller.phase(), Phase::Done);
        assert!(controller.should_close());
    }
}
