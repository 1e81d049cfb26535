use std::sync::mpsc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use deepmandel_core::{Coord, EscapeParams, Viewport};

use crate::buffer::IterationGrid;
use crate::builder::{build_frame, Precision};
use crate::coalesce::Coalescer;
use crate::error::RenderError;

/// One frame's worth of build inputs, as supplied by the view controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildJob {
    pub center: Coord,
    pub zoom: f64,
    pub max_iterations: u32,
}

/// Request sent to the build worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuildRequest {
    /// Change the computation grid dimensions for subsequent builds.
    Resize { width: u32, height: u32 },
    /// Build a full frame for these view parameters.
    Build(BuildJob),
}

/// Response sent from the build worker.
#[derive(Debug)]
pub enum BuildResponse {
    /// A completed frame. The job that produced it is echoed back so the
    /// front-end can reconcile its view state with what was actually built.
    Frame {
        grid: IterationGrid,
        elapsed: Duration,
        job: BuildJob,
    },
}

/// Spawn the dedicated build worker thread.
///
/// Returns the send side for requests and the receive side for completed
/// frames. The thread keeps the current grid dimensions as local state and
/// runs until the request sender is dropped. Each frame is computed in full
/// before it is posted; no partial buffers cross the channel.
pub fn spawn_build_worker(
    width: u32,
    height: u32,
) -> (mpsc::Sender<BuildRequest>, mpsc::Receiver<BuildResponse>) {
    let (req_tx, req_rx) = mpsc::channel::<BuildRequest>();
    let (resp_tx, resp_rx) = mpsc::channel::<BuildResponse>();

    std::thread::Builder::new()
        .name("build-worker".into())
        .spawn(move || {
            debug!("build worker thread started");
            let mut width = width;
            let mut height = height;

            while let Ok(request) = req_rx.recv() {
                match request {
                    BuildRequest::Resize {
                        width: w,
                        height: h,
                    } => {
                        debug!(width = w, height = h, "build worker: resize");
                        width = w;
                        height = h;
                    }
                    BuildRequest::Build(job) => {
                        let response = match run_build(&job, width, height) {
                            Ok((grid, elapsed)) => {
                                BuildResponse::Frame { grid, elapsed, job }
                            }
                            Err(e) => {
                                warn!("build worker: skipping bad job: {e}");
                                continue;
                            }
                        };
                        if resp_tx.send(response).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("build worker thread exiting");
        })
        .expect("failed to spawn build worker thread");

    (req_tx, resp_rx)
}

fn run_build(job: &BuildJob, width: u32, height: u32) -> Result<(IterationGrid, Duration), RenderError> {
    let viewport = Viewport::new(job.center, job.zoom, width, height)?;
    let params = EscapeParams::new(job.max_iterations)?;
    let start = Instant::now();
    let grid = build_frame(&viewport, &params, Precision::select(&viewport));
    Ok((grid, start.elapsed()))
}

/// Front-end handle for the build worker.
///
/// Owns the channels and the coalescing state machine: a submit while a
/// build is in flight is remembered (newest wins) and exactly one follow-up
/// build is dispatched when the current frame lands.
pub struct BuildDriver {
    req_tx: mpsc::Sender<BuildRequest>,
    resp_rx: mpsc::Receiver<BuildResponse>,
    coalescer: Coalescer,
    deferred: Option<BuildJob>,
    width: u32,
    height: u32,
}

impl BuildDriver {
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let (req_tx, resp_rx) = spawn_build_worker(width, height);
        Ok(Self {
            req_tx,
            resp_rx,
            coalescer: Coalescer::new(),
            deferred: None,
            width,
            height,
        })
    }

    /// Change the computation grid for subsequent builds.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        self.req_tx
            .send(BuildRequest::Resize { width, height })
            .map_err(|_| RenderError::WorkerDisconnected)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Request a frame build.
    ///
    /// Starts immediately when idle; otherwise the job is deferred behind
    /// the in-flight build, replacing any previously deferred job.
    ///
    /// The job is validated up front: the worker never answers a request it
    /// cannot build, so a bad job that reached the state machine would leave
    /// it in flight with no frame ever coming back.
    pub fn submit(&mut self, job: BuildJob) -> crate::Result<()> {
        Viewport::new(job.center, job.zoom, self.width, self.height)?;
        EscapeParams::new(job.max_iterations)?;
        if self.coalescer.request() {
            self.dispatch(job)
        } else {
            debug!(?job, "build in flight, deferring request");
            self.deferred = Some(job);
            Ok(())
        }
    }

    /// Non-blocking poll for a completed frame, firing the deferred rebuild
    /// if one is queued.
    pub fn poll(&mut self) -> crate::Result<Option<BuildResponse>> {
        match self.resp_rx.try_recv() {
            Ok(response) => {
                self.on_frame_complete()?;
                Ok(Some(response))
            }
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(RenderError::WorkerDisconnected),
        }
    }

    /// Blocking wait for the next completed frame.
    pub fn wait(&mut self) -> crate::Result<BuildResponse> {
        let response = self
            .resp_rx
            .recv()
            .map_err(|_| RenderError::WorkerDisconnected)?;
        self.on_frame_complete()?;
        Ok(response)
    }

    /// True when no build is running or deferred.
    pub fn is_idle(&self) -> bool {
        self.coalescer.is_idle()
    }

    fn on_frame_complete(&mut self) -> crate::Result<()> {
        if self.coalescer.finish() {
            if let Some(job) = self.deferred.take() {
                return self.dispatch(job);
            }
        }
        Ok(())
    }

    fn dispatch(&self, job: BuildJob) -> crate::Result<()> {
        self.req_tx
            .send(BuildRequest::Build(job))
            .map_err(|_| RenderError::WorkerDisconnected)
    }
}
