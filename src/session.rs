//! Submission state machine for paired captures.
//!
//! A submission moves through three states: idle, loading, settled. Settling
//! either installs both image handles (success) or records a user-facing
//! error message (validation or fetch failure); there is no partial success.
//! Each submission is tagged with a monotonically increasing sequence number
//! and its outcome is applied only if it is still the latest submission, so a
//! rapid resubmission cannot be overwritten by an older in-flight pair.

use std::fs;
use std::path::PathBuf;

use url::Url;

use crate::{parse_target, CaptureConfig, Error, ImageHandle, Result, ScreenshotClient, ViewportProfile};

/// View state mutated only by the submission flow.
///
/// `loading` is true strictly between the start of a submission and its
/// settlement. The image slots survive a failed submission unchanged.
#[derive(Debug, Default)]
pub struct ViewState {
    pub loading: bool,
    pub error: Option<String>,
    pub mobile: Option<ImageHandle>,
    pub desktop: Option<ImageHandle>,
}

/// Ticket for one in-flight submission.
///
/// Carries the sequence number used by the superseding gate and the parsed
/// capture target.
#[derive(Debug)]
pub struct Submission {
    seq: u64,
    target: Url,
}

impl Submission {
    pub fn target(&self) -> &Url {
        &self.target
    }
}

/// A capture session: client, view state and the superseding sequence.
pub struct Session {
    client: ScreenshotClient,
    state: ViewState,
    shot_dir: PathBuf,
    seq: u64,
}

impl Session {
    /// Create a session writing transient images under `shot_dir`.
    pub fn new(config: &CaptureConfig, shot_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&shot_dir)?;
        Ok(Self {
            client: ScreenshotClient::new(config)?,
            state: ViewState::default(),
            shot_dir,
            seq: 0,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Remove both image handles from the state, e.g. to persist them.
    pub fn take_images(&mut self) -> Option<(ImageHandle, ImageHandle)> {
        match (self.state.mobile.take(), self.state.desktop.take()) {
            (Some(mobile), Some(desktop)) => Some((mobile, desktop)),
            (mobile, desktop) => {
                // Put back whatever half was there; the pair is atomic
                self.state.mobile = mobile;
                self.state.desktop = desktop;
                None
            }
        }
    }

    /// Start a submission: clear the previous error, raise the loading flag
    /// and validate the input.
    ///
    /// Validation failure settles the submission immediately (loading drops,
    /// the validation message is recorded) and no network request is made.
    pub fn begin(&mut self, input: &str) -> Result<Submission> {
        self.seq += 1;
        self.state.error = None;
        self.state.loading = true;

        match parse_target(input) {
            Some(target) => Ok(Submission {
                seq: self.seq,
                target,
            }),
            None => {
                self.state.loading = false;
                self.state.error = Some(Error::InvalidUrl.to_string());
                Err(Error::InvalidUrl)
            }
        }
    }

    /// Capture both profiles for a submission and materialize the handles.
    pub async fn fetch(&self, submission: &Submission) -> Result<(ImageHandle, ImageHandle)> {
        let (mobile_bytes, desktop_bytes) = self.client.take_pair(&submission.target).await?;

        let mobile = self.store(ViewportProfile::Mobile, submission.seq, &mobile_bytes)?;
        let desktop = self.store(ViewportProfile::Desktop, submission.seq, &desktop_bytes)?;
        Ok((mobile, desktop))
    }

    fn store(&self, profile: ViewportProfile, seq: u64, bytes: &[u8]) -> Result<ImageHandle> {
        let path = self
            .shot_dir
            .join(format!("{}-{}.png", profile.file_stem(), seq));
        ImageHandle::from_bytes(path, bytes)
            .map_err(|e| Error::fetch(format!("failed to store {} image: {}", profile, e)))
    }

    /// Settle a submission.
    ///
    /// If a newer submission has been issued since this one began, the
    /// outcome is discarded without touching the state; any handles it
    /// carried are dropped here, which releases their files. Otherwise the
    /// loading flag drops and either both images are installed (replacing
    /// and thereby releasing the previous pair) or the generic fetch message
    /// is recorded and the previous images stay as they were.
    pub fn apply(&mut self, submission: Submission, outcome: Result<(ImageHandle, ImageHandle)>) {
        if submission.seq != self.seq {
            log::debug!(
                "discarding stale submission {} (latest is {})",
                submission.seq,
                self.seq
            );
            return;
        }

        self.state.loading = false;
        match outcome {
            Ok((mobile, desktop)) => {
                self.state.error = None;
                self.state.mobile = Some(mobile);
                self.state.desktop = Some(desktop);
            }
            Err(err) => {
                if let Error::Fetch { reason } = &err {
                    log::debug!("submission {} failed: {}", submission.seq, reason);
                }
                self.state.error = Some(err.to_string());
            }
        }
    }

    /// Drive one submission end to end: begin, fetch, settle.
    pub async fn submit(&mut self, input: &str) {
        let submission = match self.begin(input) {
            Ok(submission) => submission,
            Err(_) => return, // settled by begin
        };
        let outcome = self.fetch(&submission).await;
        self.apply(submission, outcome);
    }
}
