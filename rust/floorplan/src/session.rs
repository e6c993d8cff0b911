// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Analysis session state
//!
//! Lifecycle: `Idle → Generating → Ready | Failed`. A new generation
//! request replaces the current plan wholesale; a failed request keeps the
//! previous plan visible.

use crate::error::{InputError, Result};
use crate::types::{DetectionConfig, FloorPlan};
use crate::upload::{decode_candidate, filter_candidates, select_image, UploadCandidate, UploadLimits};
use tracing::{info, warn};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Generating,
    Ready(FloorPlan),
    Failed {
        reason: String,
        previous: Option<Box<FloorPlan>>,
    },
}

/// Explicit application state shared with rendering code
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    state: SessionState,
    config: DetectionConfig,
    limits: UploadLimits,
}

impl AnalysisSession {
    pub fn new(config: DetectionConfig, limits: UploadLimits) -> Self {
        Self {
            state: SessionState::Idle,
            config,
            limits,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, SessionState::Generating)
    }

    /// Plan the renderer should show; `None` means the default structure
    pub fn current_plan(&self) -> Option<&FloorPlan> {
        match &self.state {
            SessionState::Ready(plan) => Some(plan),
            SessionState::Failed { previous, .. } => previous.as_deref(),
            SessionState::Idle | SessionState::Generating => None,
        }
    }

    /// Select, decode and analyze the first image among `candidates`
    ///
    /// An empty candidate list is refused with [`InputError::NoInputFile`]
    /// before any state change. When every candidate is rejected, the first
    /// rejection is returned.
    pub fn generate(&mut self, candidates: Vec<UploadCandidate>) -> Result<()> {
        self.generate_named(candidates, None)
    }

    /// Like [`generate`](Self::generate), but names the plan `display_name`
    /// verbatim instead of deriving it from the file name
    pub fn generate_named(&mut self, candidates: Vec<UploadCandidate>, display_name: Option<&str>) -> Result<()> {
        if candidates.is_empty() {
            return Err(InputError::NoInputFile);
        }

        let previous = self.current_plan().cloned().map(Box::new);
        self.state = SessionState::Generating;

        match self.run(candidates, display_name) {
            Ok(plan) => {
                info!(
                    name = %plan.name,
                    walls = plan.walls.len(),
                    rooms = plan.rooms.len(),
                    "Floor plan ready"
                );
                self.state = SessionState::Ready(plan);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Floor plan generation failed");
                self.state = SessionState::Failed {
                    reason: e.to_string(),
                    previous,
                };
                Err(e)
            }
        }
    }

    fn run(&self, candidates: Vec<UploadCandidate>, display_name: Option<&str>) -> Result<FloorPlan> {
        let (accepted, rejected) = filter_candidates(candidates, &self.limits);
        if accepted.is_empty() {
            if let Some(first) = rejected.into_iter().next() {
                return Err(first);
            }
        }

        let candidate = select_image(&accepted)?;
        let image = decode_candidate(candidate)?;
        let mut plan = crate::analyze_with_config(&image, &candidate.name, &self.config);
        if let Some(name) = display_name {
            plan.name = name.to_string();
        }
        Ok(plan)
    }

    /// Drop any plan and return to `Idle`
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    fn png_candidate(name: &str, width: u32, height: u32) -> UploadCandidate {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        UploadCandidate::new(name, buf)
    }

    fn quiet_config() -> DetectionConfig {
        DetectionConfig {
            embed_source_image: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_request_leaves_state_untouched() {
        let mut session = AnalysisSession::default();

        let result = session.generate(vec![]);

        assert!(matches!(result, Err(InputError::NoInputFile)));
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.current_plan().is_none());
    }

    #[test]
    fn test_successful_generation_is_ready() {
        let mut session = AnalysisSession::new(quiet_config(), UploadLimits::default());

        session.generate(vec![png_candidate("ground.png", 100, 80)]).unwrap();

        let plan = session.current_plan().unwrap();
        assert_eq!(plan.name, "ground");
        assert_eq!(plan.walls.len(), 4);
        assert!(!session.is_generating());
    }

    #[test]
    fn test_new_upload_replaces_plan() {
        let mut session = AnalysisSession::new(quiet_config(), UploadLimits::default());

        session.generate(vec![png_candidate("first.png", 100, 80)]).unwrap();
        session.generate(vec![png_candidate("second.png", 60, 60)]).unwrap();

        assert_eq!(session.current_plan().unwrap().name, "second");
    }

    #[test]
    fn test_failure_keeps_previous_plan() {
        let mut session = AnalysisSession::new(quiet_config(), UploadLimits::default());
        session.generate(vec![png_candidate("first.png", 100, 80)]).unwrap();

        let broken = UploadCandidate::new("broken.png", vec![1, 2, 3]);
        let result = session.generate(vec![broken]);

        assert!(matches!(result, Err(InputError::Decode { .. })));
        assert!(matches!(session.state(), SessionState::Failed { .. }));
        assert_eq!(session.current_plan().unwrap().name, "first");
    }

    #[test]
    fn test_only_documents_fails_with_no_image() {
        let mut session = AnalysisSession::default();

        let result = session.generate(vec![UploadCandidate::new("plan.pdf", vec![0; 16])]);

        assert!(matches!(result, Err(InputError::NoImageFile { .. })));
        assert!(session.current_plan().is_none());

        session.reset();
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_display_name_is_separate_from_file_name() {
        let mut session = AnalysisSession::new(quiet_config(), UploadLimits::default());

        session
            .generate_named(vec![png_candidate("scan_0042.png", 100, 80)], Some("Ground Floor"))
            .unwrap();
        assert_eq!(session.current_plan().unwrap().name, "Ground Floor");

        // The file name still drives type acceptance
        let result = session.generate(vec![png_candidate("Ground Floor", 100, 80)]);
        assert!(matches!(result, Err(InputError::Rejected { name, .. }) if name == "Ground Floor"));
    }

    #[test]
    fn test_oversized_upload_reports_rejection() {
        let limits = UploadLimits {
            max_bytes: 10,
            ..Default::default()
        };
        let mut session = AnalysisSession::new(quiet_config(), limits);

        let result = session.generate(vec![png_candidate("big.png", 100, 80)]);

        match result {
            Err(InputError::Rejected { name, reason }) => {
                assert_eq!(name, "big.png");
                assert!(reason.contains("exceeds"));
            }
            other => panic!("expected a rejection, got {:?}", other),
        }
        assert!(matches!(session.state(), SessionState::Failed { .. }));
    }
}
