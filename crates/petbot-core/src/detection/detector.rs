//! Frame -> detections, wrapping an opaque network forward pass

use super::config::DetectorConfig;
use super::decode::decode_outputs;
use super::labels::ClassNames;
use crate::bbox::DetectionSet;
use crate::frame::Frame;
use crate::geometry::Size;
use crate::traits::{Detect, Network};
use crate::utils::{ImageUtils, NmsParams, NonMaxSuppressionUtils};
use crate::Result;
use tracing::{debug, trace};

/// YOLO post-processing around a network: resize to the reference size,
/// forward, decode, suppress, label.
pub struct YoloDetector<N> {
    network: N,
    classes: ClassNames,
    params: NmsParams,
    reference: Option<Size>,
}

impl<N: Network> YoloDetector<N> {
    pub fn new(network: N, classes: ClassNames, config: &DetectorConfig) -> Self {
        Self {
            network,
            classes,
            params: config.nms_params(),
            reference: config.reference_size.filter(|size| !size.is_empty()),
        }
    }

    pub fn reference_size(&self) -> Option<Size> {
        self.reference
    }
}

impl<N: Network> Detect for YoloDetector<N> {
    fn prepare(&mut self, client: Size) {
        if self.reference.is_none() && !client.is_empty() {
            debug!(reference = %client, "detector reference size fixed");
            self.reference = Some(client);
        }
    }

    fn detect(&mut self, frame: &Frame) -> Result<DetectionSet> {
        let reference = self.reference.unwrap_or_else(|| frame.size());

        let resized = ImageUtils::resize_to(frame.image(), reference);
        let input = resized.as_ref().unwrap_or(frame.image());

        let rows = self.network.forward(input)?;
        let candidates = decode_outputs(&rows, reference, self.params.score_threshold);
        let candidate_count = candidates.len();
        let kept = NonMaxSuppressionUtils::apply_nms(candidates, &self.params);

        let detections = kept
            .into_iter()
            .map(|d| {
                let name = self.classes.name(d.class_id);
                d.with_name(name)
            })
            .collect();

        let set = DetectionSet::from_vec(detections, reference);
        trace!(rows = rows.len(), candidates = candidate_count, kept = set.len(), "frame decoded");
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::geometry::ScreenPoint;
    use image::RgbImage;

    /// Returns fixed rows and remembers the input size it saw
    struct StubNetwork {
        rows: Vec<Vec<f32>>,
        seen: Option<(u32, u32)>,
    }

    impl Network for StubNetwork {
        fn forward(&mut self, image: &RgbImage) -> Result<Vec<Vec<f32>>> {
            self.seen = Some(image.dimensions());
            Ok(self.rows.clone())
        }
    }

    fn detector(rows: Vec<Vec<f32>>) -> YoloDetector<StubNetwork> {
        YoloDetector::new(
            StubNetwork { rows, seen: None },
            ClassNames::parse("coin\npet\n"),
            &DetectorConfig::default(),
        )
    }

    #[test]
    fn test_detect_decodes_suppresses_and_labels() -> Result<()> {
        let mut detector = detector(vec![
            vec![0.125, 0.125, 0.0625, 0.0625, 1.0, 0.7, 0.0],
            vec![0.125, 0.125, 0.0625, 0.0625, 1.0, 0.0, 0.9],
            vec![0.75, 0.75, 0.0625, 0.0625, 1.0, 0.6, 0.0],
        ]);
        detector.prepare(Size::new(640, 480));

        let frame = Frame::new(RgbImage::new(640, 480), ScreenPoint::new(0, 0));
        let set = detector.detect(&frame)?;

        assert_eq!(set.space, Size::new(640, 480));
        assert_eq!(set.len(), 2);
        let found: Vec<_> = set.iter().collect();
        assert_eq!(found[0].class_name, "pet");
        assert_eq!(found[0].bbox, BBox::new(60, 45, 40, 30));
        assert_eq!(found[1].class_name, "coin");
        Ok(())
    }

    #[test]
    fn test_frame_resized_to_reference() -> Result<()> {
        let mut detector = detector(Vec::new());
        detector.prepare(Size::new(800, 600));
        // A later prepare does not move the reference
        detector.prepare(Size::new(100, 100));

        let frame = Frame::new(RgbImage::new(1024, 768), ScreenPoint::new(0, 0));
        let set = detector.detect(&frame)?;

        assert!(set.is_empty());
        assert_eq!(set.space, Size::new(800, 600));
        assert_eq!(detector.network.seen, Some((800, 600)));
        Ok(())
    }

    #[test]
    fn test_configured_reference_wins() {
        let config = DetectorConfig {
            reference_size: Some(Size::new(416, 416)),
            ..Default::default()
        };
        let mut detector = YoloDetector::new(
            StubNetwork {
                rows: Vec::new(),
                seen: None,
            },
            ClassNames::default(),
            &config,
        );
        detector.prepare(Size::new(800, 600));
        assert_eq!(detector.reference_size(), Some(Size::new(416, 416)));
    }
}
