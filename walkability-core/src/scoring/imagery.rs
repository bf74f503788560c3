//! Sidewalk assessment from street-level image segmentation
//!
//! Input is the share of image pixels per Cityscapes class, as produced by
//! a semantic segmentation model. The model itself lives outside this crate.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;

/// Classes covering less than this share of the image are ignored
pub const MIN_CLASS_PERCENTAGE: f64 = 0.5;
/// Classes above this share are listed as detections
pub const DETECTION_PERCENTAGE: f64 = 1.0;
/// Nominal per-class accuracy of the segmentation model
pub const SEGMENTATION_CONFIDENCE: f64 = 0.85;
/// Maximum number of images assessed per batch call
pub const MAX_BATCH_SIZE: usize = 10;

pub const OBSTRUCTION_CLASSES: [&str; 6] = ["car", "truck", "bus", "motorcycle", "bicycle", "person"];

const SIDEWALK_PRESENT: f64 = 5.0;
const SIDEWALK_PARTIAL: f64 = 10.0;
const SIDEWALK_GOOD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidewalkQuality {
    Good,
    Fair,
    Poor,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageryRequest {
    pub image_id: String,
    /// Percentage of pixels per class name
    pub class_distribution: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub class_name: String,
    pub confidence: f64,
    pub pixel_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageryAssessment {
    pub image_id: String,
    pub sidewalk_detected: bool,
    pub confidence: Confidence,
    pub quality: SidewalkQuality,
    pub issues: Vec<String>,
    pub notes: String,
    pub detections: Vec<Detection>,
}

struct Obstruction<'a> {
    class_name: &'a str,
    percentage: f64,
}

pub fn assess_imagery(request: &ImageryRequest) -> ImageryAssessment {
    let significant: HashMap<&str, f64> = request
        .class_distribution
        .iter()
        .filter(|(_, pct)| **pct > MIN_CLASS_PERCENTAGE)
        .map(|(class, pct)| (class.as_str(), *pct))
        .collect();

    let sidewalk = significant.get("sidewalk").copied().unwrap_or(0.0);
    let obstructions: Vec<Obstruction<'_>> = OBSTRUCTION_CLASSES
        .iter()
        .filter_map(|class| {
            significant.get(class).map(|pct| Obstruction {
                class_name: class,
                percentage: *pct,
            })
        })
        .collect();

    let (quality, confidence, mut issues) = classify_sidewalk(sidewalk, &obstructions);
    if issues.is_empty() {
        issues.push("No issues detected".to_string());
    }

    let mut detections: Vec<Detection> = significant
        .iter()
        .filter(|(_, pct)| **pct > DETECTION_PERCENTAGE)
        .map(|(class, pct)| Detection {
            class_name: (*class).to_string(),
            confidence: SEGMENTATION_CONFIDENCE,
            pixel_percentage: *pct,
        })
        .collect();
    detections.sort_by(|a, b| b.pixel_percentage.total_cmp(&a.pixel_percentage));

    let sidewalk_detected = quality != SidewalkQuality::None;
    let seen = if sidewalk_detected {
        format!("sidewalk present ({sidewalk:.1}% of image)")
    } else {
        "no sidewalk".to_string()
    };

    ImageryAssessment {
        image_id: request.image_id.clone(),
        sidewalk_detected,
        confidence,
        quality,
        issues,
        notes: format!("AI detected: {seen}, {} obstruction(s)", obstructions.len()),
        detections,
    }
}

/// Assesses at most [`MAX_BATCH_SIZE`] images; the rest are ignored
pub fn assess_imagery_batch(requests: &[ImageryRequest]) -> Vec<ImageryAssessment> {
    if requests.len() > MAX_BATCH_SIZE {
        log::warn!(
            "Imagery batch of {} truncated to {MAX_BATCH_SIZE} images",
            requests.len()
        );
    }
    requests
        .iter()
        .take(MAX_BATCH_SIZE)
        .map(assess_imagery)
        .collect()
}

fn classify_sidewalk(
    sidewalk: f64,
    obstructions: &[Obstruction<'_>],
) -> (SidewalkQuality, Confidence, Vec<String>) {
    if sidewalk <= SIDEWALK_PRESENT {
        return (
            SidewalkQuality::None,
            Confidence::Low,
            vec!["No sidewalk visible in image".to_string()],
        );
    }

    let blocked: f64 = obstructions.iter().map(|o| o.percentage).sum();
    let mut issues = Vec::new();

    let (quality, confidence) = if sidewalk > SIDEWALK_GOOD {
        if blocked > 15.0 {
            issues.push(format!(
                "{} obstruction(s) detected blocking sidewalk",
                obstructions.len()
            ));
            (SidewalkQuality::Poor, Confidence::High)
        } else if blocked > 5.0 {
            issues.push("Minor obstructions detected on sidewalk".to_string());
            (SidewalkQuality::Fair, Confidence::Medium)
        } else {
            (SidewalkQuality::Good, Confidence::High)
        }
    } else if sidewalk > SIDEWALK_PARTIAL {
        if blocked > 10.0 {
            issues.push("Sidewalk partially visible with obstructions".to_string());
        } else {
            issues.push("Sidewalk partially visible".to_string());
        }
        (SidewalkQuality::Fair, Confidence::Medium)
    } else {
        issues.push("Limited sidewalk visible in image".to_string());
        (SidewalkQuality::Poor, Confidence::Medium)
    };

    for obstruction in obstructions.iter().filter(|o| o.percentage > 5.0) {
        issues.push(format!(
            "{} detected ({:.1}% of image)",
            obstruction.class_name, obstruction.percentage
        ));
    }

    (quality, confidence, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(classes: &[(&str, f64)]) -> ImageryRequest {
        ImageryRequest {
            image_id: "img-1".to_string(),
            class_distribution: classes
                .iter()
                .map(|(class, pct)| ((*class).to_string(), *pct))
                .collect(),
        }
    }

    #[test]
    fn no_sidewalk() {
        let result = assess_imagery(&request(&[("road", 60.0), ("sidewalk", 4.0)]));
        assert!(!result.sidewalk_detected);
        assert_eq!(result.quality, SidewalkQuality::None);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.issues, vec!["No sidewalk visible in image"]);
        assert_eq!(result.notes, "AI detected: no sidewalk, 0 obstruction(s)");
    }

    #[test]
    fn clear_wide_sidewalk_is_good() {
        let result = assess_imagery(&request(&[("sidewalk", 30.0), ("person", 2.0)]));
        assert_eq!(result.quality, SidewalkQuality::Good);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.issues, vec!["No issues detected"]);
        assert_eq!(
            result.notes,
            "AI detected: sidewalk present (30.0% of image), 1 obstruction(s)"
        );
    }

    #[test]
    fn blocked_sidewalk_is_poor() {
        let result = assess_imagery(&request(&[
            ("sidewalk", 25.0),
            ("car", 12.0),
            ("truck", 6.0),
            ("bicycle", 0.3),
        ]));
        assert_eq!(result.quality, SidewalkQuality::Poor);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(
            result.issues,
            vec![
                "2 obstruction(s) detected blocking sidewalk",
                "car detected (12.0% of image)",
                "truck detected (6.0% of image)",
            ]
        );
    }

    #[test]
    fn partial_and_limited_coverage() {
        let partial = assess_imagery(&request(&[("sidewalk", 15.0)]));
        assert_eq!(partial.quality, SidewalkQuality::Fair);
        assert_eq!(partial.issues, vec!["Sidewalk partially visible"]);

        let limited = assess_imagery(&request(&[("sidewalk", 8.0)]));
        assert_eq!(limited.quality, SidewalkQuality::Poor);
        assert_eq!(limited.confidence, Confidence::Medium);
    }

    #[test]
    fn detections_sorted_and_filtered() {
        let result = assess_imagery(&request(&[
            ("sidewalk", 22.0),
            ("road", 40.0),
            ("pole", 0.8),
        ]));
        let names: Vec<&str> = result
            .detections
            .iter()
            .map(|d| d.class_name.as_str())
            .collect();
        assert_eq!(names, vec!["road", "sidewalk"]);
        assert!(
            result
                .detections
                .iter()
                .all(|d| d.confidence == SEGMENTATION_CONFIDENCE)
        );
    }

    #[test]
    fn batch_is_capped() {
        let requests = vec![request(&[("sidewalk", 30.0)]); 12];
        assert_eq!(assess_imagery_batch(&requests).len(), MAX_BATCH_SIZE);
    }
}
