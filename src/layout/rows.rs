//! Row grouping: partition a page's paragraphs into horizontal zones.

use crate::model::Paragraph;

/// A run of consecutive paragraphs judged to share a horizontal line.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone<'a> {
    /// Members in page reading order
    pub paragraphs: Vec<&'a Paragraph>,
}

impl<'a> Zone<'a> {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Check if the zone has no members.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Members sorted left to right. Ties keep reading order.
    pub fn columns(&self) -> Vec<&'a Paragraph> {
        let mut columns = self.paragraphs.clone();
        columns.sort_by(|a, b| a.x_percent.total_cmp(&b.x_percent));
        columns
    }

    /// Vertical position of the zone: the leftmost member's `y_percent`.
    pub fn y_percent(&self) -> f32 {
        self.columns().first().map(|p| p.y_percent).unwrap_or(0.0)
    }
}

/// Group paragraphs into zones in a single forward pass.
///
/// A paragraph starts a new zone when it lies more than `threshold` percent
/// of page height away from the previous paragraph. Distances exactly equal
/// to the threshold stay in the same zone.
pub fn group_rows(paragraphs: &[Paragraph], threshold: f32) -> Vec<Zone<'_>> {
    let mut zones = Vec::new();
    let mut current: Vec<&Paragraph> = Vec::new();
    let mut last_y: Option<f32> = None;

    for para in paragraphs {
        if let Some(y) = last_y {
            if !current.is_empty() && (para.y_percent - y).abs() > threshold {
                zones.push(Zone {
                    paragraphs: std::mem::take(&mut current),
                });
            }
        }
        current.push(para);
        last_y = Some(para.y_percent);
    }

    // Don't forget the last row
    if !current.is_empty() {
        zones.push(Zone {
            paragraphs: current,
        });
    }

    log::debug!(
        "Grouped {} paragraphs into {} zones",
        paragraphs.len(),
        zones.len()
    );
    zones
}
