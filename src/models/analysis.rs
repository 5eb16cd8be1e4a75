// SPDX-License-Identifier: MIT

//! Skin analysis model: status state machine and vendor result structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of analysis processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Analyzed,
    Failed,
}

/// Acne severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinSeverity {
    Clear,
    Mild,
    Moderate,
    Severe,
}

impl SkinSeverity {
    /// Numerical severity score (0-100).
    pub fn score(&self) -> u8 {
        match self {
            SkinSeverity::Clear => 0,
            SkinSeverity::Mild => 25,
            SkinSeverity::Moderate => 50,
            SkinSeverity::Severe => 75,
        }
    }
}

/// Quality assessment of the submitted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    High,
    Medium,
    Low,
}

/// Acne count by facial region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcneByRegion {
    pub forehead: u32,
    pub cheeks: u32,
    pub nose: u32,
    pub chin: u32,
}

/// Acne count by lesion type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcneByType {
    pub blackheads: u32,
    pub whiteheads: u32,
    pub papules: u32,
    pub pustules: u32,
    pub nodules: u32,
    pub cysts: u32,
}

/// Detailed acne analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcneAnalysisResults {
    pub by_region: AcneByRegion,
    pub by_type: AcneByType,
    pub severity: SkinSeverity,
    pub total_lesions: u32,
    pub analyzed_at: DateTime<Utc>,
}

/// AI-generated structured feedback for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFeedback {
    pub main_summary: String,
    pub motivation: String,
    pub severity_data: String,
    pub skin_insights: Vec<String>,
    pub tips: Vec<String>,
}

/// Stored skin analysis record, one per uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinAnalysis {
    /// Repository-assigned UUID (also used as document ID)
    pub id: String,
    /// Owning user's Firebase UID
    pub user_uid: String,
    /// Reference to the uploaded image
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub status: AnalysisStatus,
    pub image_quality: Option<ImageQuality>,
    /// True iff status is Analyzed and results + feedback are populated.
    /// Only `mark_completed` sets this.
    pub analysis_complete: bool,

    pub acne_analysis: Option<AcneAnalysisResults>,
    pub structured_feedback: Option<StructuredFeedback>,

    /// Raw vendor response, kept opaque for debugging/audit
    pub raw_metadata: Option<serde_json::Value>,
}

impl SkinAnalysis {
    /// Create a pending analysis for a user's image.
    pub fn new(id: String, user_uid: String, image_url: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_uid,
            image_url,
            created_at: now,
            updated_at: now,
            status: AnalysisStatus::Pending,
            image_quality: None,
            analysis_complete: false,
            acne_analysis: None,
            structured_feedback: None,
            raw_metadata: None,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = AnalysisStatus::Processing;
        self.updated_at = Utc::now();
    }

    /// Mark as completed. This is the only place result fields are written,
    /// so a record can never be Analyzed with partial results.
    pub fn mark_completed(
        &mut self,
        acne_analysis: AcneAnalysisResults,
        feedback: StructuredFeedback,
        image_quality: ImageQuality,
        metadata: Option<serde_json::Value>,
    ) {
        self.status = AnalysisStatus::Analyzed;
        self.analysis_complete = true;
        self.acne_analysis = Some(acne_analysis);
        self.structured_feedback = Some(feedback);
        self.image_quality = Some(image_quality);
        self.raw_metadata = metadata;
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self) {
        self.status = AnalysisStatus::Failed;
        self.updated_at = Utc::now();
    }

    pub fn is_clear_skin(&self) -> bool {
        self.acne_analysis
            .as_ref()
            .is_some_and(|a| a.total_lesions == 0)
    }

    /// The facial region with the most lesions, if any were found.
    pub fn main_concern_area(&self) -> Option<&'static str> {
        let regions = &self.acne_analysis.as_ref()?.by_region;
        let counts = [
            ("forehead", regions.forehead),
            ("cheeks", regions.cheeks),
            ("nose", regions.nose),
            ("chin", regions.chin),
        ];

        counts
            .iter()
            .max_by_key(|(_, count)| *count)
            .filter(|(_, count)| *count > 0)
            .map(|(name, _)| *name)
    }

    /// The most common lesion type, if any were found.
    pub fn dominant_acne_type(&self) -> Option<&'static str> {
        let types = &self.acne_analysis.as_ref()?.by_type;
        let counts = [
            ("blackheads", types.blackheads),
            ("whiteheads", types.whiteheads),
            ("papules", types.papules),
            ("pustules", types.pustules),
            ("nodules", types.nodules),
            ("cysts", types.cysts),
        ];

        counts
            .iter()
            .max_by_key(|(_, count)| *count)
            .filter(|(_, count)| *count > 0)
            .map(|(name, _)| *name)
    }
}
