//! Analysis report model — the structured JSON the risk-analysis LLM call
//! must return, plus the request that goes out.
//!
//! Field names follow the camelCase wire format so stored history stays
//! readable by every version of the app.

use crate::safety::{self, SanitizationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soc2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso27001: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub description: String,
    pub evidence: String,
    pub business_impact: String,
    pub severity: Level,
    pub recommendation: String,
    pub effort: Level,
    pub benefit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_mapping: Option<ComplianceMapping>,
}

/// Health scores, 0-100 where 100 is perfect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScores {
    pub security: f64,
    pub scalability: f64,
    pub stability: f64,
    pub cost: f64,
    pub architecture: f64,
}

impl RiskScores {
    pub const CATEGORIES: [&'static str; 5] =
        ["security", "scalability", "stability", "cost", "architecture"];

    pub fn get(&self, category: &str) -> Option<f64> {
        match category {
            "security" => Some(self.security),
            "scalability" => Some(self.scalability),
            "stability" => Some(self.stability),
            "cost" => Some(self.cost),
            "architecture" => Some(self.architecture),
            _ => None,
        }
    }

    /// Rounded mean of the five categories.
    pub fn average(&self) -> i64 {
        let sum = self.security + self.scalability + self.stability + self.cost + self.architecture;
        (sum / 5.0).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialImpact {
    pub potential_loss: String,
    pub cost_to_fix: String,
    pub business_urgency: Urgency,
    pub risk_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub risk_report: Vec<RiskItem>,
    pub executive_summary: String,
    // Scores and the architecture diagram are missing from early history.
    #[serde(default)]
    pub risk_scores: RiskScores,
    #[serde(default)]
    pub architecture_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_impact: Option<FinancialImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_context: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("LLM response does not match the report schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Score '{category}' out of range: {value}")]
    ScoreOutOfRange { category: &'static str, value: f64 },
}

impl AnalysisReport {
    /// Parse a raw LLM response and check it against the schema.
    pub fn from_json(raw: &str) -> Result<Self, ReportError> {
        let report: AnalysisReport = serde_json::from_str(raw)?;
        report.validate()?;
        Ok(report)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        for category in RiskScores::CATEGORIES {
            let value = self.risk_scores.get(category).unwrap_or_default();
            if !(0.0..=100.0).contains(&value) {
                return Err(ReportError::ScoreOutOfRange { category, value });
            }
        }
        Ok(())
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for risk in &self.risk_report {
            match risk.severity {
                Level::High => counts.high += 1,
                Level::Medium => counts.medium += 1,
                Level::Low => counts.low += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// What the user submits for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub technical_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl AnalysisRequest {
    /// Copy of the request with secrets and injection phrases scrubbed from
    /// the context, plus the diagnostics for the UI.
    pub fn sanitized(&self) -> (AnalysisRequest, SanitizationResult) {
        let result = safety::sanitize_input(&self.technical_context);
        let request = AnalysisRequest {
            technical_context: result.sanitized.clone(),
            project_name: self.project_name.clone(),
        };
        (request, result)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn report(scores: [f64; 5], severities: &[Level]) -> AnalysisReport {
        AnalysisReport {
            risk_report: severities
                .iter()
                .enumerate()
                .map(|(i, severity)| RiskItem {
                    description: format!("risk {}", i),
                    evidence: "log line".into(),
                    business_impact: "downtime".into(),
                    severity: *severity,
                    recommendation: "fix it".into(),
                    effort: Level::Low,
                    benefit: "stability".into(),
                    compliance_mapping: None,
                })
                .collect(),
            executive_summary: "summary".into(),
            risk_scores: RiskScores {
                security: scores[0],
                scalability: scores[1],
                stability: scores[2],
                cost: scores[3],
                architecture: scores[4],
            },
            architecture_code: "graph LR; A-->B".into(),
            financial_impact: None,
            technical_context: None,
        }
    }
}
