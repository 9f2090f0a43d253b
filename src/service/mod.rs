//! Service layer: the analyzers, the reconciler, the recommendation engine and the
//! orchestrator that sequences them.

mod auditor;
pub mod lighthouse;
pub mod performance;
pub mod recommendations;
pub mod reconciler;
pub mod structure;
pub mod technology;

pub use auditor::{normalize_url, Auditor, SiteAuditor};
pub use lighthouse::{ExternalAnalyzer, LighthouseAnalyzer};
pub use performance::{PerformanceCollector, PerformanceFindings};
pub use recommendations::RecommendationEngine;
pub use reconciler::{LocalFindings, Reconciled, Reconciler};
pub use structure::{StructuralAnalyzer, StructuralFindings};
pub use technology::TechnologyDetector;
