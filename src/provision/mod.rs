//! 制备流程：线性步骤序列与各步骤实现。

pub mod archive;
pub mod conda;
pub mod env_export;
pub mod plan;
pub mod source_build;
pub mod stage;
pub mod step;
pub mod system;

pub use archive::FetchArtifactStep;
pub use conda::CondaBootstrapStep;
pub use env_export::EnvExportStep;
pub use plan::{ProvisionPlan, StepDescription};
pub use source_build::SourceBuildStep;
pub use stage::StageInputsStep;
pub use step::{run_checked, ProvisionContext, ProvisionStep};
pub use system::SystemPackagesStep;
