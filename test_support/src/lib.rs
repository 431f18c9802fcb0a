//! Test utilities shared by the integration tests.
//!
//! Helpers cover three concerns: building small [`BuildFile`]s for a chosen
//! platform, pulling rule and command lines back out of generated Ninja
//! text, and driving a real `ninja` binary when one is installed.
//!
//! [`BuildFile`]: ninja_synth::ir::BuildFile

pub mod ninja;
pub mod ninja_text;
pub mod plan;

pub use ninja::{NinjaWorkspaceError, ninja_integration_workspace, run_ninja, write_build_ninja};
pub use ninja_text::{command_line, override_line, rule_block};
pub use plan::{PlanWorkspace, build_file_for};
