//! `archsmith plan` — print the ordered steps of a profile.

use clap::Args;
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::domain::Profile;

/// Arguments for the plan command.
#[derive(Args)]
pub struct PlanArgs {
    /// Profile to show: full or laptop
    pub profile: Profile,
}

/// Run the plan command. Read-only; nothing is contacted.
pub fn run(app: &AppContext, args: &PlanArgs) {
    let steps = args.profile.steps();
    app.output
        .header(&format!("{} profile ({} steps)", args.profile, steps.len()));
    for (i, step) in steps.iter().enumerate() {
        let uploads = step
            .artifact()
            .map(|a| format!("  [uploads {}]", a.file_name()))
            .unwrap_or_default();
        println!(
            "  {:>2}. {:<22} {}{}",
            i + 1,
            step.name(),
            step.summary(),
            uploads.style(app.output.styles.dim)
        );
    }
}
