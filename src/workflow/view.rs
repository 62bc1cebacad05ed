use std::fmt;

/// Top-level panels. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Idle,
    ShowingUploader,
    ShowingForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    StartUpload,
    StartManualAdd,
    Cancel,
    Complete,
}

impl View {
    /// Next view, or `None` when `command` is not valid from here.
    pub fn transition(self, command: ViewCommand) -> Option<View> {
        match (self, command) {
            (View::Idle, ViewCommand::StartUpload) => Some(View::ShowingUploader),
            (View::Idle, ViewCommand::StartManualAdd) => Some(View::ShowingForm),
            (
                View::ShowingUploader | View::ShowingForm,
                ViewCommand::Cancel | ViewCommand::Complete,
            ) => {
                Some(View::Idle)
            }
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Idle => "idle",
            View::ShowingUploader => "uploader",
            View::ShowingForm => "form",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_views_are_only_reachable_from_idle() {
        assert_eq!(View::Idle.transition(ViewCommand::StartUpload), Some(View::ShowingUploader));
        assert_eq!(View::ShowingForm.transition(ViewCommand::StartUpload), None);
        assert_eq!(View::ShowingUploader.transition(ViewCommand::StartManualAdd), None);
    }

    #[test]
    fn cancel_and_complete_return_to_idle() {
        for view in [View::ShowingUploader, View::ShowingForm] {
            assert_eq!(view.transition(ViewCommand::Cancel), Some(View::Idle));
            assert_eq!(view.transition(ViewCommand::Complete), Some(View::Idle));
        }
        assert_eq!(View::Idle.transition(ViewCommand::Cancel), None);
    }
}
