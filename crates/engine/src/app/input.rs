#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    StepForward,
    StepBack,
    TogglePlayback,
    Restart,
    ToggleInspector,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    #[cfg(test)]
    pub(crate) const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::StepForward,
        InputAction::StepBack,
        InputAction::TogglePlayback,
        InputAction::Restart,
        InputAction::ToggleInspector,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::StepForward => 0,
            InputAction::StepBack => 1,
            InputAction::TogglePlayback => 2,
            InputAction::Restart => 3,
            InputAction::ToggleInspector => 4,
            InputAction::Quit => 5,
        }
    }
}
