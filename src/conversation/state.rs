/// Per-conversation dialogue state. The only thing the controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvState {
    #[default]
    Idle,
    AwaitingSearchText,
}
