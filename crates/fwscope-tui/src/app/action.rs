use fwscope_types::ExportFormat;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Overlays
    ToggleHelp,
    ToggleDetails,
    Dismiss,

    // Row selection
    SelectUp(usize),
    SelectDown(usize),

    // Paging
    NextPage,
    PreviousPage,
    FirstPage,
    IncreasePageSize,
    DecreasePageSize,

    // Filters
    CycleRiskType,
    CycleRiskTypeBack,
    CycleSeverity,
    ClearFilters,

    Reload,
    Export(ExportFormat),
}
