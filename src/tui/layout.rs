/// Responsive breakpoints for the generator screen.
///
/// Single source of truth for width thresholds - no magic numbers in render code.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// < 100 cols: input above preview
    Stacked,
    /// 100+ cols: input and preview side by side
    SideBySide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        if width < 100 {
            Breakpoint::Stacked
        } else {
            Breakpoint::SideBySide
        }
    }

    /// Share of the main area given to the input pane, in percent
    pub fn input_share(&self) -> u16 {
        match self {
            Breakpoint::Stacked => 40,
            Breakpoint::SideBySide => 45,
        }
    }
}
