use crate::model::{AigFlags, Category};

impl Category {
    /// Fixed decision table; nothing but the two flags feeds it.
    ///
    /// | math  | reading | category       |
    /// |-------|---------|----------------|
    /// | false | false   | `None`         |
    /// | true  | false   | `MathOnly`     |
    /// | false | true    | `ReadingOnly`  |
    /// | true  | true    | `Both`         |
    pub fn from_flags(flags: AigFlags) -> Self {
        match (flags.math, flags.reading) {
            (false, false) => Self::None,
            (true, false) => Self::MathOnly,
            (false, true) => Self::ReadingOnly,
            (true, true) => Self::Both,
        }
    }

    /// Status text written to the `AIG Status` column.
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::MathOnly => "Math Only",
            Self::ReadingOnly => "Reading Only",
            Self::Both => "Both Math & Reading",
        }
    }

    /// Row fill as `0xRRGGBB`; `None` rows are not filled.
    pub fn fill_rgb(&self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::MathOnly => Some(0xADD8E6),
            Self::ReadingOnly => Some(0xFFA500),
            Self::Both => Some(0xFFFF00),
        }
    }

    pub const ALL: [Category; 4] = [Self::None, Self::MathOnly, Self::ReadingOnly, Self::Both];
}

impl From<AigFlags> for Category {
    fn from(flags: AigFlags) -> Self {
        Self::from_flags(flags)
    }
}
