/// Diagnostic kinds, grouped by how a build reacts to them.
///
/// Errors come first (input, graph consistency, capacity, post-condition),
/// then warnings, then pedantic warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Missing or malformed input
    TagNotFound,
    TagUnreadable,
    MalformedTag,
    InvalidTagPath,
    WrongTagClass,
    ResourceMapMissing,
    ResourceMapInvalid,
    InvalidIndex,
    InvalidParameter,

    // Graph consistency
    DanglingPointer,
    DanglingDependency,
    OffsetOutOfBounds,
    BspConflict,
    CrossSectionPointer,
    UncompiledTag,

    // Engine limits
    TooManyTags,
    AddressOverflow,
    TagSpaceExceeded,
    FileTooLarge,

    // Output verification
    ForgeFailed,
    CompressionFailed,

    // Warnings
    ModifiedStockTag,
    NullModelShader,
    UnlistedBsp,
    AlwaysIndexUnsupported,

    // Pedantic
    PathCaseFolded,
    MissingAssetData,
    UnindexableAssetData,
}

/// What an error-severity kind aborts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Input,
    Consistency,
    Capacity,
    PostCondition,
    Warning,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self.category() {
            Category::Warning if *self >= Self::PathCaseFolded => Severity::Pedantic,
            Category::Warning => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn category(&self) -> Category {
        use DiagnosticKind::*;
        match self {
            TagNotFound | TagUnreadable | MalformedTag | InvalidTagPath | WrongTagClass
            | ResourceMapMissing | ResourceMapInvalid | InvalidIndex | InvalidParameter => {
                Category::Input
            }
            DanglingPointer | DanglingDependency | OffsetOutOfBounds | BspConflict
            | CrossSectionPointer | UncompiledTag => Category::Consistency,
            TooManyTags | AddressOverflow | TagSpaceExceeded | FileTooLarge => Category::Capacity,
            ForgeFailed | CompressionFailed => Category::PostCondition,
            ModifiedStockTag | NullModelShader | UnlistedBsp | AlwaysIndexUnsupported
            | PathCaseFolded | MissingAssetData | UnindexableAssetData => Category::Warning,
        }
    }

    /// Base message for this kind, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::TagNotFound => "tag not found",
            Self::TagUnreadable => "cannot read tag",
            Self::MalformedTag => "malformed tag data",
            Self::InvalidTagPath => "invalid tag path",
            Self::WrongTagClass => "wrong tag class",
            Self::ResourceMapMissing => "resource map not found",
            Self::ResourceMapInvalid => "invalid resource map",
            Self::InvalidIndex => "invalid tag index",
            Self::InvalidParameter => "invalid build parameter",

            Self::DanglingPointer => "pointer to a struct that does not exist",
            Self::DanglingDependency => "dependency on a tag that does not exist",
            Self::OffsetOutOfBounds => "offset outside of struct",
            Self::BspConflict => "struct belongs to more than one BSP",
            Self::CrossSectionPointer => "pointer crosses map sections",
            Self::UncompiledTag => "tag was never compiled",

            Self::TooManyTags => "too many tags",
            Self::AddressOverflow => "address does not fit in 32 bits",
            Self::TagSpaceExceeded => "tag space exceeded",
            Self::FileTooLarge => "map file too large",

            Self::ForgeFailed => "CRC32 forge failed",
            Self::CompressionFailed => "compression failed",

            Self::ModifiedStockTag => "modified stock tag",
            Self::NullModelShader => "model shader reference is null",
            Self::UnlistedBsp => "BSP is not listed in the scenario",
            Self::AlwaysIndexUnsupported => "always-index is only supported on Custom Edition",

            Self::PathCaseFolded => "tag path is not lowercase",
            Self::MissingAssetData => "tag has no asset data",
            Self::UnindexableAssetData => "asset data cannot be indexed",
        }
    }

    /// Render the final message: the fallback, or `fallback: detail`.
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => format!("{}: {detail}", self.fallback_message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Pedantic,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Pedantic => write!(f, "pedantic warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) severity: Severity,
    pub(crate) message: String,
    /// Tag the diagnostic is about (`path.extension`).
    pub(crate) tag: Option<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: kind.message(None),
            tag: None,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub(crate) fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning | Severity::Pedantic)
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(tag) = &self.tag {
            write!(f, " ({tag})")?;
        }
        Ok(())
    }
}
