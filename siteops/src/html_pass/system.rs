/// One thing a pass did (or deliberately did not do) to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// An `<img>` was wrapped in a `<picture>`; holds the image file name.
    Converted { asset: String },
    /// A matching `<img>` already sits inside a `<picture>`.
    AlreadyWrapped { asset: String },
    /// An include element was added; holds the referenced path.
    Inserted { reference: String },
    /// An element subtree was dropped.
    Removed { description: String },
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converted { asset } => write!(f, "{asset} -> {}", crate::picture::rewrite::webp_file_name(asset)),
            Self::AlreadyWrapped { asset } => write!(f, "{asset} already wrapped"),
            Self::Inserted { reference } => write!(f, "added {reference}"),
            Self::Removed { description } => write!(f, "removed {description}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    pub changes: Vec<Change>,
}

impl Aggregator {
    pub fn include(&mut self, other: Self) {
        self.changes.extend(other.changes);
    }
    pub fn record(&mut self, change: Change) {
        self.changes.push(change);
    }
    /// Changes that alter the document (everything but `AlreadyWrapped`).
    pub fn is_modified(&self) -> bool {
        self.changes.iter().any(|x| !matches!(x, Change::AlreadyWrapped { .. }))
    }
    pub fn converted_assets(&self) -> Vec<String> {
        self.changes
            .iter()
            .filter_map(|x| match x {
                Change::Converted { asset } => Some(asset.clone()),
                _ => None,
            })
            .collect()
    }
    pub fn already_wrapped(&self) -> usize {
        self.changes
            .iter()
            .filter(|x| matches!(x, Change::AlreadyWrapped { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct State<T> {
    pub aggregator: Aggregator,
    pub value: T,
}

impl<T> State<T> {
    pub fn map<Result>(self, apply: impl FnOnce(T) -> Result) -> State<Result> {
        State { aggregator: self.aggregator, value: apply(self.value) }
    }
    /// Lets `apply` record changes while it builds the new value.
    pub fn map_with<Result>(self, apply: impl FnOnce(T, &mut Aggregator) -> Result) -> State<Result> {
        let State { mut aggregator, value } = self;
        let value = apply(value, &mut aggregator);
        State { aggregator, value }
    }
    pub fn wrap(value: T) -> Self {
        State { aggregator: Aggregator::default(), value }
    }
    /// Collects the values in order and merges every item's changes.
    pub fn flatten(items: impl IntoIterator<Item = State<T>>, len_hint: Option<usize>) -> State<Vec<T>> {
        let mut merged = State::wrap(Vec::with_capacity(len_hint.unwrap_or_default()));
        for State { aggregator, value } in items {
            merged.aggregator.include(aggregator);
            merged.value.push(value);
        }
        merged
    }
}

impl<T> Default for State<Vec<T>> {
    fn default() -> Self {
        State::wrap(Vec::new())
    }
}
